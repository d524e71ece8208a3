pub mod attendance;
pub mod notification;
pub mod role;
pub mod rt;
pub mod schedule;
pub mod user;
