pub mod attendance;
pub mod location;
pub mod notification;
pub mod schedule;
pub mod user;
