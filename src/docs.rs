use crate::api::attendance::{
    ApproveDecision, AttendanceStats, AttendanceWithUser, CalendarResponse,
};
use crate::api::schedule::{
    CreateEntry, CreateSchedule, Partner, PartnerResponse, ScheduleWithEntries, UpdateEntry,
};
use crate::api::user::UserListResponse;
use crate::model::attendance::{Attendance, AttendanceKind, GeoPoint};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::role::{Role, UserStatus};
use crate::model::rt::Rt;
use crate::model::schedule::{DayName, Schedule, ScheduleEntry};
use crate::model::user::User;
use crate::utils::reconcile::{DayStatus, DaySummary};
use crate::utils::upload::StoredPhoto;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JagaKampung API",
        version = "1.0.0",
        description = r#"
## JagaKampung — neighborhood night-patrol attendance

This API powers the **JagaKampung** ronda (night patrol) system: monthly
schedules per RT, check-in/check-out/leave submissions with photo and GPS
evidence, admin approval, and a polled notification feed.

### 🔹 Key Features
- **Schedules**
  - Monthly roster per RT, entry-level editing, today's patrol partners
- **Attendance**
  - Photo + GPS check-in (masuk), check-out (pulang), leave (izin)
  - Derived day status: on time, late, pending, rejected, leave
- **Approval**
  - Admin approve/reject, one immutable decision per record
- **Notifications**
  - Poll-based feed with unread counts

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Admin-only operations require an **admin** role claim.

### 📦 Response Format
- JSON-based RESTful responses
- `{success, kind, message}` error bodies with stable kinds

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::schedule::list_schedules,
        crate::api::schedule::create_schedule,
        crate::api::schedule::get_month,
        crate::api::schedule::today_partner,
        crate::api::schedule::get_schedule,
        crate::api::schedule::delete_schedule,
        crate::api::schedule::add_entry,
        crate::api::schedule::update_entry,
        crate::api::schedule::remove_entry,

        crate::api::attendance::create_attendance,
        crate::api::attendance::list_attendances,
        crate::api::attendance::my_history,
        crate::api::attendance::my_calendar,
        crate::api::attendance::check_today,
        crate::api::attendance::approve_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::list_by_rt,

        crate::api::notification::list_notifications,
        crate::api::notification::unread_count,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read,
        crate::api::notification::delete_notification,
        crate::api::notification::delete_all_notifications,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::ban_user,
        crate::api::user::delete_user,

        crate::api::location::reverse_geocode,
    ),
    components(
        schemas(
            Rt,
            Role,
            UserStatus,
            DayName,
            User,
            UserListResponse,
            Schedule,
            ScheduleEntry,
            ScheduleWithEntries,
            CreateSchedule,
            CreateEntry,
            UpdateEntry,
            Partner,
            PartnerResponse,
            Attendance,
            AttendanceKind,
            AttendanceWithUser,
            AttendanceStats,
            ApproveDecision,
            CalendarResponse,
            DayStatus,
            DaySummary,
            GeoPoint,
            StoredPhoto,
            Notification,
            NotificationKind,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Schedule", description = "Monthly patrol roster APIs"),
        (name = "Attendance", description = "Check-in/check-out/leave APIs"),
        (name = "Notification", description = "Polled notification feed APIs"),
        (name = "User", description = "Resident administration APIs"),
        (name = "Location", description = "Reverse-geocoding proxy"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
