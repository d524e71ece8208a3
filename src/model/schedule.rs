use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::rt::Rt;

/// Weekday names as the roster displays them. Display-only: nothing
/// validates `day` against the actual weekday of `date` within the month.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum DayName {
    Senin,
    Selasa,
    Rabu,
    Kamis,
    Jumat,
    Sabtu,
    Minggu,
}

/// Monthly roster container, one per (rt, month, year). The uniqueness is
/// a database key, not a get-or-create convention.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "rt": "04",
        "month": 11,
        "year": 2025,
        "name": "Ronda Malam RT 04",
        "masuk_time": "21:00:00",
        "created_by": 1,
        "created_at": "2025-11-01T00:00:00Z"
    })
)]
pub struct Schedule {
    #[schema(example = 3)]
    pub id: u64,

    pub rt: Rt,

    #[schema(example = 11, minimum = 1, maximum = 12)]
    pub month: u8,

    #[schema(example = 2025)]
    pub year: u16,

    #[schema(example = "Ronda Malam RT 04", nullable = true)]
    pub name: Option<String>,

    /// Configured check-in time. Approved check-ins later than this are
    /// shown as late; without it every approved check-in is on time.
    #[schema(example = "21:00:00", value_type = Option<String>)]
    pub masuk_time: Option<NaiveTime>,

    #[schema(example = 1)]
    pub created_by: u64,

    #[schema(example = "2025-11-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 12,
        "schedule_id": 3,
        "guard_name": "Budi Santoso",
        "date": 15,
        "day": "Sabtu",
        "phone": "081234567890",
        "notes": null,
        "email": "budi@example.com"
    })
)]
pub struct ScheduleEntry {
    #[schema(example = 12)]
    pub id: u64,

    #[schema(example = 3)]
    pub schedule_id: u64,

    #[schema(example = "Budi Santoso")]
    pub guard_name: String,

    /// Day of month, 1-31.
    #[schema(example = 15, minimum = 1, maximum = 31)]
    pub date: u8,

    pub day: DayName,

    #[schema(nullable = true)]
    pub phone: Option<String>,

    #[schema(nullable = true)]
    pub notes: Option<String>,

    /// Lowercased account email linking the entry to a resident, used by
    /// the partner lookup and roster notifications.
    #[schema(nullable = true)]
    pub email: Option<String>,
}
