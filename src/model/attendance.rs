use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::rt::Rt;

/// The three attendance event types: check-in, check-out, leave.
/// The legacy `status === 'hadir'` heuristic of older records is gone;
/// `kind` is the single tagged variant at the data-access boundary.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceKind {
    Masuk,
    Pulang,
    Izin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = -6.2088)]
    pub latitude: f64,
    #[schema(example = 106.8456)]
    pub longitude: f64,
    /// GPS accuracy in meters as reported by the device.
    #[schema(example = 12.5, nullable = true)]
    pub accuracy: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = 3)]
    pub schedule_id: u64,

    pub rt: Rt,

    /// Event timestamp, stored UTC. Day grouping and lateness are derived
    /// in WIB.
    #[schema(example = "2025-11-15T14:05:00Z", format = "date-time", value_type = String)]
    pub date: DateTime<Utc>,

    pub kind: AttendanceKind,

    #[schema(nullable = true)]
    pub photo: Option<String>,

    #[schema(nullable = true)]
    pub photo_public_id: Option<String>,

    #[schema(nullable = true)]
    pub reason: Option<String>,

    #[schema(value_type = Option<GeoPoint>)]
    pub location: Option<sqlx::types::Json<GeoPoint>>,

    /// Tri-state: NULL pending, TRUE approved, FALSE rejected.
    #[schema(nullable = true)]
    pub approved: Option<bool>,

    #[schema(nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<DateTime<Utc>>,
}

impl Attendance {
    /// A record counts against the one-per-day rule unless an admin
    /// rejected it.
    pub fn is_active(&self) -> bool {
        self.approved != Some(false)
    }
}

/// History row joined with the shift context needed to derive lateness,
/// read with a LEFT JOIN so records whose schedule was deleted still
/// render.
#[derive(Debug, sqlx::FromRow)]
pub struct HistoryRow {
    #[sqlx(flatten)]
    pub attendance: Attendance,
    pub schedule_name: Option<String>,
    pub schedule_masuk_time: Option<NaiveTime>,
}
