use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    pub kind: NotificationKind,

    #[schema(example = "Absensi Disetujui")]
    pub title: String,

    #[schema(example = "Absensi ronda Anda telah disetujui admin")]
    pub message: String,

    #[schema(nullable = true)]
    pub link: Option<String>,

    #[schema(value_type = Object)]
    pub metadata: Option<sqlx::types::Json<serde_json::Value>>,

    pub is_read: bool,

    #[schema(example = "2025-11-15T14:05:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
