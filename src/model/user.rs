use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::{Role, UserStatus};
use super::rt::Rt;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Budi Santoso",
        "email": "budi@example.com",
        "phone": "081234567890",
        "rt": "04",
        "role": "user",
        "status": "active",
        "photo": null,
        "created_at": "2025-11-01T00:00:00Z"
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Budi Santoso")]
    pub name: String,

    #[schema(example = "budi@example.com")]
    pub email: String,

    #[schema(example = "081234567890", nullable = true)]
    pub phone: Option<String>,

    /// RT can be absent until the resident completes their profile.
    pub rt: Option<Rt>,

    pub role: Role,

    pub status: UserStatus,

    #[schema(nullable = true)]
    pub photo: Option<String>,

    #[schema(example = "2025-11-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
