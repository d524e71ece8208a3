use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::notification::Notification;

/// The feed is poll-based: the client asks for the latest slice and an
/// unread count on an interval.
const FEED_LIMIT: u32 = 50;

const NOTIFICATION_COLS: &str =
    "id, user_id, kind, title, message, link, metadata, is_read, created_at";

/// Latest notifications for the caller.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Latest notifications", body = [Notification]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLS} FROM notifications \
         WHERE user_id = ? ORDER BY created_at DESC LIMIT ?"
    );

    let notifications = sqlx::query_as::<_, Notification>(&sql)
        .bind(auth.user_id)
        .bind(FEED_LIMIT)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "data": notifications})))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn unread_count(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = FALSE",
    )
    .bind(auth.user_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "count": count})))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = u64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND user_id = ?")
            .bind(path.into_inner())
            .bind(auth.user_id)
            .execute(pool.get_ref())
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Notifikasi tidak ditemukan".into()));
    }

    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

#[utoipa::path(
    put,
    path = "/api/notifications/mark-all-read",
    responses(
        (status = 200, description = "All marked read"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = ? AND is_read = FALSE")
            .bind(auth.user_id)
            .execute(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "updated": result.rows_affected(),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = u64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn delete_notification(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
        .bind(path.into_inner())
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Notifikasi tidak ditemukan".into()));
    }

    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

#[utoipa::path(
    delete,
    path = "/api/notifications",
    responses(
        (status = 200, description = "All deleted"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn delete_all_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("DELETE FROM notifications WHERE user_id = ?")
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "deleted": result.rows_affected(),
    })))
}
