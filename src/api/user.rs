use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::role::UserStatus;
use crate::model::rt::Rt;
use crate::model::user::User;
use crate::utils::db_utils::{build_update_sql, execute_update};

/// Columns an admin patch may touch. Credentials and ids stay out.
const USER_PATCH_COLUMNS: &[&str] = &["name", "phone", "rt", "status", "role", "photo"];

const USER_COLS: &str = "id, name, email, phone, rt, role, status, photo, created_at";

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by RT code
    pub rt: Option<String>,
    /// Filter by account status (active|pending|banned)
    pub status: Option<UserStatus>,
    /// Substring match on name or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

enum Bind {
    Rt(Rt),
    Status(UserStatus),
    Like(String),
}

async fn fetch_user(pool: &MySqlPool, id: u64) -> Result<Option<User>, ApiError> {
    let sql = format!("SELECT {USER_COLS} FROM users WHERE id = ?");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Paginated resident directory (admin).
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<Bind> = Vec::new();

    if let Some(rt) = query.rt.as_deref() {
        let rt = Rt::parse_lenient(rt)
            .ok_or_else(|| ApiError::Validation("RT tidak dikenal".into()))?;
        where_sql.push_str(" AND rt = ?");
        args.push(Bind::Rt(rt));
    }
    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(Bind::Status(status));
    }
    if let Some(search) = query.search.as_deref() {
        let trimmed = search.trim();
        if !trimmed.is_empty() {
            where_sql.push_str(" AND (name LIKE ? OR email LIKE ?)");
            let like = format!("%{}%", trimmed);
            args.push(Bind::Like(like.clone()));
            args.push(Bind::Like(like));
        }
    }

    let count_sql = format!("SELECT COUNT(*) FROM users{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            Bind::Rt(v) => count_q.bind(*v),
            Bind::Status(v) => count_q.bind(*v),
            Bind::Like(s) => count_q.bind(s.clone()),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT {USER_COLS} FROM users{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, User>(&data_sql);
    for arg in args {
        data_q = match arg {
            Bind::Rt(v) => data_q.bind(v),
            Bind::Status(v) => data_q.bind(v),
            Bind::Like(s) => data_q.bind(s),
        };
    }

    let users = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users,
        page,
        per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let user = fetch_user(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Akun tidak ditemukan".into()))?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "user": user})))
}

/// Column-allowlisted patch (admin). The dynamic UPDATE builder refuses
/// anything outside [`USER_PATCH_COLUMNS`].
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    request_body(content = Object, description = "Fields to update"),
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Field not allowed or payload invalid"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();

    let update = build_update_sql("users", USER_PATCH_COLUMNS, &payload, "id", id)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let affected = execute_update(pool.get_ref(), update).await?;
    if affected == 0 {
        return Err(ApiError::NotFound("Akun tidak ditemukan".into()));
    }

    let user = fetch_user(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Akun tidak ditemukan".into()))?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "user": user})))
}

/// Toggle an account between active and banned (admin).
#[utoipa::path(
    put,
    path = "/api/users/{id}/ban",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "New status"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn ban_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();

    let user = fetch_user(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Akun tidak ditemukan".into()))?;

    let new_status = match user.status {
        UserStatus::Banned => UserStatus::Active,
        _ => UserStatus::Banned,
    };

    sqlx::query("UPDATE users SET status = ? WHERE id = ?")
        .bind(new_status)
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "status": new_status})))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Akun tidak ditemukan".into()));
    }

    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "Akun dihapus"})))
}
