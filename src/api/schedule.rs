use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{ApiError, is_duplicate_key};
use crate::model::rt::Rt;
use crate::model::schedule::{DayName, Schedule, ScheduleEntry};
use crate::utils::{notify, wib};

#[derive(Deserialize, IntoParams)]
pub struct ScheduleQuery {
    /// Filter by RT code ("01".."06")
    pub rt: Option<String>,
    /// Filter by year
    pub year: Option<u16>,
    /// Filter by month (1-12)
    pub month: Option<u8>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSchedule {
    #[schema(example = "04")]
    pub rt: String,
    #[schema(example = 11, minimum = 1, maximum = 12)]
    pub month: u8,
    #[schema(example = 2025)]
    pub year: u16,
    #[schema(example = "Ronda Malam RT 04", nullable = true)]
    pub name: Option<String>,
    #[schema(example = "21:00:00", value_type = Option<String>)]
    pub masuk_time: Option<NaiveTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEntry {
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
    /// Account email linking the entry to a resident.
    #[schema(nullable = true)]
    pub email: Option<String>,
}

/// Absent fields stay unchanged.
#[derive(Deserialize, ToSchema)]
pub struct UpdateEntry {
    pub guard_name: Option<String>,
    #[schema(minimum = 1, maximum = 31)]
    pub date: Option<u8>,
    pub day: Option<DayName>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleWithEntries {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct Partner {
    #[schema(example = "Budi Santoso")]
    pub guard_name: String,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
    #[schema(nullable = true)]
    pub email: Option<String>,
    /// Profile photo of the linked account, when one exists.
    #[schema(nullable = true)]
    pub photo: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PartnerResponse {
    pub success: bool,
    #[schema(example = "2025-11-15", format = "date", value_type = String)]
    pub date: chrono::NaiveDate,
    pub partners: Vec<Partner>,
}

enum Bind {
    Rt(Rt),
    U8(u8),
    U16(u16),
}

async fn fetch_entries(pool: &MySqlPool, schedule_id: u64) -> Result<Vec<ScheduleEntry>, ApiError> {
    let entries = sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT id, schedule_id, guard_name, date, day, phone, notes, email
        FROM schedule_entries
        WHERE schedule_id = ?
        ORDER BY date, id
        "#,
    )
    .bind(schedule_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

async fn fetch_schedule(pool: &MySqlPool, id: u64) -> Result<Option<Schedule>, ApiError> {
    let schedule = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT id, rt, month, year, name, masuk_time, created_by, created_at
        FROM schedules
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

fn parse_rt(value: &str) -> Result<Rt, ApiError> {
    Rt::parse_lenient(value).ok_or_else(|| ApiError::Validation("RT tidak dikenal".into()))
}

/// The caller never shows up as their own patrol partner.
fn without_self(partners: Vec<Partner>, caller_email: &str) -> Vec<Partner> {
    partners
        .into_iter()
        .filter(|p| p.email.as_deref() != Some(caller_email))
        .collect()
}

/// List month containers, entries embedded.
#[utoipa::path(
    get,
    path = "/api/schedules",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Schedules with entries", body = [ScheduleWithEntries]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn list_schedules(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ScheduleQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<Bind> = Vec::new();

    if let Some(rt) = query.rt.as_deref() {
        where_sql.push_str(" AND rt = ?");
        args.push(Bind::Rt(parse_rt(rt)?));
    }
    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        args.push(Bind::U16(year));
    }
    if let Some(month) = query.month {
        where_sql.push_str(" AND month = ?");
        args.push(Bind::U8(month));
    }

    let sql = format!(
        r#"
        SELECT id, rt, month, year, name, masuk_time, created_by, created_at
        FROM schedules
        {}
        ORDER BY year DESC, month DESC, rt ASC
        "#,
        where_sql
    );

    let mut q = sqlx::query_as::<_, Schedule>(&sql);
    for arg in args {
        q = match arg {
            Bind::Rt(v) => q.bind(v),
            Bind::U8(v) => q.bind(v),
            Bind::U16(v) => q.bind(v),
        };
    }

    let schedules = q.fetch_all(pool.get_ref()).await?;

    let mut out = Vec::with_capacity(schedules.len());
    for schedule in schedules {
        let entries = fetch_entries(pool.get_ref(), schedule.id).await?;
        out.push(ScheduleWithEntries { schedule, entries });
    }

    Ok(HttpResponse::Ok().json(json!({"success": true, "schedules": out})))
}

/// Create an empty month container (admin).
#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = CreateSchedule,
    responses(
        (status = 201, description = "Schedule created", body = Schedule),
        (status = 409, description = "A schedule for this RT and month already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn create_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSchedule>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let rt = parse_rt(&payload.rt)?;
    if !(1..=12).contains(&payload.month) {
        return Err(ApiError::Validation("Bulan harus 1-12".into()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO schedules (rt, month, year, name, masuk_time, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rt)
    .bind(payload.month)
    .bind(payload.year)
    .bind(&payload.name)
    .bind(payload.masuk_time)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await;

    let inserted = match result {
        Ok(r) => r,
        Err(e) if is_duplicate_key(&e) => {
            return Err(ApiError::DuplicateSubmission(format!(
                "Jadwal RT {} untuk {:02}/{} sudah ada",
                rt, payload.month, payload.year
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let schedule = fetch_schedule(pool.get_ref(), inserted.last_insert_id())
        .await?
        .ok_or_else(|| ApiError::NotFound("Jadwal tidak ditemukan".into()))?;

    Ok(HttpResponse::Created().json(json!({"success": true, "schedule": schedule})))
}

/// One month's schedule for an RT, or 404. Callers treat the 404 as a
/// normal "no schedule yet" outcome.
#[utoipa::path(
    get,
    path = "/api/schedules/month/{rt}/{year}/{month}",
    params(
        ("rt" = String, Path, description = "RT code"),
        ("year" = u16, Path, description = "Year"),
        ("month" = u8, Path, description = "Month (1-12)")
    ),
    responses(
        (status = 200, description = "Schedule with entries", body = ScheduleWithEntries),
        (status = 404, description = "No schedule for this month"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn get_month(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(String, u16, u8)>,
) -> Result<HttpResponse, ApiError> {
    let (rt, year, month) = path.into_inner();
    let rt = parse_rt(&rt)?;

    let schedule = sqlx::query_as::<_, Schedule>(
        r#"
        SELECT id, rt, month, year, name, masuk_time, created_by, created_at
        FROM schedules
        WHERE rt = ? AND year = ? AND month = ?
        "#,
    )
    .bind(rt)
    .bind(year)
    .bind(month)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound("Jadwal tidak ditemukan untuk bulan ini".into()))?;

    let entries = fetch_entries(pool.get_ref(), schedule.id).await?;

    Ok(HttpResponse::Ok().json(ScheduleWithEntries { schedule, entries }))
}

/// Other guards on today's roster slot for the caller's RT. An empty list
/// is the normal "no patrol partner today" answer, never an error.
#[utoipa::path(
    get,
    path = "/api/schedules/today-partner",
    responses(
        (status = 200, description = "Partner list, possibly empty", body = PartnerResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn today_partner(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let today = wib::today();

    let empty = |date| PartnerResponse { success: true, date, partners: Vec::new() };

    let Some(rt) = auth.rt else {
        return Ok(HttpResponse::Ok().json(empty(today)));
    };

    let schedule_id = sqlx::query_scalar::<_, u64>(
        "SELECT id FROM schedules WHERE rt = ? AND year = ? AND month = ?",
    )
    .bind(rt)
    .bind(today.year() as u16)
    .bind(today.month() as u8)
    .fetch_optional(pool.get_ref())
    .await?;

    let Some(schedule_id) = schedule_id else {
        return Ok(HttpResponse::Ok().json(empty(today)));
    };

    let partners = sqlx::query_as::<_, Partner>(
        r#"
        SELECT e.guard_name, e.phone, e.notes, e.email, u.photo
        FROM schedule_entries e
        LEFT JOIN users u ON u.email = e.email
        WHERE e.schedule_id = ? AND e.date = ?
        ORDER BY e.id
        "#,
    )
    .bind(schedule_id)
    .bind(today.day() as u8)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(PartnerResponse {
        success: true,
        date: today,
        partners: without_self(partners, &auth.email),
    }))
}

#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    params(("id" = u64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Schedule with entries", body = ScheduleWithEntries),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn get_schedule(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let schedule = fetch_schedule(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Jadwal tidak ditemukan".into()))?;
    let entries = fetch_entries(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(ScheduleWithEntries { schedule, entries }))
}

/// Delete a month container (admin). Entries go with it; attendance
/// records keep their weak reference and still render in history views.
#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(("id" = u64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn delete_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Jadwal tidak ditemukan".into()));
    }

    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "Jadwal dihapus"})))
}

/// Append a roster entry (admin). A linked resident gets a notification.
#[utoipa::path(
    post,
    path = "/api/schedules/{id}/entries",
    params(("id" = u64, Path, description = "Schedule id")),
    request_body = CreateEntry,
    responses(
        (status = 201, description = "Entry created", body = ScheduleEntry),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Schedule not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn add_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateEntry>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let schedule_id = path.into_inner();

    if !(1..=31).contains(&payload.date) {
        return Err(ApiError::Validation("Tanggal harus 1-31".into()));
    }
    let guard_name = payload.guard_name.trim();
    if guard_name.is_empty() {
        return Err(ApiError::Validation("Nama petugas wajib diisi".into()));
    }

    let schedule = fetch_schedule(pool.get_ref(), schedule_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Jadwal tidak ditemukan".into()))?;

    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    let inserted = sqlx::query(
        r#"
        INSERT INTO schedule_entries (schedule_id, guard_name, date, day, phone, notes, email)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(schedule_id)
    .bind(guard_name)
    .bind(payload.date)
    .bind(payload.day)
    .bind(&payload.phone)
    .bind(&payload.notes)
    .bind(&email)
    .execute(pool.get_ref())
    .await?;

    if let Some(email) = &email {
        let template =
            notify::added_to_roster(schedule.rt, payload.date, schedule.month, schedule.year);
        if let Err(e) = notify::notify_user_by_email(
            pool.get_ref(),
            email,
            &template,
            json!({"schedule_id": schedule_id}),
        )
        .await
        {
            warn!(error = %e, email, "Failed to send roster notification");
        }
    }

    let entry = sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT id, schedule_id, guard_name, date, day, phone, notes, email
        FROM schedule_entries
        WHERE id = ?
        "#,
    )
    .bind(inserted.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(json!({"success": true, "entry": entry})))
}

/// Patch a roster entry (admin).
#[utoipa::path(
    put,
    path = "/api/schedules/{id}/entries/{entry_id}",
    params(
        ("id" = u64, Path, description = "Schedule id"),
        ("entry_id" = u64, Path, description = "Entry id")
    ),
    request_body = UpdateEntry,
    responses(
        (status = 200, description = "Entry updated", body = ScheduleEntry),
        (status = 404, description = "Entry not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn update_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u64)>,
    payload: web::Json<UpdateEntry>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let (schedule_id, entry_id) = path.into_inner();

    if let Some(date) = payload.date {
        if !(1..=31).contains(&date) {
            return Err(ApiError::Validation("Tanggal harus 1-31".into()));
        }
    }

    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    let result = sqlx::query(
        r#"
        UPDATE schedule_entries SET
            guard_name = COALESCE(?, guard_name),
            date = COALESCE(?, date),
            day = COALESCE(?, day),
            phone = COALESCE(?, phone),
            notes = COALESCE(?, notes),
            email = COALESCE(?, email)
        WHERE id = ? AND schedule_id = ?
        "#,
    )
    .bind(&payload.guard_name)
    .bind(payload.date)
    .bind(payload.day)
    .bind(&payload.phone)
    .bind(&payload.notes)
    .bind(&email)
    .bind(entry_id)
    .bind(schedule_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Entri jadwal tidak ditemukan".into()));
    }

    let entry = sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT id, schedule_id, guard_name, date, day, phone, notes, email
        FROM schedule_entries
        WHERE id = ?
        "#,
    )
    .bind(entry_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "entry": entry})))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}/entries/{entry_id}",
    params(
        ("id" = u64, Path, description = "Schedule id"),
        ("entry_id" = u64, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Entry removed"),
        (status = 404, description = "Entry not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn remove_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u64)>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let (schedule_id, entry_id) = path.into_inner();

    let result = sqlx::query("DELETE FROM schedule_entries WHERE id = ? AND schedule_id = ?")
        .bind(entry_id)
        .bind(schedule_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Entri jadwal tidak ditemukan".into()));
    }

    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "Entri jadwal dihapus"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(name: &str, email: Option<&str>) -> Partner {
        Partner {
            guard_name: name.into(),
            phone: None,
            notes: None,
            email: email.map(Into::into),
            photo: None,
        }
    }

    #[test]
    fn partner_list_excludes_the_caller() {
        let partners = vec![
            partner("Budi", Some("budi@example.com")),
            partner("Siti", Some("siti@example.com")),
            partner("Pak RT", None),
        ];

        let filtered = without_self(partners, "budi@example.com");
        let names: Vec<_> = filtered.iter().map(|p| p.guard_name.as_str()).collect();
        assert_eq!(names, ["Siti", "Pak RT"]);
    }

    #[test]
    fn unlinked_entries_survive_self_filtering() {
        let partners = vec![partner("Pak RT", None)];
        assert_eq!(without_self(partners, "budi@example.com").len(), 1);
    }
}
