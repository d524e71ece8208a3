use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::{ApiError, is_duplicate_key};
use crate::model::attendance::{Attendance, AttendanceKind, GeoPoint, HistoryRow};
use crate::model::rt::Rt;
use crate::utils::reconcile::{self, DaySummary};
use crate::utils::{notify, upload, wib};

/// Matches the upload limit the mobile client enforces.
const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const ATTENDANCE_COLS: &str = "id, user_id, schedule_id, rt, date, kind, photo, \
     photo_public_id, reason, location, approved, approved_by, approved_at";

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attendance: Attendance,
    #[schema(example = "Budi Santoso")]
    pub user_name: String,
    #[schema(example = "budi@example.com")]
    pub user_email: String,
}

#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub total: usize,
    /// Check-in records ("hadir" in the dashboard).
    pub masuk: usize,
    pub pulang: usize,
    pub izin: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

#[derive(Deserialize, IntoParams)]
pub struct AttendanceListQuery {
    /// Filter by RT code
    pub rt: Option<String>,
    /// Filter by kind (masuk|pulang|izin)
    pub kind: Option<AttendanceKind>,
    /// Filter by decision state (pending|approved|rejected)
    pub status: Option<String>,
    pub year: Option<u16>,
    /// Month filter, requires year
    pub month: Option<u8>,
    /// Start of a WIB date range (inclusive)
    #[param(value_type = Option<String>, example = "2025-11-01")]
    pub from: Option<NaiveDate>,
    /// End of a WIB date range (inclusive)
    #[param(value_type = Option<String>, example = "2025-11-30")]
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub year: Option<u16>,
    pub month: Option<u8>,
}

#[derive(Deserialize, IntoParams)]
pub struct DateRangeQuery {
    #[param(value_type = Option<String>, example = "2025-11-01")]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, example = "2025-11-30")]
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApproveDecision {
    pub approved: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarResponse {
    pub success: bool,
    pub days: Vec<DaySummary>,
}

/// Fields accepted by the multipart submission.
#[derive(Default)]
struct SubmissionForm {
    schedule_id: Option<u64>,
    kind: Option<AttendanceKind>,
    reason: Option<String>,
    location: Option<GeoPoint>,
    photo: Option<Vec<u8>>,
}

async fn collect_field(field: &mut actix_multipart::Field) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::Validation(format!("Unggahan tidak valid: {e}")))?
    {
        if data.len() + chunk.len() > MAX_PHOTO_BYTES {
            return Err(ApiError::Validation("Foto melebihi batas 5MB".into()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn collect_text(field: &mut actix_multipart::Field) -> Result<String, ApiError> {
    let bytes = collect_field(field).await?;
    String::from_utf8(bytes).map_err(|_| ApiError::Validation("Form tidak valid".into()))
}

async fn parse_submission(mut payload: Multipart) -> Result<SubmissionForm, ApiError> {
    let mut form = SubmissionForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::Validation(format!("Unggahan tidak valid: {e}")))?
    {
        match field.name() {
            Some("schedule_id") => {
                let text = collect_text(&mut field).await?;
                form.schedule_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::Validation("schedule_id tidak valid".into()))?,
                );
            }
            Some("kind") => {
                let text = collect_text(&mut field).await?;
                form.kind = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::Validation("Jenis absensi tidak dikenal".into()))?,
                );
            }
            Some("reason") => {
                form.reason = Some(collect_text(&mut field).await?);
            }
            Some("location") => {
                let text = collect_text(&mut field).await?;
                form.location = Some(
                    serde_json::from_str(&text)
                        .map_err(|_| ApiError::Validation("Data lokasi tidak valid".into()))?,
                );
            }
            Some("photo") => {
                form.photo = Some(collect_field(&mut field).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn fetch_today_records(
    pool: &MySqlPool,
    user_id: u64,
    schedule_id: u64,
) -> Result<Vec<Attendance>, ApiError> {
    let (start, end) = wib::day_bounds_utc(wib::today());

    let sql = format!(
        "SELECT {ATTENDANCE_COLS} FROM attendances \
         WHERE user_id = ? AND schedule_id = ? AND date >= ? AND date < ?"
    );

    let records = sqlx::query_as::<_, Attendance>(&sql)
        .bind(user_id)
        .bind(schedule_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

async fn fetch_attendance(pool: &MySqlPool, id: u64) -> Result<Option<Attendance>, ApiError> {
    let sql = format!("SELECT {ATTENDANCE_COLS} FROM attendances WHERE id = ?");
    Ok(sqlx::query_as::<_, Attendance>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

fn stats_of<'a, I>(records: I) -> AttendanceStats
where
    I: IntoIterator<Item = &'a Attendance>,
{
    let mut stats = AttendanceStats::default();
    for record in records {
        stats.total += 1;
        match record.kind {
            AttendanceKind::Masuk => stats.masuk += 1,
            AttendanceKind::Pulang => stats.pulang += 1,
            AttendanceKind::Izin => stats.izin += 1,
        }
        match record.approved {
            Some(true) => stats.approved += 1,
            Some(false) => stats.rejected += 1,
            None => stats.pending += 1,
        }
    }
    stats
}

enum Bind {
    Rt(Rt),
    Kind(AttendanceKind),
    Ts(chrono::DateTime<Utc>),
}

/// Submit a check-in, check-out, or leave request (multipart).
///
/// Fields: `schedule_id`, `kind` (masuk|pulang|izin), `location` (JSON
/// `{latitude, longitude, accuracy}`), `photo` (image file), `reason`
/// (leave only). Photo and location are required for masuk/pulang, the
/// reason for izin.
#[utoipa::path(
    post,
    path = "/api/attendances",
    request_body(content = String, content_type = "multipart/form-data",
        description = "schedule_id, kind, location JSON, photo file, reason"),
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Validation failed or prerequisite missing"),
        (status = 409, description = "Duplicate submission for today"),
        (status = 404, description = "Schedule not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = parse_submission(payload).await?;

    let schedule_id = form
        .schedule_id
        .ok_or_else(|| ApiError::Validation("schedule_id wajib diisi".into()))?;
    let kind = form
        .kind
        .ok_or_else(|| ApiError::Validation("Jenis absensi wajib diisi".into()))?;

    let schedule_rt = sqlx::query_scalar::<_, Rt>("SELECT rt FROM schedules WHERE id = ?")
        .bind(schedule_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Jadwal tidak ditemukan".into()))?;

    // Friendly pre-check; the (schedule, user, kind, day) unique key below
    // is the race-proof backstop.
    let today_records = fetch_today_records(pool.get_ref(), auth.user_id, schedule_id).await?;
    let today = reconcile::fold_day(&today_records);
    reconcile::guard_submission(
        kind,
        &today,
        form.photo.is_some(),
        form.location.as_ref(),
        form.reason.as_deref(),
    )?;

    let stored = match (kind, form.photo) {
        (AttendanceKind::Izin, _) => None,
        (_, Some(bytes)) => {
            Some(upload::save_photo(&config.upload_dir, "attendance", bytes).await?)
        }
        (_, None) => None,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO attendances
            (user_id, schedule_id, rt, date, kind, photo, photo_public_id,
             reason, location, active_day)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(schedule_id)
    .bind(schedule_rt)
    .bind(Utc::now())
    .bind(kind)
    .bind(stored.as_ref().map(|p| &p.url))
    .bind(stored.as_ref().map(|p| &p.public_id))
    .bind(form.reason.as_deref().map(str::trim))
    .bind(form.location.as_ref().map(|l| sqlx::types::Json(l.clone())))
    .bind(wib::today())
    .execute(pool.get_ref())
    .await;

    let inserted = match result {
        Ok(r) => r,
        Err(e) => {
            // The photo write and the insert are not transactional; undo
            // the photo so a failed insert leaves no orphan file.
            if let Some(stored) = &stored {
                upload::delete_photo(&config.upload_dir, &stored.public_id).await;
            }
            if is_duplicate_key(&e) {
                return Err(ApiError::DuplicateSubmission(format!(
                    "Anda sudah melakukan absensi {kind} hari ini untuk jadwal ini"
                )));
            }
            return Err(e.into());
        }
    };

    let record = fetch_attendance(pool.get_ref(), inserted.last_insert_id())
        .await?
        .ok_or_else(|| ApiError::NotFound("Absensi tidak ditemukan".into()))?;

    let submitter = sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = ?")
        .bind(auth.user_id)
        .fetch_optional(pool.get_ref())
        .await?
        .unwrap_or_else(|| auth.email.clone());

    let template = notify::new_attendance(&submitter, kind);
    if let Err(e) = notify::notify_all_admins(
        pool.get_ref(),
        &template,
        json!({"attendance_id": record.id}),
    )
    .await
    {
        warn!(error = %e, "Failed to notify admins of new attendance");
    }

    Ok(HttpResponse::Created().json(json!({"success": true, "data": record})))
}

/// Admin listing with aggregate stats.
#[utoipa::path(
    get,
    path = "/api/attendances",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Records plus aggregate stats"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceListQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<Bind> = Vec::new();

    if let Some(rt) = query.rt.as_deref() {
        let rt = Rt::parse_lenient(rt)
            .ok_or_else(|| ApiError::Validation("RT tidak dikenal".into()))?;
        where_sql.push_str(" AND a.rt = ?");
        args.push(Bind::Rt(rt));
    }
    if let Some(kind) = query.kind {
        where_sql.push_str(" AND a.kind = ?");
        args.push(Bind::Kind(kind));
    }
    if let Some(status) = query.status.as_deref() {
        match status {
            "pending" => where_sql.push_str(" AND a.approved IS NULL"),
            "approved" => where_sql.push_str(" AND a.approved = TRUE"),
            "rejected" => where_sql.push_str(" AND a.approved = FALSE"),
            _ => {
                return Err(ApiError::Validation(
                    "status harus pending, approved, atau rejected".into(),
                ));
            }
        }
    }
    if let (Some(year), Some(month)) = (query.year, query.month) {
        let (start, end) = wib::month_bounds_utc(i32::from(year), u32::from(month))
            .ok_or_else(|| ApiError::Validation("Bulan tidak valid".into()))?;
        where_sql.push_str(" AND a.date >= ? AND a.date < ?");
        args.push(Bind::Ts(start));
        args.push(Bind::Ts(end));
    }
    if let Some(from) = query.from {
        let (start, _) = wib::day_bounds_utc(from);
        where_sql.push_str(" AND a.date >= ?");
        args.push(Bind::Ts(start));
    }
    if let Some(to) = query.to {
        let (_, end) = wib::day_bounds_utc(to);
        where_sql.push_str(" AND a.date < ?");
        args.push(Bind::Ts(end));
    }

    let sql = format!(
        r#"
        SELECT a.id, a.user_id, a.schedule_id, a.rt, a.date, a.kind, a.photo,
               a.photo_public_id, a.reason, a.location, a.approved,
               a.approved_by, a.approved_at,
               u.name AS user_name, u.email AS user_email
        FROM attendances a
        JOIN users u ON u.id = a.user_id
        {}
        ORDER BY a.date DESC
        "#,
        where_sql
    );

    let mut q = sqlx::query_as::<_, AttendanceWithUser>(&sql);
    for arg in args {
        q = match arg {
            Bind::Rt(v) => q.bind(v),
            Bind::Kind(v) => q.bind(v),
            Bind::Ts(v) => q.bind(v),
        };
    }

    let rows = q.fetch_all(pool.get_ref()).await?;
    let stats = stats_of(rows.iter().map(|r| &r.attendance));

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "stats": stats,
        "data": rows,
    })))
}

/// The caller's raw attendance records, newest first.
#[utoipa::path(
    get,
    path = "/api/attendances/my-history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Attendance records", body = [Attendance]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut where_sql = String::from(" WHERE user_id = ?");
    let mut bounds = None;

    if let (Some(year), Some(month)) = (query.year, query.month) {
        let b = wib::month_bounds_utc(i32::from(year), u32::from(month))
            .ok_or_else(|| ApiError::Validation("Bulan tidak valid".into()))?;
        where_sql.push_str(" AND date >= ? AND date < ?");
        bounds = Some(b);
    }

    let sql =
        format!("SELECT {ATTENDANCE_COLS} FROM attendances{where_sql} ORDER BY date DESC");

    let mut q = sqlx::query_as::<_, Attendance>(&sql).bind(auth.user_id);
    if let Some((start, end)) = bounds {
        q = q.bind(start).bind(end);
    }

    let records = q.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "data": records})))
}

/// The caller's month folded into per-day summaries for the calendar
/// view, lateness and leave precedence already derived.
#[utoipa::path(
    get,
    path = "/api/attendances/my-calendar/{year}/{month}",
    params(
        ("year" = u16, Path, description = "Year"),
        ("month" = u8, Path, description = "Month (1-12)")
    ),
    responses(
        (status = 200, description = "Per-day summaries, newest first", body = CalendarResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u16, u8)>,
) -> Result<HttpResponse, ApiError> {
    let (year, month) = path.into_inner();
    let (start, end) = wib::month_bounds_utc(i32::from(year), u32::from(month))
        .ok_or_else(|| ApiError::Validation("Bulan tidak valid".into()))?;

    // LEFT JOIN: records of a deleted schedule still render.
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT a.id, a.user_id, a.schedule_id, a.rt, a.date, a.kind, a.photo,
               a.photo_public_id, a.reason, a.location, a.approved,
               a.approved_by, a.approved_at,
               s.name AS schedule_name, s.masuk_time AS schedule_masuk_time
        FROM attendances a
        LEFT JOIN schedules s ON s.id = a.schedule_id
        WHERE a.user_id = ? AND a.date >= ? AND a.date < ?
        ORDER BY a.date
        "#,
    )
    .bind(auth.user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await?;

    let days = reconcile::day_summaries(&rows, wib::today());

    Ok(HttpResponse::Ok().json(CalendarResponse { success: true, days }))
}

/// Today's `{masuk, pulang, izin}` triple for one schedule.
#[utoipa::path(
    get,
    path = "/api/attendances/check-today/{schedule_id}",
    params(("schedule_id" = u64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Today's folded records"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let schedule_id = path.into_inner();

    let records = fetch_today_records(pool.get_ref(), auth.user_id, schedule_id).await?;
    let today = reconcile::fold_day(&records);
    let has_attended = !today.is_empty();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": today,
        "has_attended": has_attended,
    })))
}

/// Approve or reject a pending record (admin). Decisions are immutable:
/// a decided record answers 400.
#[utoipa::path(
    put,
    path = "/api/attendances/{id}/approve",
    params(("id" = u64, Path, description = "Attendance id")),
    request_body = ApproveDecision,
    responses(
        (status = 200, description = "Decision recorded", body = Attendance),
        (status = 400, description = "Not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn approve_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ApproveDecision>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let id = path.into_inner();
    let approved = payload.approved;

    // Rejection clears active_day so the resident can submit again today;
    // approval keeps it, and with it the duplicate backstop.
    let result = sqlx::query(
        r#"
        UPDATE attendances
        SET approved = ?,
            approved_by = ?,
            approved_at = NOW(),
            active_day = CASE WHEN ? THEN active_day ELSE NULL END
        WHERE id = ? AND approved IS NULL
        "#,
    )
    .bind(approved)
    .bind(auth.user_id)
    .bind(approved)
    .bind(id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Validation(
            "Absensi tidak ditemukan atau sudah diproses".into(),
        ));
    }

    let record = fetch_attendance(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Absensi tidak ditemukan".into()))?;

    let template = notify::attendance_decided(approved);
    if let Err(e) = notify::create_notification(
        pool.get_ref(),
        record.user_id,
        &template,
        json!({"attendance_id": id}),
    )
    .await
    {
        warn!(error = %e, "Failed to notify submitter of decision");
    }

    Ok(HttpResponse::Ok().json(json!({"success": true, "data": record})))
}

/// Self-service delete. Only the submitting resident may remove a record;
/// admins reject instead.
#[utoipa::path(
    delete,
    path = "/api/attendances/{id}",
    params(("id" = u64, Path, description = "Attendance id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let record = fetch_attendance(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Absensi tidak ditemukan".into()))?;

    if record.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Anda hanya dapat menghapus absensi Anda sendiri".into(),
        ));
    }

    sqlx::query("DELETE FROM attendances WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    if let Some(public_id) = &record.photo_public_id {
        upload::delete_photo(&config.upload_dir, public_id).await;
    }

    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "Absensi dihapus"})))
}

/// RT-scoped listing with an optional WIB date range.
#[utoipa::path(
    get,
    path = "/api/attendances/rt/{rt}",
    params(
        ("rt" = String, Path, description = "RT code"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Records for the RT", body = [AttendanceWithUser]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_by_rt(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ApiError> {
    let rt = Rt::parse_lenient(&path.into_inner())
        .ok_or_else(|| ApiError::Validation("RT tidak dikenal".into()))?;

    let mut where_sql = String::from(" WHERE a.rt = ?");
    let mut args: Vec<Bind> = vec![Bind::Rt(rt)];

    if let Some(from) = query.from {
        let (start, _) = wib::day_bounds_utc(from);
        where_sql.push_str(" AND a.date >= ?");
        args.push(Bind::Ts(start));
    }
    if let Some(to) = query.to {
        let (_, end) = wib::day_bounds_utc(to);
        where_sql.push_str(" AND a.date < ?");
        args.push(Bind::Ts(end));
    }

    let sql = format!(
        r#"
        SELECT a.id, a.user_id, a.schedule_id, a.rt, a.date, a.kind, a.photo,
               a.photo_public_id, a.reason, a.location, a.approved,
               a.approved_by, a.approved_at,
               u.name AS user_name, u.email AS user_email
        FROM attendances a
        JOIN users u ON u.id = a.user_id
        {}
        ORDER BY a.date DESC
        "#,
        where_sql
    );

    let mut q = sqlx::query_as::<_, AttendanceWithUser>(&sql);
    for arg in args {
        q = match arg {
            Bind::Rt(v) => q.bind(v),
            Bind::Kind(v) => q.bind(v),
            Bind::Ts(v) => q.bind(v),
        };
    }

    let rows = q.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({"success": true, "data": rows})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(kind: AttendanceKind, approved: Option<bool>) -> Attendance {
        Attendance {
            id: 1,
            user_id: 7,
            schedule_id: 3,
            rt: Rt::Rt04,
            date: Utc.with_ymd_and_hms(2025, 11, 15, 14, 0, 0).unwrap(),
            kind,
            photo: None,
            photo_public_id: None,
            reason: None,
            location: None,
            approved,
            approved_by: None,
            approved_at: None,
        }
    }

    #[test]
    fn stats_count_kinds_and_decisions() {
        let records = [
            record(AttendanceKind::Masuk, Some(true)),
            record(AttendanceKind::Masuk, None),
            record(AttendanceKind::Pulang, Some(true)),
            record(AttendanceKind::Izin, Some(false)),
        ];

        let stats = stats_of(&records);
        assert_eq!(
            stats,
            AttendanceStats {
                total: 4,
                masuk: 2,
                pulang: 1,
                izin: 1,
                approved: 2,
                pending: 1,
                rejected: 1,
            }
        );
    }

    #[test]
    fn stats_of_nothing_is_zeroed() {
        assert_eq!(stats_of([]), AttendanceStats::default());
    }
}
