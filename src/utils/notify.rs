//! Fire-and-forget notification creation. Callers treat failures as
//! non-fatal: a lost toast must never fail an attendance write.

use serde_json::Value;
use sqlx::MySqlPool;

use crate::model::attendance::AttendanceKind;
use crate::model::notification::NotificationKind;
use crate::model::rt::Rt;

pub struct Template {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

pub fn new_attendance(user_name: &str, kind: AttendanceKind) -> Template {
    Template {
        kind: NotificationKind::Info,
        title: "Absensi Baru".into(),
        message: format!("{} mengirim absensi {}", user_name, kind),
        link: Some("/attendances".into()),
    }
}

pub fn attendance_decided(approved: bool) -> Template {
    if approved {
        Template {
            kind: NotificationKind::Success,
            title: "Absensi Disetujui".into(),
            message: "Absensi ronda Anda telah disetujui admin".into(),
            link: Some("/attendance".into()),
        }
    } else {
        Template {
            kind: NotificationKind::Error,
            title: "Absensi Ditolak".into(),
            message: "Absensi ronda Anda ditolak admin. Silakan absen ulang.".into(),
            link: Some("/attendance".into()),
        }
    }
}

pub fn added_to_roster(rt: Rt, date: u8, month: u8, year: u16) -> Template {
    Template {
        kind: NotificationKind::Info,
        title: "Jadwal Ronda Baru".into(),
        message: format!(
            "Anda telah ditambahkan ke jadwal ronda RT {} pada {:02}/{:02}/{}",
            rt, date, month, year
        ),
        link: Some("/schedule".into()),
    }
}

pub async fn create_notification(
    pool: &MySqlPool,
    user_id: u64,
    template: &Template,
    metadata: Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notifications (user_id, kind, title, message, link, metadata)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(template.kind)
    .bind(&template.title)
    .bind(&template.message)
    .bind(&template.link)
    .bind(sqlx::types::Json(metadata))
    .execute(pool)
    .await?;

    Ok(())
}

/// One notification per admin account.
pub async fn notify_all_admins(
    pool: &MySqlPool,
    template: &Template,
    metadata: Value,
) -> Result<(), sqlx::Error> {
    let admin_ids =
        sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE role = 'admin'")
            .fetch_all(pool)
            .await?;

    for admin_id in admin_ids {
        create_notification(pool, admin_id, template, metadata.clone()).await?;
    }

    Ok(())
}

/// Notify the account behind a roster entry email, if one exists.
pub async fn notify_user_by_email(
    pool: &MySqlPool,
    email: &str,
    template: &Template,
    metadata: Value,
) -> Result<(), sqlx::Error> {
    let user_id = sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;

    if let Some(user_id) = user_id {
        create_notification(pool, user_id, template, metadata).await?;
    }

    Ok(())
}
