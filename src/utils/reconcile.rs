//! Attendance/schedule reconciliation.
//!
//! Every view that renders a day's status (check-today card, monthly
//! calendar, tabular history) and every submission guard goes through the
//! pure functions here, so the decision sequence exists exactly once.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::attendance::{Attendance, AttendanceKind, GeoPoint, HistoryRow};
use crate::utils::wib;

/// Derived status of one (user, day). Mutually exclusive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    /// Past day without any record.
    Absent,
    /// Future day without any record.
    Upcoming,
    /// Submitted, awaiting an admin decision.
    Pending,
    OnTime,
    Late,
    /// Check-in rejected.
    Rejected,
    /// Approved leave.
    Leave,
    /// Leave request rejected.
    LeaveRejected,
}

/// A day's records collapsed into the per-kind triple.
#[derive(Debug, Serialize, PartialEq)]
pub struct DayAttendance<'a> {
    pub masuk: Option<&'a Attendance>,
    pub pulang: Option<&'a Attendance>,
    pub izin: Option<&'a Attendance>,
}

impl<'a> DayAttendance<'a> {
    pub fn is_empty(&self) -> bool {
        self.masuk.is_none() && self.pulang.is_none() && self.izin.is_none()
    }

    fn slot(&self, kind: AttendanceKind) -> Option<&'a Attendance> {
        match kind {
            AttendanceKind::Masuk => self.masuk,
            AttendanceKind::Pulang => self.pulang,
            AttendanceKind::Izin => self.izin,
        }
    }
}

/// Per kind the newest non-rejected record wins; when every record of a
/// kind was rejected, the newest rejected one is shown so re-submission
/// screens can explain what happened.
pub fn fold_day<'a, I>(records: I) -> DayAttendance<'a>
where
    I: IntoIterator<Item = &'a Attendance>,
{
    let mut day = DayAttendance { masuk: None, pulang: None, izin: None };

    for record in records {
        let slot = match record.kind {
            AttendanceKind::Masuk => &mut day.masuk,
            AttendanceKind::Pulang => &mut day.pulang,
            AttendanceKind::Izin => &mut day.izin,
        };
        *slot = Some(match *slot {
            None => record,
            Some(current) => pick(current, record),
        });
    }

    day
}

fn pick<'a>(current: &'a Attendance, candidate: &'a Attendance) -> &'a Attendance {
    match (current.is_active(), candidate.is_active()) {
        (false, true) => candidate,
        (true, false) => current,
        _ => {
            if candidate.date > current.date {
                candidate
            } else {
                current
            }
        }
    }
}

/// Server-side submission rules. The mobile client enforces the same set,
/// but the client copy is advisory.
pub fn guard_submission(
    kind: AttendanceKind,
    today: &DayAttendance,
    has_photo: bool,
    location: Option<&GeoPoint>,
    reason: Option<&str>,
) -> Result<(), ApiError> {
    match kind {
        AttendanceKind::Masuk | AttendanceKind::Pulang => {
            if !has_photo {
                return Err(ApiError::Validation(format!(
                    "Foto wajib diunggah untuk absensi {kind}"
                )));
            }
            if location.is_none() {
                return Err(ApiError::Validation(format!(
                    "Lokasi wajib disertakan untuk absensi {kind}"
                )));
            }
        }
        AttendanceKind::Izin => {
            if reason.map_or(true, |r| r.trim().is_empty()) {
                return Err(ApiError::Validation("Alasan izin wajib diisi".into()));
            }
        }
    }

    // A rejected record frees its slot; pending and approved ones block.
    if today.slot(kind).is_some_and(Attendance::is_active) {
        return Err(ApiError::DuplicateSubmission(format!(
            "Anda sudah melakukan absensi {kind} hari ini untuk jadwal ini"
        )));
    }

    if kind == AttendanceKind::Pulang && !today.masuk.is_some_and(Attendance::is_active) {
        return Err(ApiError::MissingPrerequisite(
            "Anda belum melakukan absensi masuk hari ini".into(),
        ));
    }

    Ok(())
}

/// The decision sequence for one day. Leave takes precedence over
/// check-in when both exist.
///
/// Lateness boundary: a check-in at exactly `masuk_time` is on time; only
/// strictly later is late.
pub fn day_status(
    day: NaiveDate,
    today: NaiveDate,
    masuk: Option<&Attendance>,
    izin: Option<&Attendance>,
    masuk_time: Option<NaiveTime>,
) -> DayStatus {
    if let Some(izin) = izin {
        return match izin.approved {
            Some(false) => DayStatus::LeaveRejected,
            Some(true) => DayStatus::Leave,
            None => DayStatus::Pending,
        };
    }

    if let Some(masuk) = masuk {
        return match masuk.approved {
            Some(false) => DayStatus::Rejected,
            Some(true) => match masuk_time {
                Some(expected) if wib::local_time(masuk.date) > expected => DayStatus::Late,
                _ => DayStatus::OnTime,
            },
            None => DayStatus::Pending,
        };
    }

    if day > today { DayStatus::Upcoming } else { DayStatus::Absent }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DaySummary {
    #[schema(example = "2025-11-15", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: DayStatus,
    /// WIB wall-clock times of the check-in/out events.
    #[schema(example = "21:05:00", value_type = Option<String>)]
    pub masuk_at: Option<NaiveTime>,
    #[schema(example = "04:30:00", value_type = Option<String>)]
    pub pulang_at: Option<NaiveTime>,
    #[schema(nullable = true)]
    pub shift_name: Option<String>,
    #[schema(nullable = true)]
    pub masuk_photo: Option<String>,
    #[schema(nullable = true)]
    pub pulang_photo: Option<String>,
    #[schema(nullable = true)]
    pub izin_reason: Option<String>,
}

/// Groups history rows by WIB calendar day and derives each day's status,
/// newest day first.
pub fn day_summaries(rows: &[HistoryRow], today: NaiveDate) -> Vec<DaySummary> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&HistoryRow>> = BTreeMap::new();
    for row in rows {
        by_day
            .entry(wib::local_day(row.attendance.date))
            .or_default()
            .push(row);
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, rows)| {
            let triple = fold_day(rows.iter().map(|r| &r.attendance));

            let shift_of = |record: Option<&Attendance>| {
                record.and_then(|a| rows.iter().find(|r| r.attendance.id == a.id))
            };
            let masuk_row = shift_of(triple.masuk);
            let izin_row = shift_of(triple.izin);

            let masuk_time = masuk_row.and_then(|r| r.schedule_masuk_time);
            let shift_name = masuk_row
                .and_then(|r| r.schedule_name.clone())
                .or_else(|| izin_row.and_then(|r| r.schedule_name.clone()));

            DaySummary {
                date,
                status: day_status(date, today, triple.masuk, triple.izin, masuk_time),
                masuk_at: triple.masuk.map(|a| wib::local_time(a.date)),
                pulang_at: triple.pulang.map(|a| wib::local_time(a.date)),
                shift_name,
                masuk_photo: triple.masuk.and_then(|a| a.photo.clone()),
                pulang_photo: triple.pulang.and_then(|a| a.photo.clone()),
                izin_reason: triple.izin.and_then(|a| a.reason.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rt::Rt;
    use chrono::{DateTime, TimeZone, Utc};

    fn at_wib(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        wib()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn wib() -> chrono::FixedOffset {
        crate::utils::wib::wib()
    }

    fn record(kind: AttendanceKind, date: DateTime<Utc>, approved: Option<bool>) -> Attendance {
        Attendance {
            id: date.timestamp() as u64,
            user_id: 7,
            schedule_id: 3,
            rt: Rt::Rt04,
            date,
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

    fn location() -> GeoPoint {
        GeoPoint { latitude: -6.2, longitude: 106.8, accuracy: Some(10.0) }
    }

    fn nov(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn second_check_in_is_rejected_while_first_is_not_rejected() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), None);
        let today = fold_day([&masuk]);

        let err = guard_submission(AttendanceKind::Masuk, &today, true, Some(&location()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateSubmission(_)));

        // Approved blocks just the same.
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(true));
        let today = fold_day([&masuk]);
        let err = guard_submission(AttendanceKind::Masuk, &today, true, Some(&location()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateSubmission(_)));
    }

    #[test]
    fn admin_rejection_frees_the_check_in_slot() {
        let rejected = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(false));
        let today = fold_day([&rejected]);
        assert!(
            guard_submission(AttendanceKind::Masuk, &today, true, Some(&location()), None).is_ok()
        );
    }

    #[test]
    fn check_out_requires_a_non_rejected_check_in() {
        let empty = fold_day([]);
        let err = guard_submission(AttendanceKind::Pulang, &empty, true, Some(&location()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingPrerequisite(_)));

        let rejected = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(false));
        let today = fold_day([&rejected]);
        let err = guard_submission(AttendanceKind::Pulang, &today, true, Some(&location()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingPrerequisite(_)));

        let pending = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), None);
        let today = fold_day([&pending]);
        assert!(
            guard_submission(AttendanceKind::Pulang, &today, true, Some(&location()), None).is_ok()
        );
    }

    #[test]
    fn duplicate_check_out_is_rejected() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(true));
        let pulang = record(AttendanceKind::Pulang, at_wib(2025, 11, 16, 4, 30), None);
        let today = fold_day([&masuk, &pulang]);
        let err = guard_submission(AttendanceKind::Pulang, &today, true, Some(&location()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateSubmission(_)));
    }

    #[test]
    fn leave_needs_a_reason_and_nothing_else() {
        let empty = fold_day([]);

        let err = guard_submission(AttendanceKind::Izin, &empty, false, None, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err =
            guard_submission(AttendanceKind::Izin, &empty, false, None, Some("  ")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // No photo, no location required.
        assert!(guard_submission(AttendanceKind::Izin, &empty, false, None, Some("sakit")).is_ok());
    }

    #[test]
    fn check_in_needs_photo_and_location() {
        let empty = fold_day([]);
        let err = guard_submission(AttendanceKind::Masuk, &empty, false, Some(&location()), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = guard_submission(AttendanceKind::Masuk, &empty, true, None, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(
            guard_submission(AttendanceKind::Masuk, &empty, true, Some(&location()), None).is_ok()
        );
    }

    #[test]
    fn lateness_is_strictly_after_the_configured_time() {
        let shift = Some(t(21, 0, 0));

        let late = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 5), Some(true));
        assert_eq!(day_status(nov(15), nov(20), Some(&late), None, shift), DayStatus::Late);

        let early = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 20, 55), Some(true));
        assert_eq!(day_status(nov(15), nov(20), Some(&early), None, shift), DayStatus::OnTime);

        // Boundary pinned: exactly 21:00:00 is on time.
        let exact = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(true));
        assert_eq!(day_status(nov(15), nov(20), Some(&exact), None, shift), DayStatus::OnTime);
    }

    #[test]
    fn approved_check_in_without_configured_time_is_on_time() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 23, 59), Some(true));
        assert_eq!(day_status(nov(15), nov(20), Some(&masuk), None, None), DayStatus::OnTime);
    }

    #[test]
    fn leave_takes_precedence_over_check_in() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 5), Some(true));
        let izin = record(AttendanceKind::Izin, at_wib(2025, 11, 15, 18, 0), Some(true));
        assert_eq!(
            day_status(nov(15), nov(20), Some(&masuk), Some(&izin), Some(t(21, 0, 0))),
            DayStatus::Leave
        );
    }

    #[test]
    fn rejections_map_to_their_own_states() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(false));
        assert_eq!(day_status(nov(15), nov(20), Some(&masuk), None, None), DayStatus::Rejected);

        let izin = record(AttendanceKind::Izin, at_wib(2025, 11, 15, 18, 0), Some(false));
        assert_eq!(
            day_status(nov(15), nov(20), None, Some(&izin), None),
            DayStatus::LeaveRejected
        );
    }

    #[test]
    fn pending_records_stay_pending() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), None);
        assert_eq!(day_status(nov(15), nov(20), Some(&masuk), None, None), DayStatus::Pending);

        let izin = record(AttendanceKind::Izin, at_wib(2025, 11, 15, 18, 0), None);
        assert_eq!(day_status(nov(15), nov(20), None, Some(&izin), None), DayStatus::Pending);
    }

    #[test]
    fn empty_days_split_into_absent_and_upcoming() {
        assert_eq!(day_status(nov(10), nov(15), None, None, None), DayStatus::Absent);
        assert_eq!(day_status(nov(15), nov(15), None, None, None), DayStatus::Absent);
        assert_eq!(day_status(nov(20), nov(15), None, None, None), DayStatus::Upcoming);
    }

    #[test]
    fn fold_prefers_newest_non_rejected_record() {
        let rejected = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 20, 0), Some(false));
        let resubmitted = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 10), None);
        let day = fold_day([&rejected, &resubmitted]);
        assert_eq!(day.masuk.unwrap().id, resubmitted.id);

        // Order of arrival must not matter.
        let day = fold_day([&resubmitted, &rejected]);
        assert_eq!(day.masuk.unwrap().id, resubmitted.id);

        // All rejected: show the newest rejection.
        let older = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 19, 0), Some(false));
        let day = fold_day([&older, &rejected]);
        assert_eq!(day.masuk.unwrap().id, rejected.id);
    }

    #[test]
    fn fold_is_idempotent() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 0), Some(true));
        let izin = record(AttendanceKind::Izin, at_wib(2025, 11, 15, 18, 0), None);
        let records = [&masuk, &izin];
        assert_eq!(fold_day(records), fold_day(records));
    }

    #[test]
    fn approved_late_check_in_end_to_end() {
        // RT 04 resident checks in 2025-11-15 21:05 WIB against a 21:00
        // shift; admin approves.
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 5), Some(true));
        let day = fold_day([&masuk]);

        assert_eq!(day.masuk.unwrap().approved, Some(true));
        assert!(day.pulang.is_none());
        assert!(day.izin.is_none());
        assert_eq!(
            day_status(nov(15), nov(15), day.masuk, day.izin, Some(t(21, 0, 0))),
            DayStatus::Late
        );
    }

    #[test]
    fn summaries_group_by_wib_day() {
        let masuk = record(AttendanceKind::Masuk, at_wib(2025, 11, 15, 21, 5), Some(true));
        // 01:30 WIB the next morning belongs to the 16th.
        let pulang = record(AttendanceKind::Pulang, at_wib(2025, 11, 16, 1, 30), Some(true));

        let rows = vec![
            HistoryRow {
                attendance: masuk,
                schedule_name: Some("Ronda Malam RT 04".into()),
                schedule_masuk_time: Some(t(21, 0, 0)),
            },
            HistoryRow {
                attendance: pulang,
                schedule_name: Some("Ronda Malam RT 04".into()),
                schedule_masuk_time: Some(t(21, 0, 0)),
            },
        ];

        let summaries = day_summaries(&rows, nov(20));
        assert_eq!(summaries.len(), 2);

        // Newest day first.
        assert_eq!(summaries[0].date, nov(16));
        assert_eq!(summaries[0].pulang_at, Some(t(1, 30, 0)));
        // A lone check-out never happened in practice; it derives Absent.
        assert_eq!(summaries[0].status, DayStatus::Absent);

        assert_eq!(summaries[1].date, nov(15));
        assert_eq!(summaries[1].status, DayStatus::Late);
        assert_eq!(summaries[1].masuk_at, Some(t(21, 5, 0)));
        assert_eq!(summaries[1].shift_name.as_deref(), Some("Ronda Malam RT 04"));
    }
}
