use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

/// The product runs on Western Indonesia Time. Timestamps are stored UTC;
/// "today", day grouping and lateness all resolve against this offset.
pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset")
}

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&wib())
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

/// WIB calendar day of a stored timestamp.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&wib()).date_naive()
}

/// WIB wall-clock time of a stored timestamp.
pub fn local_time(ts: DateTime<Utc>) -> NaiveTime {
    ts.with_timezone(&wib()).time()
}

/// UTC bounds [start, end) of one WIB calendar day, for range queries.
pub fn day_bounds_utc(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists")
        .and_local_timezone(wib())
        .single()
        .expect("fixed offset is unambiguous")
        .with_timezone(&Utc);
    let end = start + chrono::Duration::days(1);
    (start, end)
}

/// UTC bounds [start, end) of one WIB calendar month.
pub fn month_bounds_utc(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let (start, _) = day_bounds_utc(first);
    let (end, _) = day_bounds_utc(next);
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn utc_evening_is_next_wib_day() {
        // 2025-11-15 19:30 UTC = 2025-11-16 02:30 WIB
        let ts = Utc.with_ymd_and_hms(2025, 11, 15, 19, 30, 0).unwrap();
        assert_eq!(local_day(ts), NaiveDate::from_ymd_opt(2025, 11, 16).unwrap());
        assert_eq!(local_time(ts), NaiveTime::from_hms_opt(2, 30, 0).unwrap());
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        let (start, end) = day_bounds_utc(day);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 11, 14, 17, 0, 0).unwrap());
        assert_eq!(end - start, chrono::Duration::days(1));
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds_utc(2025, 12).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 11, 30, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 12, 31, 17, 0, 0).unwrap());
    }
}
