//! Reporting windows: today, this week, this month, this year.
//!
//! All checks compare calendar dates against a reference day captured once
//! per cycle, so a whole batch is classified consistently.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, Utc};

use crate::models::Windows;

/// Calendar day of `now` at the board's location.
///
/// With no offset configured the system's local time zone is used.
pub fn reference_day(now: DateTime<Utc>, utc_offset: Option<FixedOffset>) -> NaiveDate {
    match utc_offset {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.with_timezone(&Local).date_naive(),
    }
}

pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// Monday of the week containing `today`. Sunday belongs to the week that
/// started six days earlier.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// Monday through Sunday, both ends inclusive.
pub fn is_this_week(date: NaiveDate, today: NaiveDate) -> bool {
    let monday = week_start(today);
    let sunday = monday + Duration::days(6);
    monday <= date && date <= sunday
}

pub fn is_this_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

pub fn is_this_year(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year()
}

/// Every window `date` falls into.
pub fn classify(date: NaiveDate, today: NaiveDate) -> Windows {
    Windows {
        today: is_today(date, today),
        this_week: is_this_week(date, today),
        this_month: is_this_month(date, today),
        this_year: is_this_year(date, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start_midweek() {
        // Wednesday 2025-06-18
        assert_eq!(week_start(d(2025, 6, 18)), d(2025, 6, 16));
    }

    #[test]
    fn test_week_start_monday_is_itself() {
        assert_eq!(week_start(d(2025, 6, 16)), d(2025, 6, 16));
    }

    #[test]
    fn test_week_start_sunday_maps_to_previous_monday() {
        // Sunday 2025-06-22
        assert_eq!(week_start(d(2025, 6, 22)), d(2025, 6, 16));
    }

    #[test]
    fn test_week_start_across_month_boundary() {
        // Sunday 2025-06-01 belongs to the week starting Monday 2025-05-26
        assert_eq!(week_start(d(2025, 6, 1)), d(2025, 5, 26));
    }

    #[test]
    fn test_is_this_week_inclusive_bounds() {
        let today = d(2025, 6, 18);
        assert!(is_this_week(d(2025, 6, 16), today));
        assert!(is_this_week(d(2025, 6, 22), today));
        assert!(!is_this_week(d(2025, 6, 15), today));
        assert!(!is_this_week(d(2025, 6, 23), today));
    }

    #[test]
    fn test_is_this_week_on_sunday() {
        let sunday = d(2025, 6, 22);
        assert!(is_this_week(d(2025, 6, 16), sunday));
        assert!(!is_this_week(d(2025, 6, 23), sunday));
    }

    #[test]
    fn test_month_and_year() {
        let today = d(2025, 6, 18);
        assert!(is_this_month(d(2025, 6, 1), today));
        assert!(!is_this_month(d(2024, 6, 18), today));
        assert!(is_this_year(d(2025, 1, 1), today));
        assert!(!is_this_year(d(2024, 12, 31), today));
    }

    #[test]
    fn test_classify_is_not_exclusive() {
        let today = d(2025, 6, 18);
        let windows = classify(today, today);
        assert!(windows.today && windows.this_week && windows.this_month && windows.this_year);

        let last_week = classify(d(2025, 6, 10), today);
        assert!(!last_week.today);
        assert!(!last_week.this_week);
        assert!(last_week.this_month);
        assert!(last_week.this_year);
    }

    #[test]
    fn test_reference_day_uses_offset() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 23, 30, 0).unwrap();
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(reference_day(now, Some(plus_one)), d(2025, 6, 19));

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(reference_day(now, Some(utc)), d(2025, 6, 18));
    }
}
