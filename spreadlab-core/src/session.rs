//! Trading session window and calendar helpers.
//!
//! The simulated session is fixed: 15:30–22:00 local, minute resolution.
//! Quotes that stop before 21:50 are treated as a short history day and
//! resolved against the session's end-of-day price.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// First simulated minute of the session.
pub fn session_start() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).unwrap()
}

/// Last simulated minute of the session (inclusive).
pub fn session_end() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap()
}

/// Quote series ending before this minute are considered truncated and go
/// through the end-of-day override.
pub fn early_stop_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 50, 0).unwrap()
}

/// Exit timestamp stamped on positions forced to expiry by the override.
pub fn forced_expiry_time() -> NaiveTime {
    session_end()
}

/// Business days (Mon–Fri) in `[start, end]`, in order.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        match current.weekday() {
            Weekday::Sat | Weekday::Sun => {}
            _ => days.push(current),
        }
        current += Duration::days(1);
    }
    days
}

/// Every session minute of `date`, from 15:30 through 22:00 inclusive.
pub fn session_minutes(date: NaiveDate) -> impl Iterator<Item = NaiveDateTime> {
    let start = date.and_time(session_start());
    let end = date.and_time(session_end());
    std::iter::successors(Some(start), move |&t| {
        let next = t + Duration::minutes(1);
        (next <= end).then_some(next)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_days_skip_weekends() {
        // 2025-05-01 is a Thursday.
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 7).unwrap();
        let days = business_days(start, end);
        assert_eq!(days.len(), 5); // Thu, Fri, Mon, Tue, Wed
        assert!(days.iter().all(|d| {
            !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
        }));
    }

    #[test]
    fn business_days_empty_range() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(business_days(start, end).is_empty());
    }

    #[test]
    fn session_minutes_count() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 12).unwrap();
        let minutes: Vec<_> = session_minutes(date).collect();
        // 6.5 hours inclusive of both endpoints.
        assert_eq!(minutes.len(), 391);
        assert_eq!(minutes[0].time(), session_start());
        assert_eq!(minutes.last().unwrap().time(), session_end());
    }
}
