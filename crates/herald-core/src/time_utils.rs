use chrono::{DateTime, Months, Utc};

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Returns the Unix timestamp one calendar year after `now`.
///
/// Feb 29 clamps to Feb 28 of the following year. Falls back to 365 days when
/// the calendar addition overflows chrono's supported range.
pub fn one_year_after_unix(now: DateTime<Utc>) -> i64 {
    now.checked_add_months(Months::new(12))
        .unwrap_or_else(|| now + chrono::Duration::days(365))
        .timestamp()
}

/// Returns the Unix timestamp one calendar year from the current time.
pub fn one_year_from_now_unix() -> i64 {
    one_year_after_unix(Utc::now())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn one_year_after_adds_a_calendar_year() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).single().expect("valid date");
        let expected = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().expect("valid date");
        assert_eq!(one_year_after_unix(now), expected.timestamp());
    }

    #[test]
    fn one_year_after_leap_day_clamps_to_end_of_february() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).single().expect("valid date");
        let expected = Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).single().expect("valid date");
        assert_eq!(one_year_after_unix(now), expected.timestamp());
    }
}
