use chrono::{Duration, NaiveDate};

/// Decimal places used for coordinates in API query parameters.
pub const COORDINATE_PRECISION: usize = 6;

/// Format a coordinate for an API query parameter (6 decimal places).
pub fn format_coordinate(value: f64) -> String {
    format!("{:.*}", COORDINATE_PRECISION, value)
}

/// The date `days` days before `today`.
pub fn days_before(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days)
}

/// ISO date without a time component (`YYYY-MM-DD`).
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(41.5), "41.500000");
        assert_eq!(format_coordinate(-70.1234567), "-70.123457");
        assert_eq!(format_coordinate(90.0), "90.000000");
    }

    #[test]
    fn test_days_before() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date");
        assert_eq!(format_iso_date(days_before(today, 30)), "2026-02-13");

        // Crosses a year boundary
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).expect("valid date");
        assert_eq!(format_iso_date(days_before(today, 30)), "2025-12-11");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("⚓⚓⚓⚓⚓", 4), "⚓...");
    }
}
