//! Announcement date parsing.
//!
//! Report feeds are inconsistent about timestamp layout, so
//! [`parse_announcement_date`] tries a list of common layouts in turn.
//! Offset-bearing values keep their wall-clock time; the offset is
//! discarded rather than converted. All-numeric dates are read month-first
//! unless [`DateOrder::DayFirst`] is requested.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use incident_timeline_incident_models::DateOrder;

/// Layouts carrying a UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Year-first layouts, unambiguous regardless of [`DateOrder`].
const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
];

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Date-only layouts; the time defaults to midnight.
const ISO_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%b %d %Y",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

const DAY_FIRST_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y"];

/// Parses an announcement date string, returning `None` when no known
/// layout matches.
#[must_use]
pub fn parse_announcement_date(s: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }

    // The other order only applies when the preferred one cannot, e.g.
    // `15/01/2024` under month-first.
    let (numeric, numeric_dates, fallback, fallback_dates) = match order {
        DateOrder::MonthFirst => (
            MONTH_FIRST_FORMATS,
            MONTH_FIRST_DATE_FORMATS,
            DAY_FIRST_FORMATS,
            DAY_FIRST_DATE_FORMATS,
        ),
        DateOrder::DayFirst => (
            DAY_FIRST_FORMATS,
            DAY_FIRST_DATE_FORMATS,
            MONTH_FIRST_FORMATS,
            MONTH_FIRST_DATE_FORMATS,
        ),
    };

    for fmt in ISO_FORMATS.iter().chain(numeric).chain(fallback) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    for fmt in ISO_DATE_FORMATS
        .iter()
        .chain(numeric_dates)
        .chain(fallback_dates)
    {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> String {
        parse_announcement_date(s, DateOrder::MonthFirst)
            .unwrap()
            .to_string()
    }

    #[test]
    fn parses_iso_layouts() {
        assert_eq!(parse("2024-01-15 14:30:00"), "2024-01-15 14:30:00");
        assert_eq!(parse("2024-01-15T14:30:00"), "2024-01-15 14:30:00");
        assert_eq!(parse("2024-01-15 14:30"), "2024-01-15 14:30:00");
        assert_eq!(parse("2024/01/15 14:30:05"), "2024-01-15 14:30:05");
    }

    #[test]
    fn keeps_wall_clock_of_offset_values() {
        assert_eq!(parse("2024-01-15T14:30:00+08:00"), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_twelve_hour_clock() {
        assert_eq!(parse("2024/01/15 02:30:00 PM"), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_date_only_as_midnight() {
        assert_eq!(parse("2024-01-15"), "2024-01-15 00:00:00");
    }

    #[test]
    fn reads_numeric_dates_month_first_by_default() {
        assert_eq!(parse("01/02/2024 08:00:00"), "2024-01-02 08:00:00");
        assert_eq!(parse("01/02/2024"), "2024-01-02 00:00:00");
    }

    #[test]
    fn reads_numeric_dates_day_first_on_request() {
        let dt = parse_announcement_date("01/02/2024 08:00:00", DateOrder::DayFirst).unwrap();
        assert_eq!(dt.to_string(), "2024-02-01 08:00:00");
    }

    #[test]
    fn falls_back_to_day_first_when_month_is_impossible() {
        assert_eq!(parse("15/01/2024 14:30:00"), "2024-01-15 14:30:00");
        assert_eq!(parse("15/01/2024"), "2024-01-15 00:00:00");
    }

    #[test]
    fn falls_back_to_month_first_when_day_first_is_impossible() {
        let dt = parse_announcement_date("01/15/2024 14:30", DateOrder::DayFirst).unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_month_name_layouts() {
        assert_eq!(parse("15-Jan-2024 14:30"), "2024-01-15 14:30:00");
        assert_eq!(parse("Jan 15 2024 14:30"), "2024-01-15 14:30:00");
        assert_eq!(parse("15-Jan-2024"), "2024-01-15 00:00:00");
    }

    #[test]
    fn parses_iso_date_with_twelve_hour_clock() {
        assert_eq!(parse("2024-01-15 2:30 PM"), "2024-01-15 14:30:00");
        assert_eq!(parse("2024-01-15 02:30:10 AM"), "2024-01-15 02:30:10");
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_announcement_date("not-a-date", DateOrder::MonthFirst).is_none());
        assert!(parse_announcement_date("", DateOrder::MonthFirst).is_none());
        assert!(parse_announcement_date("13/45/2024", DateOrder::MonthFirst).is_none());
    }
}
