//! Date-range and equality filtering over fetched records.
//!
//! Records whose date cell is missing or unparsable are kept.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::date_range::DateRange;
use crate::query::ExtraFilters;
use crate::records::Record;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a spreadsheet date cell into a local wall-clock timestamp.
///
/// Date-only cells map to midnight. Offsets in RFC 3339 cells are dropped and
/// the written wall-clock time is kept.
#[must_use]
pub fn parse_record_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Whether a raw date cell passes `range`.
///
/// `start` is compared from the start of its day and `end` through the end of
/// its day. Missing or unparsable dates always pass.
#[must_use]
pub fn matches_range(raw_date: Option<&str>, range: &DateRange) -> bool {
    if range.is_all_time() {
        return true;
    }
    let Some(ts) = raw_date.and_then(parse_record_timestamp) else {
        return true;
    };
    range.start.is_none_or(|s| ts >= s.start_of_day()) && range.end.is_none_or(|e| ts <= e.end_of_day())
}

/// Whether `record` has exactly the value of every filter.
///
/// A record lacking a filtered field does not match.
#[must_use]
pub fn matches_extras<R: Record>(record: &R, extras: &ExtraFilters) -> bool {
    extras
        .iter()
        .all(|(key, wanted)| record.field(key) == Some(wanted.as_str()))
}

/// Keep the records that pass both the range and the extra filters.
#[must_use]
pub fn filter<'a, R: Record>(
    records: &'a [R],
    range: &DateRange,
    extras: &ExtraFilters,
) -> Vec<&'a R> {
    let kept: Vec<&R> = records
        .iter()
        .filter(|r| matches_range(r.date(), range) && matches_extras(*r, extras))
        .collect();
    tracing::debug!(
        total = records.len(),
        kept = kept.len(),
        %range,
        "filtered records"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarDate;
    use crate::records::Sale;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    fn sale(date: Option<&str>, platform: Option<&str>) -> Sale {
        Sale {
            date: date.map(String::from),
            name: "x".into(),
            platform: platform.map(String::from),
            ..Sale::default()
        }
    }

    fn january() -> DateRange {
        DateRange::between(date(2024, 1, 1), date(2024, 1, 31))
    }

    #[test]
    fn test_parse_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        for raw in [
            "2024-01-31T23:30:00",
            "2024-01-31 23:30:00",
            "2024-01-31T23:30",
            "2024-01-31T23:30:00.000",
            "2024-01-31T23:30:00+05:00",
            "01/31/2024 23:30:00",
            "1/31/2024 23:30",
        ] {
            assert_eq!(parse_record_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(
            parse_record_timestamp("2024-01-31"),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_record_timestamp("soon"), None);
        assert_eq!(parse_record_timestamp("  "), None);
    }

    #[test]
    fn test_end_bound_includes_whole_day() {
        let range = january();
        assert!(matches_range(Some("2024-01-31T23:30:00"), &range));
        assert!(matches_range(Some("2024-01-31T23:59:59.999"), &range));
        assert!(!matches_range(Some("2024-02-01T00:00:01"), &range));
    }

    #[test]
    fn test_start_bound_from_start_of_day() {
        let range = january();
        assert!(matches_range(Some("2024-01-01T00:00:00"), &range));
        assert!(matches_range(Some("2024-01-01"), &range));
        assert!(!matches_range(Some("2023-12-31T23:59:59"), &range));
    }

    #[test]
    fn test_missing_or_malformed_dates_are_included() {
        let range = january();
        assert!(matches_range(None, &range));
        assert!(matches_range(Some("TBD"), &range));

        let records = vec![sale(None, None), sale(Some("not a date"), None), sale(Some("2023-06-01"), None)];
        let kept = filter(&records, &range, &ExtraFilters::new());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_all_time_returns_everything() {
        let records = vec![
            sale(Some("1999-01-01"), None),
            sale(Some("2024-01-05"), Some("ig")),
            sale(None, None),
        ];
        let kept = filter(&records, &DateRange::all_time(), &ExtraFilters::new());
        assert_eq!(kept.len(), records.len());
        assert!(kept.iter().zip(&records).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn test_extra_filters_exact_match() {
        let records = vec![
            sale(Some("2024-01-05"), Some("ig")),
            sale(Some("2024-01-06"), Some("IG")),
            sale(Some("2024-01-07"), None),
            sale(Some("2024-03-01"), Some("ig")),
        ];
        let extras = ExtraFilters::from([("platform".to_string(), "ig".to_string())]);

        let kept = filter(&records, &january(), &extras);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date.as_deref(), Some("2024-01-05"));

        let kept = filter(&records, &DateRange::all_time(), &extras);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_open_ended_range() {
        let range = DateRange::new(Some(date(2024, 1, 15)), None);
        assert!(matches_range(Some("2030-01-01"), &range));
        assert!(!matches_range(Some("2024-01-14 23:59:59"), &range));
    }
}
