//! Calendar date model.
//!
//! Pure date arithmetic shared by the range picker, the preset resolver and the
//! query codec. A [`CalendarDate`] crosses the query-string boundary only as its
//! canonical `YYYY-MM-DD` key.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// chrono format string matching the canonical date key.
pub const KEY_FORMAT: &str = "%Y-%m-%d";

/// Number of days in `month` (1-12) of `year`, or `None` for an invalid month.
///
/// Computed as the day before the first of the following month, so leap years
/// fall out of the calendar rather than a separate rule.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt().map(|last| last.day())
}

/// Weekday of the first day of `month` (1-12), Sunday = 0 through Saturday = 6.
#[must_use]
pub fn first_weekday_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.weekday().num_days_from_sunday())
}

/// A calendar day, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Create a date from a year, a 1-based month and a day of month.
    #[must_use]
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse a canonical `YYYY-MM-DD` key.
    ///
    /// Strict: the key must be exactly ten characters with zero-padded fields, so
    /// that every accepted key reformats to itself.
    pub fn from_key(key: &str) -> Result<Self> {
        let bytes = key.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(Error::invalid_date(key));
        }
        NaiveDate::parse_from_str(key, KEY_FORMAT)
            .map(Self)
            .map_err(|_| Error::invalid_date(key))
    }

    /// Format as the canonical `YYYY-MM-DD` key.
    #[must_use]
    pub fn to_key(self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// 1-based month.
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Weekday index, Sunday = 0.
    #[must_use]
    pub fn weekday_index(self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// The date `days` days earlier, saturating at the earliest representable date.
    #[must_use]
    pub fn days_before(self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    /// The date `days` days later, saturating at the latest representable date.
    #[must_use]
    pub fn days_after(self, days: u64) -> Self {
        Self(self.0.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX))
    }

    /// Midnight at the start of this day.
    #[must_use]
    pub fn start_of_day(self) -> NaiveDateTime {
        self.0.and_time(NaiveTime::MIN)
    }

    /// The last representable instant of this day (23:59:59.999...).
    #[must_use]
    pub fn end_of_day(self) -> NaiveDateTime {
        self.0
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or_else(|| self.start_of_day())
    }

    #[must_use]
    pub const fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

impl FromStr for CalendarDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_key(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_key()
    }
}

/// A validated year and 1-based month, used as a month-navigation cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a cursor; `None` if the month is outside 1-12 or the year is out of range.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        days_in_month(year, month).map(|_| Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Number of days in this month.
    #[must_use]
    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month).expect("validated on construction")
    }

    /// Weekday of the first day, Sunday = 0.
    #[must_use]
    pub fn first_weekday(self) -> u32 {
        first_weekday_of_month(self.year, self.month).expect("validated on construction")
    }

    #[must_use]
    pub fn first_day(self) -> CalendarDate {
        self.day(1).expect("day 1 is always valid")
    }

    /// Day `day` of this month, if it exists.
    #[must_use]
    pub fn day(self, day: u32) -> Option<CalendarDate> {
        CalendarDate::new(self.year, self.month, day)
    }

    /// The following month; stays put at the end of the representable range.
    #[must_use]
    pub fn next(self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year.saturating_add(1), 1)
        } else {
            (self.year, self.month + 1)
        };
        Self::new(year, month).unwrap_or(self)
    }

    /// The preceding month; stays put at the start of the representable range.
    #[must_use]
    pub fn prev(self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year.saturating_sub(1), 12)
        } else {
            (self.year, self.month - 1)
        };
        Self::new(year, month).unwrap_or(self)
    }

    /// Human-readable label, e.g. "March 2024".
    #[must_use]
    pub fn label(self) -> String {
        self.first_day().as_naive().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s.split_once('-').ok_or_else(|| Error::invalid_date(s))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(Error::invalid_date(s));
        }
        let year: i32 = year.parse().map_err(|_| Error::invalid_date(s))?;
        let month: u32 = month.parse().map_err(|_| Error::invalid_date(s))?;
        Self::new(year, month).ok_or_else(|| Error::invalid_date(s))
    }
}
