//! Date ranges and named presets for filtering dashboard views.
//!
//! This module provides the `DateRange` type shared by the picker, the query
//! codec and the record filter, plus the `Preset` shortcuts ("Last 7 Days",
//! "Yesterday", "All Time") that resolve to a concrete range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;
use crate::error::{Error, Result};

/// An inclusive date range for filtering records.
///
/// Either bound may be absent, meaning "unbounded on that side". When both are
/// present `start <= end` holds; [`DateRange::new`] swaps reversed bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawDateRange")]
pub struct DateRange {
    /// Start date (inclusive), or None for no lower bound
    pub start: Option<CalendarDate>,
    /// End date (inclusive), or None for no upper bound
    pub end: Option<CalendarDate>,
}

/// Deserialized bounds before ordering is enforced.
#[derive(Deserialize)]
struct RawDateRange {
    #[serde(default)]
    start: Option<CalendarDate>,
    #[serde(default)]
    end: Option<CalendarDate>,
}

impl From<RawDateRange> for DateRange {
    fn from(raw: RawDateRange) -> Self {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a date range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(start: Option<CalendarDate>, end: Option<CalendarDate>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if e < s => Self {
                start: Some(e),
                end: Some(s),
            },
            _ => Self { start, end },
        }
    }

    /// Create a closed range between two dates in either order.
    #[must_use]
    pub fn between(a: CalendarDate, b: CalendarDate) -> Self {
        Self::new(Some(a), Some(b))
    }

    /// Create a range covering a single day.
    #[must_use]
    pub const fn single_day(date: CalendarDate) -> Self {
        Self {
            start: Some(date),
            end: Some(date),
        }
    }

    /// Create an unbounded date range (all time).
    #[must_use]
    pub const fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Check if this is an unbounded (all time) range.
    #[must_use]
    pub const fn is_all_time(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `date` lies within both bounds.
    #[must_use]
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }

    /// Number of calendar days covered, if both bounds are present.
    #[must_use]
    pub fn day_count(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(s), Some(e)) => Some((e.as_naive() - s.as_naive()).num_days() + 1),
            _ => None,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "All Time"),
            (Some(s), Some(e)) if s == e => write!(f, "{s}"),
            (Some(s), Some(e)) => write!(f, "{s} to {e}"),
            (Some(s), None) => write!(f, "since {s}"),
            (None, Some(e)) => write!(f, "until {e}"),
        }
    }
}

/// How a preset turns "today" into a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetRule {
    /// No bounds at all
    AllTime,
    /// A single day `k` days before today (0 = today, 1 = yesterday)
    DayOffset(u32),
    /// The last `n` days ending today, today counted as the nth day
    LastDays(u32),
}

impl PresetRule {
    /// Stable slug used on the command line and in config files.
    #[must_use]
    pub fn slug(self) -> String {
        match self {
            Self::AllTime => "all-time".to_string(),
            Self::DayOffset(0) => "today".to_string(),
            Self::DayOffset(1) => "yesterday".to_string(),
            Self::DayOffset(k) => format!("{k}-days-ago"),
            Self::LastDays(n) => format!("last-{n}-days"),
        }
    }

    /// Default human-readable label.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::AllTime => "All Time".to_string(),
            Self::DayOffset(0) => "Today".to_string(),
            Self::DayOffset(1) => "Yesterday".to_string(),
            Self::DayOffset(k) => format!("{k} Days Ago"),
            Self::LastDays(n) => format!("Last {n} Days"),
        }
    }
}

impl FromStr for PresetRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let slug = s.trim().to_ascii_lowercase();
        match slug.as_str() {
            "all-time" | "all" => return Ok(Self::AllTime),
            "today" => return Ok(Self::DayOffset(0)),
            "yesterday" => return Ok(Self::DayOffset(1)),
            _ => {}
        }
        if let Some(n) = slug
            .strip_prefix("last-")
            .and_then(|rest| rest.strip_suffix("-days"))
            .and_then(|n| n.parse::<u32>().ok())
        {
            return Ok(Self::LastDays(n));
        }
        if let Some(k) = slug
            .strip_suffix("-days-ago")
            .and_then(|k| k.parse::<u32>().ok())
        {
            return Ok(Self::DayOffset(k));
        }
        Err(Error::config(format!("unknown preset '{s}'")))
    }
}

/// A named shortcut resolved against the current day at application time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Preset {
    pub label: String,
    pub rule: PresetRule,
}

impl Preset {
    /// Create a preset with an explicit label.
    #[must_use]
    pub fn new(label: impl Into<String>, rule: PresetRule) -> Self {
        Self {
            label: label.into(),
            rule,
        }
    }

    /// Resolve against `today`. See [`resolve`].
    #[must_use]
    pub fn resolve(&self, today: CalendarDate) -> DateRange {
        resolve(self, today)
    }

    /// The built-in presets, in picker order.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        [
            PresetRule::DayOffset(0),
            PresetRule::DayOffset(1),
            PresetRule::LastDays(7),
            PresetRule::LastDays(30),
            PresetRule::LastDays(90),
            PresetRule::LastDays(365),
            PresetRule::AllTime,
        ]
        .into_iter()
        .map(Self::from)
        .collect()
    }
}

impl From<PresetRule> for Preset {
    fn from(rule: PresetRule) -> Self {
        Self::new(rule.label(), rule)
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<PresetRule>().map(Self::from)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Resolve a preset to a concrete range anchored on `today`.
///
/// `LastDays(n)` spans `today - (n - 1)` through `today`, so "Last 7 Days" is
/// exactly seven calendar days including today. `LastDays(0)` behaves as
/// `LastDays(1)`.
#[must_use]
pub fn resolve(preset: &Preset, today: CalendarDate) -> DateRange {
    match preset.rule {
        PresetRule::AllTime => DateRange::all_time(),
        PresetRule::DayOffset(k) => DateRange::single_day(today.days_before(u64::from(k))),
        PresetRule::LastDays(n) => {
            let span = u64::from(n.max(1) - 1);
            DateRange::new(Some(today.days_before(span)), Some(today))
        }
    }
}
