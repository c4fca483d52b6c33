//! Query-string codec for dashboard filter state.
//!
//! The query string is the only filter state that survives between views:
//! `start`/`end` carry the date range as canonical keys, `platform`, `closer`
//! and `setter` carry equality filters, and `sort` carries the display order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::calendar::CalendarDate;
use crate::date_range::DateRange;
use crate::error::{Error, Result};

pub const START_KEY: &str = "start";
pub const END_KEY: &str = "end";
pub const SORT_KEY: &str = "sort";

/// Query keys decoded as equality filters.
pub const EXTRA_FILTER_KEYS: &[&str] = &["platform", "closer", "setter"];

/// Equality filters keyed by record field name.
pub type ExtraFilters = BTreeMap<String, String>;

/// An ordered key/value view of a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap(BTreeMap<String, String>);

impl QueryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=two`, with or without a leading `?`.
    ///
    /// Pairs that fail percent-decoding are skipped; a repeated key keeps its
    /// last value.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut map = BTreeMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match (decode_component(key), decode_component(value)) {
                (Some(key), Some(value)) if !key.is_empty() => {
                    map.insert(key, value);
                }
                _ => warn!("skipping undecodable query pair '{pair}'"),
            }
        }
        Self(map)
    }

    /// Render as `a=1&b=two` with percent-encoded components, keys sorted.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}

/// Encode a range and extra filters.
///
/// Absent bounds and empty filter values are omitted entirely rather than
/// written as empty strings. Only [`EXTRA_FILTER_KEYS`] are written from
/// `extras`; any other key (including `start`, `end` and `sort`) is dropped.
#[must_use]
pub fn encode(range: &DateRange, extras: &ExtraFilters) -> QueryMap {
    let mut query = QueryMap::new();
    for &key in EXTRA_FILTER_KEYS {
        if let Some(value) = extras.get(key).filter(|v| !v.is_empty()) {
            query.insert(key, value.clone());
        }
    }
    if let Some(start) = range.start {
        query.insert(START_KEY, start.to_key());
    }
    if let Some(end) = range.end {
        query.insert(END_KEY, end.to_key());
    }
    query
}

/// Strictly decode the `start`/`end` keys.
///
/// Fails with `InvalidDateFormat` if either key is present but malformed.
pub fn decode_range(query: &QueryMap) -> Result<DateRange> {
    let start = query.get(START_KEY).map(CalendarDate::from_key).transpose()?;
    let end = query.get(END_KEY).map(CalendarDate::from_key).transpose()?;
    Ok(DateRange::new(start, end))
}

/// Collect the recognised extra filters with non-empty values.
#[must_use]
pub fn decode_extras(query: &QueryMap) -> ExtraFilters {
    EXTRA_FILTER_KEYS
        .iter()
        .filter_map(|&key| {
            query
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_string(), v.to_string()))
        })
        .collect()
}

/// Leniently decode a query.
///
/// A malformed bound is treated as absent instead of failing, since the
/// query string is user-editable. The other bound still applies.
#[must_use]
pub fn decode(query: &QueryMap) -> (DateRange, ExtraFilters) {
    let bound = |key: &str| {
        query.get(key).and_then(|raw| {
            CalendarDate::from_key(raw)
                .map_err(|e| warn!(key, "ignoring bound in query: {e}"))
                .ok()
        })
    };
    let range = DateRange::new(bound(START_KEY), bound(END_KEY));
    (range, decode_extras(query))
}

/// Replace only the range keys of `existing`, keeping every other key.
#[must_use]
pub fn merge_range(existing: &QueryMap, range: &DateRange) -> QueryMap {
    let mut merged = existing.clone();
    merged.remove(START_KEY);
    merged.remove(END_KEY);
    if let Some(start) = range.start {
        merged.insert(START_KEY, start.to_key());
    }
    if let Some(end) = range.end {
        merged.insert(END_KEY, end.to_key());
    }
    merged
}

/// Display ordering requested through the `sort` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Largest cash amount first
    Cash,
    /// Alphabetical by name
    Name,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Cash => "cash",
            Self::Name => "name",
        }
    }

    /// Parse leniently: unknown values fall back to the default.
    #[must_use]
    pub fn from_query(query: &QueryMap) -> Self {
        query
            .get(SORT_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "date" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "cash" => Ok(Self::Cash),
            "name" => Ok(Self::Name),
            other => Err(Error::other(format!("unknown sort order '{other}'"))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded filter state of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub range: DateRange,
    pub extras: ExtraFilters,
    pub sort: SortOrder,
}

impl FilterQuery {
    /// Leniently decode a full query.
    #[must_use]
    pub fn from_query(query: &QueryMap) -> Self {
        let (range, extras) = decode(query);
        Self {
            range,
            extras,
            sort: SortOrder::from_query(query),
        }
    }

    /// Encode back to a query; the default sort order is omitted.
    #[must_use]
    pub fn to_query(&self) -> QueryMap {
        let mut query = encode(&self.range, &self.extras);
        if self.sort != SortOrder::default() {
            query.insert(SORT_KEY, self.sort.as_str());
        }
        query
    }
}
