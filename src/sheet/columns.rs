//! Explicit column mapping built once from a sheet's header row.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::error::{Error, Result};

/// A typed field that can be located in a sheet by header search terms.
pub trait SheetField: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every field, in mapping order.
    const ALL: &'static [Self];

    /// Stable field name used in filters and config overrides.
    fn name(self) -> &'static str;

    /// Lowercase search terms, most specific first.
    fn search_terms(self) -> &'static [&'static str];

    /// Whether loading fails when no header matches.
    fn required(self) -> bool;
}

/// Resolved `field → column` mapping for one sheet.
#[derive(Debug, Clone)]
pub struct ColumnMap<F: SheetField> {
    sheet: String,
    columns: HashMap<F, (usize, String)>,
}

impl<F: SheetField> ColumnMap<F> {
    /// Match every field against `headers`.
    ///
    /// Two passes over [`SheetField::ALL`]: first exact (case-insensitive)
    /// header matches, then headers containing a term. Terms are tried in
    /// order within each pass, and a column claimed by one field is never
    /// handed to another, so fields listed earlier win contested headers.
    /// `overrides` maps a field name to a single search term that replaces
    /// the defaults.
    pub fn build(
        sheet: &str,
        headers: &[String],
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut claimed = vec![false; headers.len()];
        let mut columns: HashMap<F, (usize, String)> = HashMap::new();

        for exact in [true, false] {
            for &field in F::ALL {
                if columns.contains_key(&field) {
                    continue;
                }
                let override_term = overrides.get(field.name()).map(|t| t.trim().to_lowercase());
                let terms: Vec<&str> = match override_term.as_deref() {
                    Some(term) => vec![term],
                    None => field.search_terms().to_vec(),
                };
                if let Some(index) = find_column(&normalized, &claimed, &terms, exact) {
                    debug!(
                        sheet,
                        field = field.name(),
                        header = %headers[index],
                        exact,
                        "mapped column"
                    );
                    claimed[index] = true;
                    columns.insert(field, (index, headers[index].clone()));
                }
            }
        }

        for &field in F::ALL {
            if columns.contains_key(&field) {
                continue;
            }
            if field.required() {
                return Err(Error::missing_column(sheet, field.name()));
            }
            debug!(sheet, field = field.name(), "optional column not found");
        }

        Ok(Self {
            sheet: sheet.to_string(),
            columns,
        })
    }

    #[must_use]
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Column index for `field`, if mapped.
    #[must_use]
    pub fn index(&self, field: F) -> Option<usize> {
        self.columns.get(&field).map(|(i, _)| *i)
    }

    /// Original header text matched for `field`.
    #[must_use]
    pub fn header(&self, field: F) -> Option<&str> {
        self.columns.get(&field).map(|(_, h)| h.as_str())
    }

    /// Trimmed, non-empty cell for `field` in `row`.
    #[must_use]
    pub fn cell<'a>(&self, row: &'a [String], field: F) -> Option<&'a str> {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    /// Owned version of [`ColumnMap::cell`].
    #[must_use]
    pub fn cell_owned(&self, row: &[String], field: F) -> Option<String> {
        self.cell(row, field).map(str::to_string)
    }
}

fn find_column(headers: &[String], claimed: &[bool], terms: &[&str], exact: bool) -> Option<usize> {
    terms.iter().find_map(|term| {
        headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !claimed[*i])
            .find(|(_, h)| if exact { h.as_str() == *term } else { h.contains(term) })
            .map(|(i, _)| i)
    })
}
