//! Typed records mapped from the dashboard's sheets.

use std::collections::BTreeMap;

use tracing::debug;

use crate::attribution::extract_video_id;
use crate::error::Result;
use crate::sheet::{ColumnMap, Sheet, SheetField};
use crate::types::Money;

/// A row that can be filtered by date and by named string fields.
pub trait Record {
    /// Raw date cell, if present.
    fn date(&self) -> Option<&str>;

    /// Raw value of a named field, if present.
    fn field(&self, name: &str) -> Option<&str>;
}

impl<T: Record + ?Sized> Record for &T {
    fn date(&self) -> Option<&str> {
        (**self).date()
    }

    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }
}

/// Generates a [`SheetField`] enum with names, search terms and required flags.
macro_rules! sheet_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($field:literal, [$($term:literal),+ $(,)?], $required:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl SheetField for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $field),+
                }
            }

            fn search_terms(self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($term),+]),+
                }
            }

            fn required(self) -> bool {
                match self {
                    $(Self::$variant => $required),+
                }
            }
        }
    };
}

sheet_fields! {
    /// Columns of the sales-calls sheet.
    /// Declared most specific first; `Name` goes last so "Closer Name" and
    /// "Setter Name" headers are claimed before the generic term is tried.
    pub enum SaleField {
        Date => ("date", ["date", "timestamp", "booked"], true),
        Closer => ("closer", ["closer"], false),
        Setter => ("setter", ["setter"], false),
        Email => ("email", ["email", "e-mail"], false),
        Platform => ("platform", ["platform", "source"], false),
        Outcome => ("outcome", ["outcome", "result", "status"], false),
        Cash => ("cash", ["cash collected", "cash"], false),
        Revenue => ("revenue", ["revenue", "contract value", "deal value"], false),
        Name => ("name", ["prospect", "name", "lead"], true),
    }
}

sheet_fields! {
    /// Columns of the lead-flow submissions sheet.
    pub enum LeadField {
        Date => ("date", ["date", "timestamp", "submitted"], true),
        Email => ("email", ["email", "e-mail"], false),
        Platform => ("platform", ["platform", "channel"], false),
        Source => ("source", ["utm", "source", "url", "link"], false),
        Name => ("name", ["name"], true),
    }
}

sheet_fields! {
    /// Columns of the videos sheet.
    pub enum VideoField {
        Date => ("date", ["published", "date"], false),
        Title => ("title", ["title", "name"], true),
        Url => ("url", ["url", "link"], true),
    }
}

/// One row of the sales-calls sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sale {
    pub date: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub platform: Option<String>,
    pub closer: Option<String>,
    pub setter: Option<String>,
    pub outcome: Option<String>,
    pub cash: Option<String>,
    pub revenue: Option<String>,
}

impl Sale {
    /// Map every non-blank row of `sheet`.
    pub fn from_sheet(sheet: &Sheet, overrides: &BTreeMap<String, String>) -> Result<Vec<Self>> {
        if sheet.headers.is_empty() {
            return Ok(Vec::new());
        }
        let map = ColumnMap::<SaleField>::build(&sheet.name, &sheet.headers, overrides)?;
        let sales: Vec<Self> = sheet
            .data_rows()
            .map(|row| Self {
                date: map.cell_owned(row, SaleField::Date),
                name: map.cell_owned(row, SaleField::Name).unwrap_or_default(),
                email: map.cell_owned(row, SaleField::Email),
                platform: map.cell_owned(row, SaleField::Platform),
                closer: map.cell_owned(row, SaleField::Closer),
                setter: map.cell_owned(row, SaleField::Setter),
                outcome: map.cell_owned(row, SaleField::Outcome),
                cash: map.cell_owned(row, SaleField::Cash),
                revenue: map.cell_owned(row, SaleField::Revenue),
            })
            .collect();
        debug!(sheet = %sheet.name, count = sales.len(), "mapped sales");
        Ok(sales)
    }

    /// Cash collected, zero when blank or malformed.
    #[must_use]
    pub fn cash(&self) -> Money {
        self.cash.as_deref().map_or(Money::ZERO, Money::parse_lenient)
    }

    /// Contract revenue, zero when blank or malformed.
    #[must_use]
    pub fn revenue(&self) -> Money {
        self.revenue.as_deref().map_or(Money::ZERO, Money::parse_lenient)
    }
}

impl Record for Sale {
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "date" => self.date.as_deref(),
            "name" => Some(self.name.as_str()),
            "email" => self.email.as_deref(),
            "platform" => self.platform.as_deref(),
            "closer" => self.closer.as_deref(),
            "setter" => self.setter.as_deref(),
            "outcome" => self.outcome.as_deref(),
            "cash" => self.cash.as_deref(),
            "revenue" => self.revenue.as_deref(),
            _ => None,
        }
    }
}

/// One lead-flow form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lead {
    pub date: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub platform: Option<String>,
    /// Landing link or UTM content the lead arrived with
    pub source: Option<String>,
}

impl Lead {
    pub fn from_sheet(sheet: &Sheet, overrides: &BTreeMap<String, String>) -> Result<Vec<Self>> {
        if sheet.headers.is_empty() {
            return Ok(Vec::new());
        }
        let map = ColumnMap::<LeadField>::build(&sheet.name, &sheet.headers, overrides)?;
        let leads: Vec<Self> = sheet
            .data_rows()
            .map(|row| Self {
                date: map.cell_owned(row, LeadField::Date),
                name: map.cell_owned(row, LeadField::Name).unwrap_or_default(),
                email: map.cell_owned(row, LeadField::Email),
                platform: map.cell_owned(row, LeadField::Platform),
                source: map.cell_owned(row, LeadField::Source),
            })
            .collect();
        debug!(sheet = %sheet.name, count = leads.len(), "mapped leads");
        Ok(leads)
    }

    /// YouTube video the lead was attributed to, if its source names one.
    #[must_use]
    pub fn video_id(&self) -> Option<String> {
        self.source.as_deref().and_then(extract_video_id)
    }
}

impl Record for Lead {
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "date" => self.date.as_deref(),
            "name" => Some(self.name.as_str()),
            "email" => self.email.as_deref(),
            "platform" => self.platform.as_deref(),
            "source" => self.source.as_deref(),
            _ => None,
        }
    }
}

/// A published video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Video {
    pub date: Option<String>,
    pub title: String,
    pub url: String,
}

impl Video {
    pub fn from_sheet(sheet: &Sheet, overrides: &BTreeMap<String, String>) -> Result<Vec<Self>> {
        if sheet.headers.is_empty() {
            return Ok(Vec::new());
        }
        let map = ColumnMap::<VideoField>::build(&sheet.name, &sheet.headers, overrides)?;
        Ok(sheet
            .data_rows()
            .map(|row| Self {
                date: map.cell_owned(row, VideoField::Date),
                title: map.cell_owned(row, VideoField::Title).unwrap_or_default(),
                url: map.cell_owned(row, VideoField::Url).unwrap_or_default(),
            })
            .collect())
    }

    #[must_use]
    pub fn video_id(&self) -> Option<String> {
        extract_video_id(&self.url)
    }
}

impl Record for Video {
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "date" => self.date.as_deref(),
            "title" => Some(self.title.as_str()),
            "url" => Some(self.url.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_string()).collect()
    }

    fn sales_sheet() -> Sheet {
        Sheet::from_rows(
            "Sales Calls",
            strings(&[
                "Call Date",
                "Prospect Name",
                "Email",
                "Platform",
                "Closer",
                "Setter",
                "Outcome",
                "Cash Collected",
                "Revenue",
            ]),
            vec![
                strings(&[
                    "2024-01-05",
                    "Ada Lovelace",
                    "ada@example.com",
                    "ig",
                    "Dana",
                    "Bo",
                    "Closed",
                    "$1,200.50",
                    "$3,000",
                ]),
                strings(&["", "", ""]),
                strings(&["01/06/2024", "Grace Hopper"]),
            ],
        )
    }

    #[test]
    fn test_sales_from_sheet() {
        let sales = Sale::from_sheet(&sales_sheet(), &BTreeMap::new()).unwrap();
        assert_eq!(sales.len(), 2);

        let ada = &sales[0];
        assert_eq!(ada.name, "Ada Lovelace");
        assert_eq!(ada.closer.as_deref(), Some("Dana"));
        assert!((ada.cash().get() - 1200.50).abs() < 1e-9);
        assert!((ada.revenue().get() - 3000.0).abs() < 1e-9);

        let grace = &sales[1];
        assert_eq!(grace.date(), Some("01/06/2024"));
        assert_eq!(grace.platform, None);
        assert!(grace.cash().is_zero());
    }

    #[test]
    fn test_sale_field_lookup() {
        let sales = Sale::from_sheet(&sales_sheet(), &BTreeMap::new()).unwrap();
        assert_eq!(sales[0].field("setter"), Some("Bo"));
        assert_eq!(sales[0].field("cash"), Some("$1,200.50"));
        assert_eq!(sales[0].field("nope"), None);
        assert_eq!((&sales[0]).field("platform"), Some("ig"));
    }

    #[test]
    fn test_role_name_headers_do_not_steal_prospect_name() {
        let sheet = Sheet::from_rows(
            "Sales Calls",
            strings(&["Date", "Setter Name", "Closer Name", "Prospect Name", "Cash Collected"]),
            vec![strings(&["2024-01-05", "Bo", "Dana", "Ada Lovelace", "$500"])],
        );
        let sales = Sale::from_sheet(&sheet, &BTreeMap::new()).unwrap();
        assert_eq!(sales[0].name, "Ada Lovelace");
        assert_eq!(sales[0].closer.as_deref(), Some("Dana"));
        assert_eq!(sales[0].setter.as_deref(), Some("Bo"));
        assert!((sales[0].cash().get() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_required_column() {
        let sheet = Sheet::from_rows("Sales Calls", strings(&["Closer", "Cash"]), vec![]);
        let err = Sale::from_sheet(&sheet, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref field, .. } if field == "date"));
    }

    #[test]
    fn test_empty_sheet_maps_to_no_records() {
        let sales = Sale::from_sheet(&Sheet::empty("Sales Calls"), &BTreeMap::new()).unwrap();
        assert!(sales.is_empty());
    }

    #[test]
    fn test_leads_with_video_source() {
        let sheet = Sheet::from_rows(
            "Lead Flow",
            strings(&["Timestamp", "Name", "Email", "UTM Link"]),
            vec![
                strings(&[
                    "2024-02-01 10:00:00",
                    "Ada Lovelace",
                    "ada@example.com",
                    "https://example.com/apply?utm_source=youtube&utm_content=dQw4w9WgXcQ",
                ]),
                strings(&["2024-02-02", "Alan Turing", "", ""]),
            ],
        );
        let leads = Lead::from_sheet(&sheet, &BTreeMap::new()).unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].video_id().as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(leads[1].video_id(), None);
        assert_eq!(leads[1].email, None);
    }

    #[test]
    fn test_videos_from_sheet() {
        let sheet = Sheet::from_rows(
            "Videos",
            strings(&["Published", "Video Title", "Link"]),
            vec![strings(&[
                "2024-01-01",
                "How we scaled",
                "https://youtu.be/dQw4w9WgXcQ",
            ])],
        );
        let videos = Video::from_sheet(&sheet, &BTreeMap::new()).unwrap();
        assert_eq!(videos[0].title, "How we scaled");
        assert_eq!(videos[0].video_id().as_deref(), Some("dQw4w9WgXcQ"));
    }
}
