//! Spreadsheet rows as delivered by the Google Sheets `values` API.
//!
//! Fetching itself sits behind [`RowSource`]; the bundled implementation reads
//! JSON exports of the `values` payload from a local directory.

mod columns;

pub use columns::{ColumnMap, SheetField};

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A loaded sheet: one header row plus data rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The subset of a `spreadsheets.values.get` response we read.
#[derive(Debug, Deserialize)]
struct ValuesPayload {
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl Sheet {
    /// An empty sheet with no headers and no rows.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build from a header row and raw rows, padding short rows with empty cells.
    #[must_use]
    pub fn from_rows(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Parse a Sheets `values` JSON payload; the first row is the header.
    ///
    /// Numeric and boolean cells are stringified; nulls become empty cells.
    pub fn from_values_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let name = name.into();
        let payload: ValuesPayload = serde_json::from_str(json)?;
        debug!(sheet = %name, range = ?payload.range, rows = payload.values.len(), "parsed values payload");

        let mut values = payload.values.into_iter();
        let Some(header_row) = values.next() else {
            return Ok(Self::empty(name));
        };
        let headers = header_row.iter().map(cell_to_string).collect();
        let rows = values
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Ok(Self::from_rows(name, headers, rows))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows with at least one non-blank cell.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows
            .iter()
            .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
            .map(Vec::as_slice)
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Anything that can hand over a sheet by name.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch(&self, sheet: &str) -> Result<Sheet>;
}

/// Fetch a sheet, degrading to an empty one on failure.
///
/// Downstream filtering and aggregation never see fetch errors.
pub async fn fetch_or_empty(source: &dyn RowSource, sheet: &str) -> Sheet {
    match source.fetch(sheet).await {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!("could not load sheet '{sheet}': {e}");
            Sheet::empty(sheet)
        }
    }
}

/// Reads `<dir>/<sheet>.json` exports of the Sheets `values` payload.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    dir: PathBuf,
}

impl JsonExportSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the export file for `sheet`.
    #[must_use]
    pub fn path_for(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.json"))
    }
}

#[async_trait]
impl RowSource for JsonExportSource {
    async fn fetch(&self, sheet: &str) -> Result<Sheet> {
        let path = self.path_for(sheet);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::Sheet(format!("reading {}: {e}", path.display()))
        })?;
        Sheet::from_values_json(sheet, &contents)
    }
}

/// In-memory source keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: HashMap<String, Sheet>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.insert(sheet.name.clone(), sheet);
        self
    }
}

#[async_trait]
impl RowSource for MemorySource {
    async fn fetch(&self, sheet: &str) -> Result<Sheet> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| Error::Sheet(format!("no sheet named '{sheet}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "range": "Sales!A1:D4",
        "majorDimension": "ROWS",
        "values": [
            ["Date", "Name", "Cash", "Closed"],
            ["2024-01-05", "Ada", 1200.5, true],
            ["2024-01-06", "Grace"],
            []
        ]
    }"#;

    #[test]
    fn test_parse_values_payload() {
        let sheet = Sheet::from_values_json("Sales", PAYLOAD).unwrap();
        assert_eq!(sheet.headers, ["Date", "Name", "Cash", "Closed"]);
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.rows[0], ["2024-01-05", "Ada", "1200.5", "true"]);
        assert_eq!(sheet.rows[1], ["2024-01-06", "Grace", "", ""]);
        assert_eq!(sheet.data_rows().count(), 2);
    }

    #[test]
    fn test_parse_empty_payload() {
        let sheet = Sheet::from_values_json("Leads", r#"{"range": "Leads!A1:A1"}"#).unwrap();
        assert!(sheet.is_empty());
        assert!(sheet.headers.is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            Sheet::from_values_json("Leads", "not json"),
            Err(Error::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_json_export_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Sales Calls.json"), PAYLOAD).unwrap();

        let source = JsonExportSource::new(dir.path());
        let sheet = source.fetch("Sales Calls").await.unwrap();
        assert_eq!(sheet.name, "Sales Calls");
        assert_eq!(sheet.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_or_empty_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonExportSource::new(dir.path());
        let sheet = fetch_or_empty(&source, "Missing").await;
        assert_eq!(sheet, Sheet::empty("Missing"));
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new().with_sheet(Sheet::from_rows(
            "Videos",
            vec!["Title".into()],
            vec![vec![]],
        ));
        let sheet = source.fetch("Videos").await.unwrap();
        assert_eq!(sheet.rows, vec![vec![String::new()]]);
        assert!(source.fetch("Other").await.is_err());
    }
}
