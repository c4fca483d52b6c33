//! Error types for valhalla

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date format: '{0}' (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("Sheet '{sheet}' has no column matching field '{field}'")]
    MissingColumn { sheet: String, field: String },

    #[error("Sheet error: {0}")]
    Sheet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid date format error
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDateFormat(input.into())
    }

    /// Create a missing column error
    pub fn missing_column(sheet: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingColumn {
            sheet: sheet.into(),
            field: field.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an "other" error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
