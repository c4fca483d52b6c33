//! Configuration management for valhalla

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::date_range::{Preset, PresetRule};
use crate::error::{Error, Result};
use crate::utm::parse_base_url;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Where sheet exports live and what they are called
    pub sheets: SheetsConfig,

    /// Header search-term overrides
    pub columns: ColumnsConfig,

    /// View defaults
    pub dashboard: DashboardConfig,

    /// UTM link defaults
    pub utm: UtmConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Data directory (default: ~/.local/share/valhalla)
    pub data_dir: Option<PathBuf>,
}

/// Sheet export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Directory holding `<sheet>.json` values exports (default: `<data_dir>/sheets`)
    pub export_dir: Option<PathBuf>,

    /// Sales calls sheet name
    pub sales: String,

    /// Lead-flow submissions sheet name
    pub leads: String,

    /// Published videos sheet name
    pub videos: String,
}

/// Per-sheet `field = "header search term"` overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub sales: BTreeMap<String, String>,
    pub leads: BTreeMap<String, String>,
    pub videos: BTreeMap<String, String>,
}

/// View defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Preset applied when a view has no range in its query (e.g. "last-30-days")
    pub default_preset: String,

    /// Rows shown in listings
    pub row_limit: usize,
}

/// UTM link defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UtmConfig {
    /// Landing page the links point to
    pub base_url: String,
    pub source: String,
    pub medium: String,
    pub campaign: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: None,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            sales: "Sales Calls".to_string(),
            leads: "Lead Flow".to_string(),
            videos: "Videos".to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_preset: "all-time".to_string(),
            row_limit: 25,
        }
    }
}

impl Default for UtmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com/apply".to_string(),
            source: "youtube".to_string(),
            medium: "video".to_string(),
            campaign: "organic".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join("valhalla").join("config.toml"))
    }

    /// Get the data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.general.data_dir {
            Ok(dir.clone())
        } else {
            let data_dir = dirs::data_local_dir()
                .ok_or_else(|| Error::config("Could not determine data directory"))?;
            Ok(data_dir.join("valhalla"))
        }
    }

    /// Get the sheet export directory
    pub fn export_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.sheets.export_dir {
            return Ok(dir.clone());
        }
        Ok(self.data_dir()?.join("sheets"))
    }

    /// Get the archived-videos file path
    pub fn archive_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("archived_videos.json"))
    }

    /// The preset used when a query carries no range.
    pub fn default_preset(&self) -> Result<Preset> {
        self.dashboard
            .default_preset
            .parse::<PresetRule>()
            .map(Preset::from)
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        // Validate log_level is a known level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        self.default_preset().map_err(|_| {
            Error::config(format!(
                "default_preset '{}' is not a known preset",
                self.dashboard.default_preset
            ))
        })?;

        if self.dashboard.row_limit == 0 {
            return Err(Error::config("row_limit must be at least 1"));
        }

        for (label, name) in [
            ("sales", &self.sheets.sales),
            ("leads", &self.sheets.leads),
            ("videos", &self.sheets.videos),
        ] {
            if name.trim().is_empty() {
                return Err(Error::config(format!("sheets.{label} must not be empty")));
            }
        }

        parse_base_url(&self.utm.base_url)?;

        Ok(())
    }
}
