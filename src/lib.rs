//! # Valhalla
//!
//! Sales, lead-flow and YouTube attribution dashboard over Google Sheets exports.
//!
//! This crate provides:
//! - A calendar date model and a two-click range picker
//! - Named date presets resolved against an explicit "today"
//! - A query-string codec that carries filter state between views
//! - Typed records mapped from sheet headers, with date/equality filtering
//! - Aggregation, YouTube attribution and UTM link generation
//!
//! Every view runs the same pipeline: load rows → map columns → filter by the
//! decoded query → aggregate → render.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod archive;
pub mod attribution;
pub mod calendar;
pub mod config;
pub mod date_range;
pub mod display;
pub mod error;
pub mod filter;
pub mod picker;
pub mod query;
pub mod records;
pub mod sheet;
pub mod types;
pub mod utm;

pub use calendar::CalendarDate;
pub use config::Config;
pub use date_range::{DateRange, Preset, PresetRule};
pub use error::{Error, Result};
pub use query::{FilterQuery, QueryMap};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "valhalla";
