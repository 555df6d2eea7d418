pub mod aggregate;
pub mod poll;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
pub use aggregate::aggregate;
use chrono::{NaiveDate, NaiveDateTime};
pub use poll::poll;

use crate::config::LocationsConfig;

/// Loads the explicit configuration file, or the default one.
pub fn load_config(path: Option<&PathBuf>) -> Result<LocationsConfig> {
    let path = match path {
        Some(path) => path.clone(),
        None => LocationsConfig::default_path()
            .ok_or_else(|| anyhow!("No configuration directory; pass --config"))?,
    };

    LocationsConfig::load(&path)
        .with_context(|| format!("Unable to use configuration '{}'", path.display()))
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_reference(s: &str) -> Result<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("'{}' is not a date or date-time", s))
}

// -- Tests -------------------------------------------------------------------
