//! Location, sublocation and station configuration.
//!
//! ```toml
//! [api]
//! base_url = "https://danepubliczne.imgw.pl/api/data"
//!
//! [[locations]]
//! name = "biebrza"
//!
//! [[locations.sublocations]]
//! name = "mscichy"
//! stations = [
//!     { source = "hydro-primary", station = "153220080" },
//!     { source = "meteo", station = "353220100" },
//! ]
//! ```

use std::{
    collections::{BTreeSet, HashSet},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::record::{name::is_identifier, Source};

pub const DEFAULT_BASE_URL: &str = "https://danepubliczne.imgw.pl/api/data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Malformed configuration")]
    Parse(#[from] toml::de::Error),

    #[error("No locations configured")]
    NoLocations,

    #[error("Location '{0}' has no sublocations")]
    NoSublocations(String),

    #[error("Sublocation '{0}/{1}' has no stations")]
    NoStations(String, String),

    #[error("'{0}' is not a valid name; use ASCII letters, digits and '-'")]
    InvalidName(String),

    #[error("Sublocation '{1}' appears twice in location '{0}'")]
    DuplicateSublocation(String, String),

    #[error("Source '{2}' appears twice in '{0}/{1}'")]
    DuplicateSource(String, String, Source),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub sublocations: Vec<Sublocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sublocation {
    pub name: String,
    #[serde(default)]
    pub stations: Vec<Station>,
}

impl Sublocation {
    /// Configured sources, in configuration order.
    pub fn sources(&self) -> Vec<Source> {
        self.stations.iter().map(|s| s.source).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Station {
    pub source: Source,
    pub station: String,
}

impl LocationsConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: LocationsConfig = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    /// `<config dir>/hydromet/locations.toml`, where the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hydromet").join("locations.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locations.is_empty() {
            return Err(ConfigError::NoLocations);
        }

        for location in &self.locations {
            check_name(&location.name)?;
            if location.sublocations.is_empty() {
                return Err(ConfigError::NoSublocations(location.name.clone()));
            }

            let mut seen_sublocations = HashSet::new();
            for sublocation in &location.sublocations {
                check_name(&sublocation.name)?;
                if !seen_sublocations.insert(sublocation.name.as_str()) {
                    return Err(ConfigError::DuplicateSublocation(
                        location.name.clone(),
                        sublocation.name.clone(),
                    ));
                }
                if sublocation.stations.is_empty() {
                    return Err(ConfigError::NoStations(
                        location.name.clone(),
                        sublocation.name.clone(),
                    ));
                }

                let mut seen_sources = HashSet::new();
                for station in &sublocation.stations {
                    if !seen_sources.insert(station.source) {
                        return Err(ConfigError::DuplicateSource(
                            location.name.clone(),
                            sublocation.name.clone(),
                            station.source,
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Every (location, sublocation) pair in configuration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Location, &Sublocation)> {
        self.locations
            .iter()
            .flat_map(|l| l.sublocations.iter().map(move |s| (l, s)))
    }

    pub fn sources_in_use(&self) -> BTreeSet<Source> {
        self.pairs()
            .flat_map(|(_, sublocation)| sublocation.sources())
            .collect()
    }
}

fn check_name(name: &str) -> Result<(), ConfigError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

// -- Tests -------------------------------------------------------------------
