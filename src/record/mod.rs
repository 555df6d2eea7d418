//! Persisted poll results and their identity.

pub mod name;

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use name::NameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// The IMGW feed a record was polled from.
pub enum Source {
    HydroPrimary,
    HydroSecondary,
    Meteo,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::HydroPrimary, Source::HydroSecondary, Source::Meteo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::HydroPrimary => "hydro-primary",
            Source::HydroSecondary => "hydro-secondary",
            Source::Meteo => "meteo",
        }
    }

    /// Path segment of the public API endpoint serving this source.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Source::HydroPrimary => "hydro",
            Source::HydroSecondary => "hydro2",
            Source::Meteo => "meteo",
        }
    }

    /// Name of the JSON field holding the station identifier in this source's payload.
    pub fn station_field(&self) -> &'static str {
        match self {
            Source::HydroPrimary => "id_stacji",
            Source::HydroSecondary | Source::Meteo => "kod_stacji",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| NameError::Source(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identifies one (location, sublocation, source) series.
pub struct GroupKey {
    pub location: String,
    pub sublocation: String,
    pub source: Source,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.location, self.sublocation, self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Everything a record's stored name says about it.
///
/// Construction validates the identifiers and truncates the timestamp to whole
/// seconds, so every `RecordId` can be encoded and decoded back unchanged.
pub struct RecordId {
    location: String,
    sublocation: String,
    source: Source,
    captured_at: NaiveDateTime,
}

impl RecordId {
    pub fn new(
        location: &str,
        sublocation: &str,
        source: Source,
        captured_at: NaiveDateTime,
    ) -> Result<Self, NameError> {
        for identifier in [location, sublocation] {
            if !name::is_identifier(identifier) {
                return Err(NameError::Identifier(identifier.to_string()));
            }
        }

        // The name carries a four digit year.
        if !(0..=9999).contains(&captured_at.year()) {
            return Err(NameError::Timestamp(captured_at.to_string()));
        }
        let captured_at = captured_at
            .with_nanosecond(0)
            .ok_or_else(|| NameError::Timestamp(captured_at.to_string()))?;

        Ok(RecordId {
            location: location.to_string(),
            sublocation: sublocation.to_string(),
            source,
            captured_at,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn sublocation(&self) -> &str {
        &self.sublocation
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            location: self.location.clone(),
            sublocation: self.sublocation.clone(),
            source: self.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// One tabular row: field names in column order and the matching values.
pub struct Fields {
    names: Vec<String>,
    values: Vec<String>,
}

impl Fields {
    /// Pairs names with values. Returns `None` when the lengths differ.
    pub fn new(names: Vec<String>, values: Vec<String>) -> Option<Self> {
        (names.len() == values.len()).then_some(Fields { names, values })
    }

    /// Flattens a JSON object, keeping key order. `null` becomes an empty cell.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let mut names = Vec::with_capacity(object.len());
        let mut values = Vec::with_capacity(object.len());

        for (key, value) in object {
            names.push(key.clone());
            values.push(match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }

        Fields { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the values laid out in `schema` column order, or `None` when
    /// this row's field-name set differs from the schema's.
    pub fn values_in(&self, schema: &[String]) -> Option<Vec<String>> {
        if self.names == schema {
            return Some(self.values.clone());
        }

        let lookup: HashMap<&str, &str> = self
            .names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
            .collect();

        // Duplicate names cannot be matched up unambiguously.
        if lookup.len() != self.names.len() || self.names.len() != schema.len() {
            return None;
        }

        schema
            .iter()
            .map(|name| lookup.get(name.as_str()).map(|v| v.to_string()))
            .collect()
    }
}

// -- Tests -------------------------------------------------------------------
