//! Merged monthly datasets.

use std::fmt;

use clap::ValueEnum;

use crate::{record::GroupKey, window::MonthWindow};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKey {
    pub group: GroupKey,
    pub window: MonthWindow,
}

impl DatasetKey {
    pub fn new(group: GroupKey, window: MonthWindow) -> Self {
        DatasetKey { group, window }
    }

    /// Canonical file stem, unique per key.
    pub fn file_stem(&self) -> String {
        format!(
            "aggregated_{}_{}_{}_{:04}_{:02}",
            self.group.location,
            self.group.sublocation,
            self.group.source,
            self.window.year(),
            self.window.month()
        )
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.group, self.window)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Rows of one series for one month, all laid out in `header` order.
pub struct Dataset {
    pub key: DatasetKey,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DatasetFormat {
    #[default]
    Csv,
    Parquet,
}

impl DatasetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DatasetFormat::Csv => "csv",
            DatasetFormat::Parquet => "parquet",
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::record::Source;

    use super::*;

    #[test]
    fn should_make_file_stem() {
        let key = DatasetKey::new(
            GroupKey {
                location: "biebrza".to_string(),
                sublocation: "mscichy".to_string(),
                source: Source::HydroPrimary,
            },
            MonthWindow::new(2025, 2).unwrap(),
        );

        assert_eq!(
            key.file_stem(),
            "aggregated_biebrza_mscichy_hydro-primary_2025_02"
        );
    }
}
