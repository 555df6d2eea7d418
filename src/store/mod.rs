//! Storage boundaries for records and datasets.

pub mod datasets;
pub mod records;

use std::path::PathBuf;

use parquet::errors::ParquetError;
use thiserror::Error;

use crate::{dataset::Dataset, record::Fields};

pub use datasets::DirDatasetStore;
pub use records::DirRecordStore;

/// Enumerable, readable collection of persisted records.
pub trait RecordStore {
    /// Names of every entry in the store, in no particular order.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// The single row held by the named record.
    fn read(&self, name: &str) -> Result<Fields, StoreError>;
}

/// Durable destination for merged datasets.
pub trait DatasetStore {
    /// Replaces whatever is stored under the dataset's key and returns where it went.
    fn write(&self, dataset: &Dataset) -> Result<String, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to list store '{0}'")]
    List(PathBuf, #[source] std::io::Error),

    #[error("Failed to read record '{name}'")]
    Read {
        name: String,
        #[source]
        source: csv::Error,
    },

    #[error("Record '{name}' holds {found} data rows, expected exactly one")]
    RowCount { name: String, found: usize },

    #[error("Record '{0}' has a different number of values than columns")]
    Ragged(String),

    #[error("I/O error writing '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing CSV '{0}'")]
    WriteCsv(PathBuf, #[source] csv::Error),

    #[error("Encoding error writing parquet '{0}'")]
    WriteParquet(PathBuf, #[source] ParquetError),
}
