//! Handles serialising and saving datasets in the _parquet_ file format.

pub mod dataset;

pub use dataset::save_dataset;
