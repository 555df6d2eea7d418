//! Record store backed by a flat directory of one-row CSV files.

use std::{
    fs::{self, DirEntry},
    io,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use super::{RecordStore, StoreError};
use crate::record::{name, Fields, RecordId};

#[derive(Debug, Clone)]
pub struct DirRecordStore {
    root: PathBuf,
}

impl DirRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirRecordStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists one polled row under the record's encoded name.
    pub fn put(&self, id: &RecordId, fields: &Fields) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::WriteIo(self.root.clone(), e))?;

        let path = self.root.join(name::encode(id));
        let write_err = |e| StoreError::WriteCsv(path.clone(), e);

        let mut writer = csv::Writer::from_path(&path).map_err(write_err)?;
        writer.write_record(fields.names()).map_err(write_err)?;
        writer.write_record(fields.values()).map_err(write_err)?;
        writer
            .flush()
            .map_err(|e| StoreError::WriteIo(path.clone(), e))?;

        Ok(path)
    }
}

impl RecordStore for DirRecordStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries =
            fs::read_dir(&self.root).map_err(|e| StoreError::List(self.root.clone(), e))?;

        Ok(entries.filter_map(file_name).collect())
    }

    fn read(&self, name: &str) -> Result<Fields, StoreError> {
        let read_err = |source| StoreError::Read {
            name: name.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(self.root.join(name))
            .map_err(read_err)?;
        let header: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(String::from)
            .collect();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        match rows.as_slice() {
            [row] => {
                let values = row.iter().map(String::from).collect();
                Fields::new(header, values).ok_or_else(|| StoreError::Ragged(name.to_string()))
            }
            _ => Err(StoreError::RowCount {
                name: name.to_string(),
                found: rows.len(),
            }),
        }
    }
}

// A single unreadable entry is skipped; only an unreadable root fails the listing.
fn file_name(entry: io::Result<DirEntry>) -> Option<String> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Skipping unreadable store entry: {}", e);
            return None;
        }
    };

    match entry.file_type() {
        Ok(file_type) if file_type.is_file() => {}
        Ok(_) => {
            debug!("Ignoring non-file entry {:?}", entry.path());
            return None;
        }
        Err(e) => {
            warn!("Skipping store entry {:?}: {}", entry.path(), e);
            return None;
        }
    }

    match entry.file_name().into_string() {
        Ok(name) => Some(name),
        Err(raw) => {
            debug!("Ignoring non UTF-8 file name {:?}", raw);
            None
        }
    }
}

// -- Tests -------------------------------------------------------------------
