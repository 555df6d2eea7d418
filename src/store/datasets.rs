//! Dataset store backed by a directory of CSV or parquet files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use super::{DatasetStore, StoreError};
use crate::{
    dataset::{Dataset, DatasetFormat, DatasetKey},
    parquet,
};

#[cfg(unix)]
const DATASET_MODE: u32 = 0o644;

#[derive(Debug, Clone)]
pub struct DirDatasetStore {
    root: PathBuf,
    format: DatasetFormat,
}

impl DirDatasetStore {
    pub fn new(root: impl Into<PathBuf>, format: DatasetFormat) -> Self {
        DirDatasetStore {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &DatasetKey) -> PathBuf {
        self.root
            .join(format!("{}.{}", key.file_stem(), self.format.extension()))
    }
}

impl DatasetStore for DirDatasetStore {
    // Written beside the target and renamed over it, so readers never see a
    // half-written file and a rerun replaces rather than appends.
    fn write(&self, dataset: &Dataset) -> Result<String, StoreError> {
        let path = self.path_for(&dataset.key);
        let io_err = |e| StoreError::WriteIo(path.clone(), e);

        fs::create_dir_all(&self.root).map_err(io_err)?;
        let mut temp = NamedTempFile::new_in(&self.root).map_err(io_err)?;

        match self.format {
            DatasetFormat::Csv => write_csv(dataset, temp.as_file_mut())
                .map_err(|e| StoreError::WriteCsv(path.clone(), e))?,
            DatasetFormat::Parquet => {
                let file = temp.as_file().try_clone().map_err(io_err)?;
                parquet::save_dataset(dataset, file)
                    .map_err(|e| StoreError::WriteParquet(path.clone(), e))?
            }
        }

        // Temp files are created owner-only; datasets are read by other processes.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(DATASET_MODE))
                .map_err(io_err)?;
        }

        temp.persist(&path).map_err(|e| io_err(e.error))?;

        Ok(path.to_string_lossy().to_string())
    }
}

fn write_csv(dataset: &Dataset, file: &mut fs::File) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(&dataset.header)?;
    for row in &dataset.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
