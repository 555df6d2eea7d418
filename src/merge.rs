//! Concatenates a group's records into one dataset and stores it.

use std::fmt;

use log::warn;

use crate::{
    classify::Entry,
    dataset::{Dataset, DatasetKey},
    store::{DatasetStore, RecordStore, StoreError},
};

#[derive(Debug)]
/// A record left out of a dataset.
pub enum Exclusion {
    Unreadable {
        name: String,
        error: StoreError,
    },
    SchemaMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Unreadable { name, error } => write!(f, "'{}' unreadable: {}", name, error),
            Exclusion::SchemaMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "'{}' has fields [{}], expected [{}]",
                name,
                found.join(", "),
                expected.join(", ")
            ),
        }
    }
}

#[derive(Debug)]
pub enum SkipReason {
    EmptyGroup,
    NoUsableRecords,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyGroup => f.write_str("no records in window"),
            SkipReason::NoUsableRecords => f.write_str("no usable records in window"),
        }
    }
}

#[derive(Debug)]
pub enum MergeOutcome {
    Written {
        location: String,
        rows: usize,
        excluded: Vec<Exclusion>,
    },
    Skipped {
        reason: SkipReason,
        excluded: Vec<Exclusion>,
    },
}

/// Reads the group's records in order and builds its dataset.
///
/// The first readable record fixes the columns. A record with the same field
/// names in another order is realigned; any other field set is excluded.
pub fn build_dataset(
    key: &DatasetKey,
    entries: &[Entry],
    records: &dyn RecordStore,
) -> (Option<Dataset>, Vec<Exclusion>) {
    let mut dataset: Option<Dataset> = None;
    let mut excluded = Vec::new();

    for entry in entries {
        let fields = match records.read(&entry.name) {
            Ok(fields) => fields,
            Err(error) => {
                excluded.push(Exclusion::Unreadable {
                    name: entry.name.clone(),
                    error,
                });
                continue;
            }
        };

        match dataset.as_mut() {
            None => {
                dataset = Some(Dataset {
                    key: key.clone(),
                    header: fields.names().to_vec(),
                    rows: vec![fields.values().to_vec()],
                })
            }
            Some(dataset) => match fields.values_in(&dataset.header) {
                Some(row) => dataset.rows.push(row),
                None => excluded.push(Exclusion::SchemaMismatch {
                    name: entry.name.clone(),
                    expected: dataset.header.clone(),
                    found: fields.names().to_vec(),
                }),
            },
        }
    }

    (dataset, excluded)
}

/// Merges one group and writes the result, replacing any earlier dataset for
/// the same key. Only a failed write is an error.
pub fn merge(
    key: &DatasetKey,
    entries: &[Entry],
    records: &dyn RecordStore,
    datasets: &dyn DatasetStore,
) -> Result<MergeOutcome, StoreError> {
    if entries.is_empty() {
        return Ok(MergeOutcome::Skipped {
            reason: SkipReason::EmptyGroup,
            excluded: Vec::new(),
        });
    }

    let (dataset, excluded) = build_dataset(key, entries, records);
    for exclusion in &excluded {
        warn!("Excluding record from {}: {}", key, exclusion);
    }

    match dataset {
        Some(dataset) => {
            let location = datasets.write(&dataset)?;
            Ok(MergeOutcome::Written {
                location,
                rows: dataset.rows.len(),
                excluded,
            })
        }
        None => Ok(MergeOutcome::Skipped {
            reason: SkipReason::NoUsableRecords,
            excluded,
        }),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::{
        dataset::DatasetFormat,
        record::{name, Fields, GroupKey, RecordId, Source},
        store::{DirDatasetStore, DirRecordStore},
        window::MonthWindow,
    };

    use super::*;

    fn key() -> DatasetKey {
        DatasetKey::new(
            GroupKey {
                location: "biebrza".to_string(),
                sublocation: "mscichy".to_string(),
                source: Source::Meteo,
            },
            MonthWindow::new(2025, 2).unwrap(),
        )
    }

    fn put(store: &DirRecordStore, day: u32, names: &[&str], values: &[&str]) -> Entry {
        let captured_at = NaiveDate::from_ymd_opt(2025, 2, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let id = RecordId::new("biebrza", "mscichy", Source::Meteo, captured_at).unwrap();
        let fields = Fields::new(
            names.iter().map(|s| s.to_string()).collect(),
            values.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        store.put(&id, &fields).unwrap();

        Entry {
            name: name::encode(&id),
            id,
        }
    }

    #[test]
    fn should_skip_empty_group() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path().join("data"));
        let datasets = DirDatasetStore::new(dir.path().join("aggregated"), DatasetFormat::Csv);

        let outcome = merge(&key(), &[], &records, &datasets).unwrap();

        assert!(matches!(
            outcome,
            MergeOutcome::Skipped {
                reason: SkipReason::EmptyGroup,
                ..
            }
        ));
        assert!(!dir.path().join("aggregated").exists());
    }

    #[test]
    fn should_concatenate_rows_in_group_order() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path().join("data"));
        let datasets = DirDatasetStore::new(dir.path().join("aggregated"), DatasetFormat::Csv);
        let entries = vec![
            put(&records, 3, &["kod_stacji", "opad_10min"], &["353220100", "0.1"]),
            put(&records, 20, &["kod_stacji", "opad_10min"], &["353220100", "0.4"]),
        ];

        let outcome = merge(&key(), &entries, &records, &datasets).unwrap();

        let MergeOutcome::Written {
            location,
            rows,
            excluded,
        } = outcome
        else {
            panic!("expected a dataset");
        };
        assert_eq!(rows, 2);
        assert!(excluded.is_empty());
        assert_eq!(
            fs::read_to_string(location).unwrap(),
            "kod_stacji,opad_10min\n353220100,0.1\n353220100,0.4\n"
        );
    }

    #[test]
    fn should_realign_reordered_fields() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path());
        let entries = vec![
            put(&records, 3, &["a", "b"], &["1", "2"]),
            put(&records, 4, &["b", "a"], &["4", "3"]),
        ];

        let (dataset, excluded) = build_dataset(&key(), &entries, &records);
        let dataset = dataset.unwrap();

        assert!(excluded.is_empty());
        assert_eq!(dataset.header, ["a", "b"]);
        assert_eq!(dataset.rows, [["1", "2"], ["3", "4"]]);
    }

    #[test]
    fn should_exclude_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path());
        let entries = vec![
            put(&records, 3, &["a", "b"], &["1", "2"]),
            put(&records, 4, &["a", "c"], &["3", "4"]),
            put(&records, 5, &["a", "b"], &["5", "6"]),
        ];

        let (dataset, excluded) = build_dataset(&key(), &entries, &records);

        assert_eq!(dataset.unwrap().rows, [["1", "2"], ["5", "6"]]);
        assert_eq!(excluded.len(), 1);
        assert!(matches!(
            &excluded[0],
            Exclusion::SchemaMismatch { found, .. } if found == &["a", "c"]
        ));
    }

    #[test]
    fn should_take_schema_from_first_readable_record() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path());
        let readable = put(&records, 4, &["x"], &["1"]);
        let missing = Entry {
            name: "r1_biebrza_mscichy_meteo_20250202T100000.csv".to_string(),
            id: readable.id.clone(),
        };
        let entries = vec![missing, readable];

        let (dataset, excluded) = build_dataset(&key(), &entries, &records);

        assert_eq!(dataset.unwrap().header, ["x"]);
        assert!(matches!(&excluded[0], Exclusion::Unreadable { .. }));
    }

    #[test]
    fn should_skip_when_no_record_is_readable() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path().join("data"));
        let datasets = DirDatasetStore::new(dir.path().join("aggregated"), DatasetFormat::Csv);
        let entry = put(&records, 3, &["a"], &["1"]);
        fs::write(dir.path().join("data").join(&entry.name), "").unwrap();

        let outcome = merge(&key(), &[entry], &records, &datasets).unwrap();

        let MergeOutcome::Skipped { reason, excluded } = outcome else {
            panic!("expected a skip");
        };
        assert!(matches!(reason, SkipReason::NoUsableRecords));
        assert_eq!(excluded.len(), 1);
    }

    #[test]
    fn should_produce_identical_bytes_on_rerun() {
        let dir = TempDir::new().unwrap();
        let records = DirRecordStore::new(dir.path().join("data"));
        let entries = vec![
            put(&records, 3, &["a", "b"], &["1", "x,y"]),
            put(&records, 9, &["a", "b"], &["2", "\"q\""]),
        ];

        for format in [DatasetFormat::Csv, DatasetFormat::Parquet] {
            let datasets = DirDatasetStore::new(dir.path().join("aggregated"), format);

            merge(&key(), &entries, &records, &datasets).unwrap();
            let first = fs::read(datasets.path_for(&key())).unwrap();
            merge(&key(), &entries, &records, &datasets).unwrap();
            let second = fs::read(datasets.path_for(&key())).unwrap();

            assert_eq!(first, second);
        }
    }
}
