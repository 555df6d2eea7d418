//! Runs a month's aggregation across every configured location.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    path::PathBuf,
};

use anyhow::Result;
use chrono::NaiveDateTime;
use indicatif::ProgressBar;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::{
    classify::classify,
    config::{ConfigError, LocationsConfig},
    dataset::DatasetKey,
    merge::{merge, MergeOutcome},
    record::{GroupKey, Source},
    store::{DatasetStore, RecordStore, StoreError},
    window::MonthWindow,
};

/// Told about each pair that has at least one new dataset.
pub trait Visualizer {
    fn dataset_ready(&self, location: &str, sublocation: &str, window: &MonthWindow);
}

/// Told once per run about every dataset produced.
pub trait Notifier {
    fn deliver(&self, window: &MonthWindow, datasets: &[String]) -> Result<()>;
}

pub struct LogVisualizer;

impl Visualizer for LogVisualizer {
    fn dataset_ready(&self, location: &str, sublocation: &str, window: &MonthWindow) {
        info!("Charts due for {}/{} {}", location, sublocation, window);
    }
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, window: &MonthWindow, datasets: &[String]) -> Result<()> {
        info!("{} datasets produced for {}", datasets.len(), window);
        for dataset in datasets {
            info!("  {}", dataset);
        }
        Ok(())
    }
}

/// Writes the run's datasets to a JSON manifest for downstream delivery.
pub struct ManifestNotifier {
    pub path: PathBuf,
}

#[derive(Serialize)]
struct Manifest<'a> {
    year: i32,
    month: u32,
    datasets: &'a [String],
}

impl Notifier for ManifestNotifier {
    fn deliver(&self, window: &MonthWindow, datasets: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let manifest = Manifest {
            year: window.year(),
            month: window.month(),
            datasets,
        };
        serde_json::to_writer_pretty(File::create(&self.path)?, &manifest)?;
        info!("Manifest written to {:?}", self.path);

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairReport {
    pub location: String,
    pub sublocation: String,
    /// Sources that produced a dataset.
    pub produced: BTreeSet<Source>,
    /// Configured sources with nothing to merge.
    pub missing: Vec<Source>,
    /// Sources whose dataset could not be written.
    pub failed: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub window: MonthWindow,
    pub pairs: Vec<PairReport>,
    pub datasets: Vec<String>,
}

pub struct Pipeline<'a> {
    pub records: &'a dyn RecordStore,
    pub datasets: &'a dyn DatasetStore,
    pub visualizer: &'a dyn Visualizer,
    pub notifier: &'a dyn Notifier,
}

impl Pipeline<'_> {
    /// Aggregates the month before `reference` for every configured pair.
    ///
    /// Only invalid configuration or an unlistable record store stop a run;
    /// record and dataset problems are logged and skipped.
    pub fn run(
        &self,
        config: &LocationsConfig,
        reference: NaiveDateTime,
        progress: &ProgressBar,
    ) -> Result<RunReport, PipelineError> {
        config.validate()?;

        let window = MonthWindow::preceding(reference);
        match window.bounds() {
            Some((start, end)) => info!("Aggregating records from {} to {}", start, end),
            None => info!("Aggregating records for {}", window),
        }

        let names = self.records.list()?;
        let mut classification = classify(&names, &window);
        info!(
            "{} entries listed: {} in window, {} outside, {} unrecognised",
            names.len(),
            classification.in_window(),
            classification.out_of_window,
            classification.unrecognised.len()
        );

        let mut pairs = Vec::new();
        let mut datasets = Vec::new();

        for (location, sublocation) in config.pairs() {
            let mut pair = PairReport {
                location: location.name.clone(),
                sublocation: sublocation.name.clone(),
                ..PairReport::default()
            };

            for source in sublocation.sources() {
                let group = GroupKey {
                    location: location.name.clone(),
                    sublocation: sublocation.name.clone(),
                    source,
                };
                let entries = classification.groups.remove(&group).unwrap_or_default();
                let key = DatasetKey::new(group, window);

                match merge(&key, &entries, self.records, self.datasets) {
                    Ok(MergeOutcome::Written {
                        location: written_to,
                        rows,
                        ..
                    }) => {
                        info!("Wrote {} rows for {} to {}", rows, key, written_to);
                        pair.produced.insert(source);
                        datasets.push(written_to);
                    }
                    Ok(MergeOutcome::Skipped { reason, .. }) => {
                        info!("No dataset for {}: {}", key, reason);
                        pair.missing.push(source);
                    }
                    Err(e) => {
                        warn!("Failed to store dataset for {}: {}", key, e);
                        pair.failed.push(source);
                    }
                }
            }

            if !pair.produced.is_empty() {
                self.visualizer
                    .dataset_ready(&pair.location, &pair.sublocation, &window);
            }

            pairs.push(pair);
            progress.inc(1);
        }

        for (group, entries) in &classification.groups {
            info!(
                "Ignoring {} records for unconfigured series {}",
                entries.len(),
                group
            );
        }

        if let Err(e) = self.notifier.deliver(&window, &datasets) {
            warn!("Failed to deliver notification: {:#}", e);
        }

        Ok(RunReport {
            window,
            pairs,
            datasets,
        })
    }
}

// -- Tests -------------------------------------------------------------------
