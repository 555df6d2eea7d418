use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use crate::{
    cli::{create_progress_bar, AggregateArgs},
    pipeline::{LogNotifier, LogVisualizer, ManifestNotifier, Notifier, Pipeline, RunReport},
    store::{DirDatasetStore, DirRecordStore},
};

use super::load_config;

pub fn aggregate(args: &AggregateArgs) -> Result<RunReport> {
    let config = load_config(args.config.as_ref())?;
    let reference = args.now.unwrap_or_else(|| Local::now().naive_local());

    let records = DirRecordStore::new(&args.records);
    let datasets = DirDatasetStore::new(&args.output, args.format);
    let notifier: Box<dyn Notifier> = match &args.manifest {
        Some(path) => Box::new(ManifestNotifier { path: path.clone() }),
        None => Box::new(LogNotifier),
    };

    let pipeline = Pipeline {
        records: &records,
        datasets: &datasets,
        visualizer: &LogVisualizer,
        notifier: notifier.as_ref(),
    };

    info!("Writing datasets to {:?}", datasets.root());

    let pairs = config.pairs().count() as u64;
    let pb = create_progress_bar(pairs, "Aggregating locations...".to_string());
    let report = pipeline
        .run(&config, reference, &pb)
        .with_context(|| format!("Aggregation of '{}' failed", args.records.display()))?;
    pb.finish_with_message("Locations aggregated");

    Ok(report)
}

// -- Tests -------------------------------------------------------------------
