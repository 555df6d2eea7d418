//! Polls the IMGW API once and stores a record per configured station.

use std::{collections::HashMap, path::PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use log::{info, warn};

use crate::{
    cli::{create_spinner, PollArgs},
    config::LocationsConfig,
    download::{fetch_stations, find_station, source_url, StationPayload},
    record::{Fields, RecordId, Source},
    store::DirRecordStore,
};

use super::load_config;

pub async fn poll(args: &PollArgs) -> Result<Vec<PathBuf>> {
    let config = load_config(args.config.as_ref())?;
    let store = DirRecordStore::new(&args.records);
    let captured_at = Local::now().naive_local();

    info!("Saving records to {:?}", store.root());

    let bar = create_spinner("Polling IMGW endpoints...".to_string());
    let payloads = fetch_payloads(&config).await;
    bar.finish_with_message("IMGW endpoints polled");

    Ok(store_records(&config, &payloads, &store, captured_at))
}

// Each endpoint serves every station of its source, so it is fetched once.
async fn fetch_payloads(config: &LocationsConfig) -> HashMap<Source, Vec<StationPayload>> {
    let sources: Vec<Source> = config.sources_in_use().into_iter().collect();

    let tasks = sources.iter().map(|&source| {
        let url = source_url(&config.api.base_url, source);
        async move { (source, fetch_stations(&url).await) }
    });

    let mut payloads = HashMap::new();
    for (source, result) in join_all(tasks).await {
        match result {
            Ok(stations) => {
                info!("Fetched {} {} stations", stations.len(), source);
                payloads.insert(source, stations);
            }
            Err(e) => warn!("Skipping {} stations: {:#}", source, e),
        }
    }

    payloads
}

fn store_records(
    config: &LocationsConfig,
    payloads: &HashMap<Source, Vec<StationPayload>>,
    store: &DirRecordStore,
    captured_at: NaiveDateTime,
) -> Vec<PathBuf> {
    let mut written = Vec::new();

    for (location, sublocation) in config.pairs() {
        for station in &sublocation.stations {
            let Some(payload) = payloads.get(&station.source) else {
                continue;
            };
            let Some(entry) = find_station(payload, station.source, &station.station) else {
                warn!(
                    "No {} data for station {} ({}/{})",
                    station.source, station.station, location.name, sublocation.name
                );
                continue;
            };

            let stored = RecordId::new(&location.name, &sublocation.name, station.source, captured_at)
                .map_err(anyhow::Error::from)
                .and_then(|id| {
                    store
                        .put(&id, &Fields::from_json(entry))
                        .map_err(anyhow::Error::from)
                });

            match stored {
                Ok(path) => {
                    info!("Data saved to {:?}", path);
                    written.push(path);
                }
                Err(e) => warn!(
                    "Failed to save station {} ({}/{}): {:#}",
                    station.station, location.name, sublocation.name, e
                ),
            }
        }
    }

    written
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::store::RecordStore;

    use super::*;

    const CONFIG: &str = r#"
        [[locations]]
        name = "biebrza"

        [[locations.sublocations]]
        name = "mscichy"
        stations = [
            { source = "hydro-primary", station = "153220080" },
            { source = "meteo", station = "353220100" },
            { source = "hydro-secondary", station = "153220081" },
        ]
    "#;

    fn payloads() -> HashMap<Source, Vec<StationPayload>> {
        let hydro = json!([
            { "id_stacji": "153220080", "stacja": "Mścichy", "stan_wody": "512", "temperatura_wody": null },
            { "id_stacji": "150160180", "stacja": "Krzyżanowice", "stan_wody": "230", "temperatura_wody": null }
        ]);
        let meteo = json!([{ "kod_stacji": "353230200", "opad_10min": 0.0 }]);

        HashMap::from([
            (Source::HydroPrimary, serde_json::from_value(hydro).unwrap()),
            (Source::Meteo, serde_json::from_value(meteo).unwrap()),
        ])
    }

    #[test]
    fn should_store_found_stations_only() {
        let dir = TempDir::new().unwrap();
        let store = DirRecordStore::new(dir.path());
        let config = LocationsConfig::from_toml(CONFIG).unwrap();
        let captured_at = NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let written = store_records(&config, &payloads(), &store, captured_at);

        assert_eq!(written.len(), 1);
        let name = "r1_biebrza_mscichy_hydro-primary_20250203T100000.csv";
        assert_eq!(written[0].file_name().unwrap(), name);

        let fields = store.read(name).unwrap();
        assert_eq!(
            fields.names(),
            ["id_stacji", "stacja", "stan_wody", "temperatura_wody"]
        );
        assert_eq!(fields.values(), ["153220080", "Mścichy", "512", ""]);
    }
}
