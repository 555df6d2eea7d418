//! Fetches station payloads from the public IMGW API.

use anyhow::{Error, Result};
use serde_json::{Map, Value};

use crate::record::Source;

pub type StationPayload = Map<String, Value>;

/// Endpoint URL for a source under `base_url`.
pub fn source_url(base_url: &str, source: Source) -> String {
    format!("{}/{}/", base_url.trim_end_matches('/'), source.endpoint())
}

/// Downloads the array of current readings for every station of one source.
pub async fn fetch_stations(url: &str) -> Result<Vec<StationPayload>, Error> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::msg(format!("Failed to fetch {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(Error::msg(format!(
            "Failed to fetch {}: {}",
            url,
            response.status()
        )));
    }

    let stations = response.json::<Vec<StationPayload>>().await?;

    Ok(stations)
}

/// Finds the payload for `station`. Identifiers may arrive as strings or numbers.
pub fn find_station<'a>(
    payload: &'a [StationPayload],
    source: Source,
    station: &str,
) -> Option<&'a StationPayload> {
    payload.iter().find(|entry| match entry.get(source.station_field()) {
        Some(Value::String(id)) => id == station,
        Some(Value::Number(id)) => id.to_string() == station,
        _ => false,
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Vec<StationPayload> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn should_build_source_urls() {
        assert_eq!(
            source_url("https://danepubliczne.imgw.pl/api/data", Source::HydroSecondary),
            "https://danepubliczne.imgw.pl/api/data/hydro2/"
        );
        assert_eq!(
            source_url("http://localhost/api/", Source::Meteo),
            "http://localhost/api/meteo/"
        );
    }

    #[test]
    fn should_find_station_by_source_field() {
        let stations = payload(json!([
            { "id_stacji": "150160180", "stan_wody": "230" },
            { "id_stacji": "153140010", "stan_wody": "512" }
        ]));

        let found = find_station(&stations, Source::HydroPrimary, "153140010").unwrap();
        assert_eq!(found["stan_wody"], "512");
        assert!(find_station(&stations, Source::Meteo, "153140010").is_none());
        assert!(find_station(&stations, Source::HydroPrimary, "000").is_none());
    }

    #[test]
    fn should_match_numeric_station_ids() {
        let stations = payload(json!([{ "kod_stacji": 353220100, "opad_10min": 0.2 }]));

        assert!(find_station(&stations, Source::Meteo, "353220100").is_some());
    }

    #[tokio::test]
    async fn should_fail_on_unreachable_endpoint() {
        let result = fetch_stations("http://127.0.0.1:9/hydro/").await;

        assert!(result.is_err());
    }
}
