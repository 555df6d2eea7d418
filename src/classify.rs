//! Sorts a record store listing into per-series groups for one month.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
    record::{name, GroupKey, NameError, RecordId},
    window::MonthWindow,
};

#[derive(Debug, Clone, PartialEq)]
/// A listed record whose name decoded successfully.
pub struct Entry {
    pub name: String,
    pub id: RecordId,
}

#[derive(Debug, Default)]
pub struct Classification {
    /// In-window records per series, ordered by capture time then name.
    pub groups: BTreeMap<GroupKey, Vec<Entry>>,
    /// Names that are not records, with the reason.
    pub unrecognised: Vec<(String, NameError)>,
    /// Records captured outside the window.
    pub out_of_window: usize,
}

impl Classification {
    pub fn in_window(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Decodes every listed name once and buckets the in-window records.
///
/// Nothing is read from the records themselves at this stage.
pub fn classify<I, S>(names: I, window: &MonthWindow) -> Classification
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classification = Classification::default();

    for name in names {
        let name = name.as_ref();

        let id = match name::decode(name) {
            Ok(id) => id,
            Err(e) => {
                info!("Skipping '{}': {}", name, e);
                classification.unrecognised.push((name.to_string(), e));
                continue;
            }
        };

        if !window.contains(id.captured_at()) {
            debug!("Skipping '{}': outside {}", name, window);
            classification.out_of_window += 1;
            continue;
        }

        classification
            .groups
            .entry(id.group_key())
            .or_default()
            .push(Entry {
                name: name.to_string(),
                id,
            });
    }

    // Store listings come back in arbitrary order.
    for entries in classification.groups.values_mut() {
        entries.sort_by(|a, b| {
            a.id.captured_at()
                .cmp(&b.id.captured_at())
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    classification
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::record::Source;

    use super::*;

    fn key(location: &str, sublocation: &str, source: Source) -> GroupKey {
        GroupKey {
            location: location.to_string(),
            sublocation: sublocation.to_string(),
            source,
        }
    }

    fn february() -> MonthWindow {
        MonthWindow::new(2025, 2).unwrap()
    }

    #[test]
    fn should_group_in_window_records() {
        let names = [
            "r1_biebrza_mscichy_meteo_20250203T100000.csv",
            "r1_biebrza_mscichy_meteo_20250220T100000.csv",
            "r1_biebrza_mscichy_meteo_20250131T230000.csv",
            "r1_biebrza_mscichy_hydro-primary_20250210T060000.csv",
            "r1_narew_suraz_meteo_20250301T000000.csv",
        ];

        let c = classify(names, &february());

        assert_eq!(c.groups.len(), 2);
        assert_eq!(c.out_of_window, 2);
        assert!(c.unrecognised.is_empty());
        assert_eq!(c.in_window(), 3);

        let meteo = &c.groups[&key("biebrza", "mscichy", Source::Meteo)];
        assert_eq!(meteo.len(), 2);
        assert_eq!(meteo[0].name, "r1_biebrza_mscichy_meteo_20250203T100000.csv");
        assert_eq!(meteo[1].name, "r1_biebrza_mscichy_meteo_20250220T100000.csv");
    }

    #[test]
    fn should_skip_unrecognised_names() {
        let names = vec![
            "notes.txt".to_string(),
            "stacja_153140010_2025-02-03_10-00-00.csv".to_string(),
            "r1_biebrza_mscichy_meteo_20250203T100000.csv".to_string(),
        ];

        let c = classify(&names, &february());

        assert_eq!(c.unrecognised.len(), 2);
        assert_eq!(c.unrecognised[0].0, "notes.txt");
        assert_eq!(c.in_window(), 1);
    }

    #[test]
    fn should_order_by_capture_time_regardless_of_listing() {
        let names = [
            "r1_biebrza_mscichy_meteo_20250220T100000.csv",
            "r1_biebrza_mscichy_meteo_20250201T000000.csv",
            "r1_biebrza_mscichy_meteo_20250210T100000.csv",
        ];

        let c = classify(names, &february());
        let ordered: Vec<&str> = c.groups[&key("biebrza", "mscichy", Source::Meteo)]
            .iter()
            .map(|e| e.name.as_str())
            .collect();

        assert_eq!(
            ordered,
            [
                "r1_biebrza_mscichy_meteo_20250201T000000.csv",
                "r1_biebrza_mscichy_meteo_20250210T100000.csv",
                "r1_biebrza_mscichy_meteo_20250220T100000.csv",
            ]
        );
    }

    #[test]
    fn should_return_nothing_for_empty_listing() {
        let c = classify(Vec::<String>::new(), &february());

        assert!(c.groups.is_empty());
        assert_eq!(c.out_of_window, 0);
    }
}
