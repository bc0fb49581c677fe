//! Invariants that every cleaned table must satisfy, checked on all layouts

use super::*;
use crate::cleaning::{Cleaner, normalize_column_names};
use crate::constants::{MEASUREMENT_SUFFIXES, METADATA_ROW_TOKENS};
use crate::models::CanonicalTable;
use chrono::Timelike;

fn all_fixtures() -> Vec<(&'static str, RawTable)> {
    vec![
        ("legacy_2014", legacy_2014_sheet()),
        ("split_2016", split_2016_sheet()),
        ("single_2019", single_2019_sheet()),
        ("scenario", scenario_sheet()),
    ]
}

fn cleaned() -> Vec<(&'static str, CanonicalTable)> {
    let cleaner = Cleaner::default();
    all_fixtures()
        .into_iter()
        .map(|(name, raw)| (name, cleaner.clean(&raw).unwrap()))
        .collect()
}

#[test]
fn test_keys_unique_and_strictly_increasing() {
    for (name, table) in cleaned() {
        assert_eq!(table.index_name(), "Data", "{name}");
        assert!(
            table.keys().windows(2).all(|w| w[0] < w[1]),
            "{name}: keys not strictly increasing"
        );
    }
}

#[test]
fn test_no_reading_hour_zero() {
    for (name, table) in cleaned() {
        for row in 0..table.height() {
            assert_ne!(table.reading_hour(row), Some(0), "{name} row {row}");
            if table.keys()[row].hour() == 0 {
                assert_eq!(table.reading_hour(row), Some(24), "{name} row {row}");
            }
        }
    }
}

#[test]
fn test_no_metadata_labels_survive() {
    for (name, table) in cleaned() {
        for label in table.columns() {
            assert!(
                !METADATA_ROW_TOKENS.contains(&label.as_str()),
                "{name}: metadata label {label} kept as a station"
            );
        }
    }
}

#[test]
fn test_tables_have_stations_and_no_empty_rows() {
    for (name, table) in cleaned() {
        assert!(table.width() > 0, "{name}");
        assert!(table.height() > 0, "{name}");
        for (row, values) in table.rows().enumerate() {
            assert!(
                values.iter().any(Option::is_some),
                "{name}: row {row} is entirely missing"
            );
        }
    }
}

#[test]
fn test_values_are_finite() {
    for (name, table) in cleaned() {
        for station in table.stations() {
            assert!(
                station.values.iter().flatten().all(|v| v.is_finite()),
                "{name}: non-finite value in {}",
                station.label
            );
        }
    }
}

#[test]
fn test_column_normalization_idempotent_on_cleaned_tables() {
    for (name, table) in cleaned() {
        let again = normalize_column_names(&table, MEASUREMENT_SUFFIXES);
        assert_eq!(again, table, "{name}");
        assert!(table.has_unique_columns(), "{name}");
    }
}
