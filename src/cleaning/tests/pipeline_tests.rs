//! End-to-end tests of the cleaning pipeline on each archive layout

use super::*;
use crate::cleaning::{Cleaner, clean};
use crate::config::{CleaningConfig, ColumnCollision, DuplicatePolicy};
use crate::error::GiosError;
use crate::models::{FormatKind, RawTable};

/// Test the reference scenario with a units row and a midnight reading
///
/// Purpose: Validate header skipping, decimal commas and the midnight shift together
/// Benefit: Pins down the exact shape daily aggregation relies on
#[test]
fn test_reference_scenario() {
    let table = clean(&scenario_sheet()).unwrap();

    assert_eq!(table.index_name(), "Data");
    assert_eq!(table.columns(), &["S1", "S2"]);
    assert_eq!(table.keys(), &[at(2020, 12, 31, 0), at(2021, 1, 1, 1)]);
    assert_eq!(table.column("S1").unwrap(), &[Some(7.0), Some(5.0)]);
    assert_eq!(table.column("S2").unwrap(), &[Some(1.0), Some(3.0)]);
}

#[test]
fn test_legacy_fixed_offset_sheet() {
    let cleaner = Cleaner::default();
    let raw = legacy_2014_sheet();

    assert_eq!(
        cleaner.detect(&raw).unwrap(),
        FormatKind::FixedOffset {
            header_row: 0,
            data_row: 1
        }
    );

    let (table, report) = cleaner.clean_with_report(&raw).unwrap();
    assert_eq!(table.columns(), &["DsWrocKorzPM25", "MpKrakAlKras"]);
    assert_eq!(table.height(), 5);
    assert_eq!(table.keys()[0], at(2014, 1, 1, 0));
    assert_eq!(table.column("DsWrocKorzPM25").unwrap()[0], Some(11.0));
    assert_eq!(table.column("MpKrakAlKras").unwrap()[4], None);
    assert_eq!(report.midnight_rows_shifted, 1);
    assert_eq!(report.unparseable_values, 1);
}

#[test]
fn test_split_header_sheet() {
    let (table, report) = Cleaner::default()
        .clean_with_report(&split_2016_sheet())
        .unwrap();

    assert_eq!(report.format, Some(FormatKind::SplitHeader));
    assert_eq!((report.header_row, report.data_row), (1, 3));
    assert_eq!(report.metadata_rows_dropped, 3);
    assert_eq!(table.columns(), &["DsWrocKorz", "MpKrakAlKras"]);
    assert_eq!(
        table.keys(),
        &[at(2016, 1, 1, 0), at(2016, 1, 1, 1), at(2016, 1, 1, 2)]
    );
}

#[test]
fn test_single_header_sheet_strips_suffixes() {
    let cleaner = Cleaner::default();
    let raw = single_2019_sheet();

    let detected = cleaner.clean(&raw).unwrap();
    let forced = cleaner.clean_as(&raw, FormatKind::SingleHeader).unwrap();

    assert_eq!(detected, forced);
    assert_eq!(
        forced.columns(),
        &["DsWrocWybCon", "MpKrakBulwar", "SlKatoKossut"]
    );
    assert_eq!(forced.height(), 3);
    assert_eq!(forced.column("SlKatoKossut").unwrap(), &[None, Some(30.0), Some(32.0)]);
}

#[test]
fn test_year_hint_matches_detection() {
    let cleaner = Cleaner::default();
    let by_year = cleaner
        .clean_as(&legacy_2014_sheet(), FormatKind::for_year(2014))
        .unwrap();
    assert_eq!(by_year, cleaner.clean(&legacy_2014_sheet()).unwrap());

    let by_year = cleaner
        .clean_as(&split_2016_sheet(), FormatKind::for_year(2016))
        .unwrap();
    assert_eq!(by_year.height(), 3);
}

#[test]
fn test_wrong_year_hint_surfaces_header_error() {
    let result = Cleaner::default().clean_as(&legacy_2014_sheet(), FormatKind::SingleHeader);
    assert!(matches!(result, Err(GiosError::HeaderNotFound { .. })));
}

#[test]
fn test_unrecognized_sheet_is_rejected() {
    let raw = RawTable::from_strings([vec!["Raport", "roczny"], vec!["brak danych", ""]]);
    assert!(matches!(
        clean(&raw),
        Err(GiosError::UnrecognizedFormat { .. })
    ));
}

#[test]
fn test_empty_result_warns_or_fails() {
    let raw = RawTable::from_strings([vec!["Kod stacji", "S1"], vec!["Jednostka", "ug/m3"]]);

    let (table, report) = Cleaner::default().clean_with_report(&raw).unwrap();
    assert!(table.is_empty());
    assert!(report.empty_result);
    assert_eq!(table.columns(), &["S1"]);

    let strict = Cleaner::new(CleaningConfig {
        fail_on_empty: true,
        ..Default::default()
    })
    .unwrap();
    assert!(matches!(
        strict.clean(&raw),
        Err(GiosError::EmptyResult { .. })
    ));
}

/// Test that "24:00" and next-day "00:00" for the same reading collide
///
/// Purpose: Validate that duplicate keys are never silently overwritten
/// Benefit: Catches exports that repeat the end-of-day reading in both spellings
#[test]
fn test_duplicate_timestamps_follow_policy() {
    let raw = RawTable::from_strings([
        vec!["Kod stacji", "S1"],
        vec!["2021-01-01 23:00", "2,0"],
        vec!["2021-01-01 24:00", "4,0"],
        vec!["2021-01-02 00:00", "6,0"],
    ]);

    match clean(&raw) {
        Err(GiosError::DuplicateTimestamp {
            timestamp,
            count,
            source_rows,
        }) => {
            assert_eq!(timestamp, at(2021, 1, 1, 0));
            assert_eq!(count, 2);
            // Both spellings of the end-of-day reading are named
            assert_eq!(source_rows, vec![2, 3]);
        }
        other => panic!("Expected DuplicateTimestamp, got {:?}", other),
    }

    let averaging = Cleaner::new(CleaningConfig {
        duplicate_policy: DuplicatePolicy::Mean,
        ..Default::default()
    })
    .unwrap();
    let (table, report) = averaging.clean_with_report(&raw).unwrap();
    assert_eq!(table.keys(), &[at(2021, 1, 1, 0), at(2021, 1, 1, 23)]);
    assert_eq!(table.column("S1").unwrap(), &[Some(5.0), Some(2.0)]);
    assert_eq!(report.duplicates_merged, 1);
}

#[test]
fn test_label_collision_follows_policy() {
    let raw = RawTable::from_strings([
        vec!["Kod stacji", "S1", "S1-PM2.5-1g"],
        vec!["2021-01-01 01:00", "2,0", "4,0"],
    ]);

    assert!(matches!(
        clean(&raw),
        Err(GiosError::DuplicateColumn { .. })
    ));

    let merging = Cleaner::new(CleaningConfig {
        column_collision: ColumnCollision::Mean,
        ..Default::default()
    })
    .unwrap();
    let table = merging.clean(&raw).unwrap();
    assert_eq!(table.columns(), &["S1"]);
    assert_eq!(table.column("S1").unwrap(), &[Some(3.0)]);
}

#[test]
fn test_invalid_config_rejected() {
    let config = CleaningConfig {
        marker_scan_rows: 0,
        ..Default::default()
    };
    assert!(matches!(
        Cleaner::new(config),
        Err(GiosError::Configuration { .. })
    ));
}
