//! Test fixtures for the analysis utilities

use crate::models::{CanonicalTable, SeriesTable};
use crate::stations::{StationDirectory, StationRecord};
use chrono::{NaiveDate, NaiveDateTime};

mod aggregate_tests;

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Build a canonical table from (key, row values) pairs
pub fn hourly(columns: &[&str], rows: Vec<(NaiveDateTime, Vec<Option<f64>>)>) -> CanonicalTable {
    let keys = rows.iter().map(|(k, _)| *k).collect();
    let values = (0..columns.len())
        .map(|col| rows.iter().map(|(_, r)| r[col]).collect())
        .collect();
    SeriesTable::new(
        "Data",
        keys,
        columns.iter().map(|c| c.to_string()).collect(),
        values,
    )
    .unwrap()
}

/// Two Kraków stations and one Wrocław station
pub fn directory() -> StationDirectory {
    let record = |code: &str, region: &str, city: &str| StationRecord {
        current_code: code.to_string(),
        legacy_codes: Vec::new(),
        region: Some(region.to_string()),
        city: Some(city.to_string()),
    };
    StationDirectory::from_records(vec![
        record("KR1", "MAŁOPOLSKIE", "Kraków"),
        record("KR2", "MAŁOPOLSKIE", "Kraków"),
        record("WR1", "DOLNOŚLĄSKIE", "Wrocław"),
    ])
}
