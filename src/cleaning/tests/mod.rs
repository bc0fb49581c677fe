//! Test fixtures for the cleaning pipeline
//!
//! Small raw sheets mirroring each archive layout, shared by the pipeline
//! and property tests.

use crate::models::RawTable;
use chrono::{NaiveDate, NaiveDateTime};

mod pipeline_tests;
mod property_tests;

/// Build a timestamp from date and hour
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// 2014-style sheet: station codes in the first row, no marker
pub fn legacy_2014_sheet() -> RawTable {
    RawTable::from_strings([
        vec!["", "DsWrocKorzPM25", "MpKrakAlKras"],
        vec!["2014-01-01 01:00:00", "20,5", "44,1"],
        vec!["2014-01-01 02:00:00", "18,0", ""],
        vec!["2014-01-01 23:00:00", "12,0", "30,0"],
        vec!["2014-01-02 00:00:00", "11,0", "29,0"],
        vec!["2014-01-02 01:00:00", "10,0", "brak"],
    ])
}

/// 2016-style sheet: "Nr" row, station codes, then metadata rows
pub fn split_2016_sheet() -> RawTable {
    RawTable::from_strings([
        vec!["Nr", "1", "2"],
        vec!["Kod stacji", "DsWrocKorz", "MpKrakAlKras"],
        vec!["Wskaźnik", "PM2.5", "PM2.5"],
        vec!["Czas uśredniania", "1g", "1g"],
        vec!["Jednostka", "ug/m3", "ug/m3"],
        vec!["Kod stanowiska", "DsWrocKorz-PM2.5-1g", "MpKrakAlKras-PM2.5-1g"],
        vec!["2016-01-01 01:00:00", "33,2", "51,0"],
        vec!["2016-01-01 02:00:00", "30,1", "49,5"],
        vec!["2016-01-02 00:00:00", "25,0", "40,0"],
    ])
}

/// 2019-style sheet: preamble, "Kod stacji" header with suffixed codes
pub fn single_2019_sheet() -> RawTable {
    RawTable::from_strings([
        vec!["Nr", "1", "2", "3"],
        vec![
            "Kod stacji",
            "DsWrocWybCon-PM2.5-1g",
            "MpKrakBulwar-PM2.5-1g",
            " SlKatoKossut-PM2.5-1g",
        ],
        vec!["Wskaźnik", "PM2.5", "PM2.5", "PM2.5"],
        vec!["Czas uśredniania", "1g", "1g", "1g"],
        vec!["Jednostka", "ug/m3", "ug/m3", "ug/m3"],
        vec!["Czas pomiaru", "", "", ""],
        vec!["2019-01-01 01:00:00", "10,0", "20,0", "30,0"],
        vec!["2019-01-01 02:00:00", "12,0", "", "32,0"],
        vec!["", "", "", ""],
        vec!["2019-01-02 00:00:00", "8,0", "16,0", "x"],
    ])
}

/// The reference scenario: two readings, one at midnight
pub fn scenario_sheet() -> RawTable {
    RawTable::from_strings([
        vec!["Nr", "1", "2"],
        vec!["Kod stacji", "S1", "S2"],
        vec!["Jednostka", "ug/m3", "ug/m3"],
        vec!["2021-01-01 01:00", "5,0", "3,0"],
        vec!["2021-01-01 00:00", "7,0", "1,0"],
    ])
}
