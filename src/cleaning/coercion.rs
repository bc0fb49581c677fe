//! Type coercion for staged rows.
//!
//! Converts the timestamp column to `NaiveDateTime` and every station column
//! to `f64`. A malformed timestamp drops its row; a malformed value becomes
//! missing. Neither aborts the table.

use crate::constants::{DATE_FORMATS, DATETIME_FORMATS};
use crate::models::{Cell, StagedTable};
use chrono::{Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Literal "24:00" readings, recorded by some exports instead of next-day 00:00
static HOUR_24: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{2}\.\d{2}\.\d{4})[ T]24:00(?::00)?$")
        .expect("hour-24 pattern is valid")
});

/// Rows after coercion, still in source order and before the midnight shift
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRows {
    /// Station labels (the timestamp label is not included)
    pub labels: Vec<String>,
    pub timestamps: Vec<NaiveDateTime>,
    /// Row-major station values
    pub rows: Vec<Vec<Option<f64>>>,
    /// Raw-table row each kept row came from
    pub source_rows: Vec<usize>,
    pub unparseable_timestamps: usize,
    pub unparseable_values: usize,
}

/// Parse a timestamp cell; `None` for anything that is not a timestamp
pub fn parse_timestamp(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(text) => parse_timestamp_str(text.trim()),
        Cell::Empty | Cell::Number(_) => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = HOUR_24.captures(text) {
        let date = parse_date(&caps[1])?;
        return date
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parse a measurement cell, accepting a decimal comma
///
/// Only finite numbers survive; everything else reads as missing.
pub fn parse_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
        Cell::Text(text) => text
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite()),
        Cell::Empty | Cell::DateTime(_) => None,
    }
}

/// Coerce staged rows into typed timestamps and values
pub fn coerce(staged: StagedTable) -> CoercedRows {
    let station_count = staged.labels.len().saturating_sub(1);
    let mut timestamps = Vec::with_capacity(staged.rows.len());
    let mut rows = Vec::with_capacity(staged.rows.len());
    let mut source_rows = Vec::with_capacity(staged.rows.len());
    let mut unparseable_timestamps = 0;
    let mut unparseable_values = 0;

    for row in staged.rows {
        let Some(timestamp) = parse_timestamp(row.first()) else {
            debug!(
                "Dropping row {}: unparseable timestamp {}",
                row.source_row,
                row.first()
            );
            unparseable_timestamps += 1;
            continue;
        };

        let values: Vec<Option<f64>> = (1..=station_count)
            .map(|i| {
                let cell = row.cells.get(i).unwrap_or(&Cell::Empty);
                let value = parse_value(cell);
                if value.is_none() && !cell.is_empty() {
                    unparseable_values += 1;
                }
                value
            })
            .collect();

        timestamps.push(timestamp);
        rows.push(values);
        source_rows.push(row.source_row);
    }

    if unparseable_values > 0 {
        debug!("{} cells could not be read as numbers", unparseable_values);
    }

    CoercedRows {
        labels: staged.labels.into_iter().skip(1).collect(),
        timestamps,
        rows,
        source_rows,
        unparseable_timestamps,
        unparseable_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StagedRow;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = at(2021, 1, 1, 1);
        for text in [
            "2021-01-01 01:00:00",
            "2021-01-01 01:00",
            "2021-01-01T01:00:00",
            "01.01.2021 01:00",
            "2021/01/01 01:00",
            "  2021-01-01 01:00  ",
        ] {
            assert_eq!(parse_timestamp(&Cell::text(text)), Some(expected), "{text}");
        }
        assert_eq!(
            parse_timestamp(&Cell::text("2021-03-05")),
            Some(at(2021, 3, 5, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_hour_24() {
        assert_eq!(
            parse_timestamp(&Cell::text("2021-12-31 24:00")),
            Some(at(2022, 1, 1, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_non_timestamps() {
        assert_eq!(parse_timestamp(&Cell::text("Jednostka")), None);
        assert_eq!(parse_timestamp(&Cell::Number(44197.0)), None);
        assert_eq!(parse_timestamp(&Cell::Empty), None);
        assert_eq!(parse_timestamp(&Cell::text("2021-13-01 01:00")), None);
    }

    #[test]
    fn test_parse_value_decimal_comma() {
        assert_eq!(parse_value(&Cell::text("5,0")), Some(5.0));
        assert_eq!(parse_value(&Cell::text(" 12.75 ")), Some(12.75));
        assert_eq!(parse_value(&Cell::Number(3.5)), Some(3.5));
    }

    #[test]
    fn test_parse_value_tokens_become_missing() {
        assert_eq!(parse_value(&Cell::text("ug/m3")), None);
        assert_eq!(parse_value(&Cell::text("NaN")), None);
        assert_eq!(parse_value(&Cell::text("inf")), None);
        assert_eq!(parse_value(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_value(&Cell::Empty), None);
    }

    #[test]
    fn test_coerce_counts_local_failures() {
        let staged = StagedTable {
            labels: vec!["Data".into(), "S1".into(), "S2".into()],
            rows: vec![
                StagedRow {
                    source_row: 3,
                    cells: vec![Cell::text("2021-01-01 01:00"), Cell::text("5,0"), Cell::text("x")],
                },
                StagedRow {
                    source_row: 4,
                    cells: vec![Cell::text("not a date"), Cell::text("1,0"), Cell::text("2,0")],
                },
                StagedRow {
                    source_row: 5,
                    cells: vec![Cell::text("2021-01-01 02:00"), Cell::Empty],
                },
            ],
        };

        let coerced = coerce(staged);
        assert_eq!(coerced.labels, vec!["S1", "S2"]);
        assert_eq!(coerced.timestamps, vec![at(2021, 1, 1, 1), at(2021, 1, 1, 2)]);
        assert_eq!(coerced.rows, vec![vec![Some(5.0), None], vec![None, None]]);
        assert_eq!(coerced.source_rows, vec![3, 5]);
        assert_eq!(coerced.unparseable_timestamps, 1);
        assert_eq!(coerced.unparseable_values, 1);
    }
}
