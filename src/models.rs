//! Core data structures and types for GIOŚ archive processing.
//!
//! Defines the raw spreadsheet grid, the known raw layouts, the keyed
//! station tables produced by cleaning and aggregation, and the per-call
//! cleaning report.

use crate::constants::TIMESTAMP_COLUMN;
use crate::error::{GiosError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single spreadsheet cell as delivered by a loader
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Build a cell from text, mapping blank strings to `Empty`
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as trimmed text; `None` for empty cells
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) => Some(format_number(*n)),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_label() {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "<empty>"),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Untyped grid of cells as received from an archive sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a table from string rows; blank strings become empty cells
    pub fn from_strings<R, C>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| Cell::text(c.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell at (row, column); out-of-range positions read as empty
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Known raw sheet layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatKind {
    /// A station-code header row somewhere near the top of the sheet
    SingleHeader,
    /// Leading "Nr" row, station-code row, then a units row before data
    SplitHeader,
    /// No marker; header and data rows at fixed positions
    FixedOffset { header_row: usize, data_row: usize },
}

impl FormatKind {
    /// Layout published for a given archive year
    pub fn for_year(year: i32) -> Self {
        match year {
            y if y <= 2015 => FormatKind::FixedOffset {
                header_row: 0,
                data_row: 1,
            },
            2016..=2017 => FormatKind::SplitHeader,
            _ => FormatKind::SingleHeader,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::SingleHeader => write!(f, "single-header"),
            FormatKind::SplitHeader => write!(f, "split-header"),
            FormatKind::FixedOffset {
                header_row,
                data_row,
            } => write!(f, "fixed-offset({header_row},{data_row})"),
        }
    }
}

/// Position of the header and first data row within a raw table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    pub header_row: usize,
    pub data_row: usize,
    /// Column labels; the first is always the timestamp label
    pub labels: Vec<String>,
    /// Raw column index backing each label
    pub source_columns: Vec<usize>,
}

/// A raw data row still carrying its position in the source sheet
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRow {
    pub source_row: usize,
    pub cells: Vec<Cell>,
}

impl StagedRow {
    pub fn first(&self) -> &Cell {
        self.cells.first().unwrap_or(&EMPTY_CELL)
    }
}

/// Labelled rows between header resolution and type coercion
#[derive(Debug, Clone, PartialEq)]
pub struct StagedTable {
    pub labels: Vec<String>,
    pub rows: Vec<StagedRow>,
}

/// Calendar access for table keys
pub trait CalendarKey: Ord + Copy {
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarKey for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl CalendarKey for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

/// Month bucket used by monthly aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Keyed table with one `f64` column per station
///
/// Keys are unique and strictly increasing. Values are stored column-major;
/// `None` marks a missing reading. Labels are normally unique, but a table
/// produced by [`crate::analysis::rename_columns`] may repeat labels until a
/// collision policy is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable<K> {
    index_name: String,
    keys: Vec<K>,
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

/// Hourly table produced by the cleaning pipeline
pub type CanonicalTable = SeriesTable<NaiveDateTime>;

/// Daily means keyed by calendar date
pub type DailyTable = SeriesTable<NaiveDate>;

/// Monthly means keyed by year and month
pub type MonthlyTable = SeriesTable<YearMonth>;

impl<K: Ord + Copy> SeriesTable<K> {
    /// Build a table, checking shape and key ordering
    pub fn new(
        index_name: impl Into<String>,
        keys: Vec<K>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if values.len() != columns.len() {
            return Err(GiosError::InvalidTable {
                reason: format!(
                    "{} value columns for {} labels",
                    values.len(),
                    columns.len()
                ),
            });
        }
        if let Some((i, col)) = values
            .iter()
            .enumerate()
            .find(|(_, col)| col.len() != keys.len())
        {
            return Err(GiosError::InvalidTable {
                reason: format!(
                    "column '{}' has {} values for {} keys",
                    columns[i],
                    col.len(),
                    keys.len()
                ),
            });
        }
        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(GiosError::InvalidTable {
                reason: "keys are not unique and strictly increasing".to_string(),
            });
        }
        Ok(Self::from_parts(index_name.into(), keys, columns, values))
    }

    pub(crate) fn from_parts(
        index_name: String,
        keys: Vec<K>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Self {
        Self {
            index_name,
            keys,
            columns,
            values,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.keys.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Values of the column at `index`, `None` past the last column
    pub fn column_at(&self, index: usize) -> Option<&[Option<f64>]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// Values of the first column labelled `label`
    pub fn column(&self, label: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c == label)
            .map(|i| self.values[i].as_slice())
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(column).and_then(|c| c.get(row)).copied().flatten()
    }

    pub fn station(&self, label: &str) -> Option<StationSeries<'_, K>> {
        let index = self.columns.iter().position(|c| c == label)?;
        Some(StationSeries {
            label: &self.columns[index],
            keys: &self.keys,
            values: &self.values[index],
        })
    }

    pub fn stations(&self) -> impl Iterator<Item = StationSeries<'_, K>> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(label, values)| StationSeries {
                label,
                keys: &self.keys,
                values,
            })
    }

    pub fn has_unique_columns(&self) -> bool {
        let mut seen = HashSet::new();
        self.columns.iter().all(|c| seen.insert(c.as_str()))
    }

    /// Copy of the table with every label replaced
    pub fn with_labels(&self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.columns.len() {
            return Err(GiosError::InvalidTable {
                reason: format!(
                    "{} labels supplied for {} columns",
                    labels.len(),
                    self.columns.len()
                ),
            });
        }
        Ok(Self::from_parts(
            self.index_name.clone(),
            self.keys.clone(),
            labels,
            self.values.clone(),
        ))
    }

    /// Copy of the table keeping the columns at the given positions, in order
    pub fn select_positions(&self, positions: &[usize]) -> Self {
        Self::from_parts(
            self.index_name.clone(),
            self.keys.clone(),
            positions.iter().map(|&i| self.columns[i].clone()).collect(),
            positions.iter().map(|&i| self.values[i].clone()).collect(),
        )
    }

    /// Copy of the table keeping rows whose (key, row values) satisfy `keep`
    pub fn filter_rows(&self, mut keep: impl FnMut(K, &[Option<f64>]) -> bool) -> Self {
        let mut keys = Vec::new();
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); self.columns.len()];
        for (key, row_values) in self.keys.iter().zip(self.rows()) {
            if keep(*key, &row_values) {
                keys.push(*key);
                for (col, value) in row_values.into_iter().enumerate() {
                    values[col].push(value);
                }
            }
        }
        Self::from_parts(self.index_name.clone(), keys, self.columns.clone(), values)
    }

    /// Values across all columns for one row, `None` past the last row
    pub fn row(&self, index: usize) -> Option<Vec<Option<f64>>> {
        (index < self.height()).then(|| self.values.iter().map(|c| c[index]).collect())
    }

    /// Row-wise values in key order
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<f64>>> + '_ {
        (0..self.height()).map(move |row| self.values.iter().map(|c| c[row]).collect())
    }

    pub(crate) fn into_parts(self) -> (String, Vec<K>, Vec<String>, Vec<Vec<Option<f64>>>) {
        (self.index_name, self.keys, self.columns, self.values)
    }
}

impl SeriesTable<NaiveDateTime> {
    /// Hour of the reading at `row` under the hour-ending convention
    ///
    /// Keys at 00:00 hold the previous day's final reading and report hour 24.
    pub fn reading_hour(&self, row: usize) -> Option<u32> {
        self.keys.get(row).map(|key| match key.hour() {
            0 => 24,
            h => h,
        })
    }

    /// Empty canonical table with the standard index name
    pub fn empty_canonical(columns: Vec<String>) -> Self {
        let values = vec![Vec::new(); columns.len()];
        Self::from_parts(TIMESTAMP_COLUMN.to_string(), Vec::new(), columns, values)
    }
}

/// Borrowed view of a single station column
#[derive(Debug, Clone, Copy)]
pub struct StationSeries<'a, K> {
    pub label: &'a str,
    pub keys: &'a [K],
    pub values: &'a [Option<f64>],
}

impl<'a, K: Copy> StationSeries<'a, K> {
    pub fn iter(&self) -> impl Iterator<Item = (K, Option<f64>)> + 'a {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of non-missing readings
    pub fn present(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn mean(&self) -> Option<f64> {
        mean_of(self.values.iter().copied())
    }
}

/// Mean of the non-missing values; `None` if every value is missing
pub fn mean_of(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Diagnostics collected while cleaning a single raw table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub format: Option<FormatKind>,
    pub header_row: usize,
    pub data_row: usize,
    pub raw_rows: usize,
    pub metadata_rows_dropped: usize,
    pub unparseable_timestamps: usize,
    pub unparseable_values: usize,
    pub midnight_rows_shifted: usize,
    pub empty_rows_dropped: usize,
    pub duplicates_merged: usize,
    pub rows_out: usize,
    pub columns_out: usize,
    pub empty_result: bool,
}
