//! Error handling for GIOŚ archive cleaning.
//!
//! Structural problems (unknown layout, missing header, colliding keys) abort
//! the cleaning of a single table and surface here. Row- and cell-local
//! problems never become errors; they are counted in the cleaning report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GiosError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized raw table format, inspected cells: {inspected:?}")]
    UnrecognizedFormat { inspected: Vec<String> },

    #[error("Header not found for {format} layout: {reason}")]
    HeaderNotFound { format: String, reason: String },

    #[error(
        "Duplicate timestamp {timestamp} appears {count} times after midnight shift{}",
        describe_rows(.source_rows)
    )]
    DuplicateTimestamp {
        timestamp: chrono::NaiveDateTime,
        count: usize,
        /// Zero-based raw-table rows of the colliding readings; empty when the
        /// collision is between joined tables
        source_rows: Vec<usize>,
    },

    #[error("Duplicate station column '{label}'")]
    DuplicateColumn { label: String },

    #[error("No data rows survived cleaning of {format} table")]
    EmptyResult { format: String },

    #[error("Invalid table: {reason}")]
    InvalidTable { reason: String },

    #[error("Required column '{column}' missing from station metadata")]
    MissingColumn { column: String },

    #[error("Unsupported source file: {path}")]
    UnsupportedSource { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, GiosError>;

/// Spreadsheet row numbers (one-based) for error messages
fn describe_rows(rows: &[usize]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let numbers: Vec<String> = rows.iter().map(|row| (row + 1).to_string()).collect();
    format!(" (sheet rows {})", numbers.join(", "))
}
