//! Raw layout detection.
//!
//! Inspects a small fixed set of cells against the known markers. A sheet
//! that matches none of them is rejected rather than guessed at.

use super::coercion::parse_timestamp;
use super::header::{cell_matches, find_marker_row};
use crate::config::{CleaningConfig, FixedOffset};
use crate::constants::NUMBER_ROW_MARKER;
use crate::error::{GiosError, Result};
use crate::models::{FormatKind, RawTable};
use tracing::debug;

/// Identify which known layout a raw table follows
pub fn detect_format(raw: &RawTable, config: &CleaningConfig) -> Result<FormatKind> {
    if cell_matches(raw.cell(0, 0), NUMBER_ROW_MARKER)
        && cell_matches(raw.cell(1, 0), &config.station_marker)
    {
        debug!("Detected split-header layout");
        return Ok(FormatKind::SplitHeader);
    }

    if let Some(row) = find_marker_row(raw, &config.station_marker, config.marker_scan_rows) {
        debug!("Detected single-header layout, marker at row {}", row);
        return Ok(FormatKind::SingleHeader);
    }

    if let Some(offset) = config
        .fixed_offsets
        .iter()
        .find(|offset| matches_fixed_offset(raw, offset))
    {
        debug!(
            "Detected fixed-offset layout: header_row={}, data_row={}",
            offset.header_row, offset.data_row
        );
        return Ok(FormatKind::FixedOffset {
            header_row: offset.header_row,
            data_row: offset.data_row,
        });
    }

    let inspected = (0..raw.height().min(config.marker_scan_rows))
        .map(|row| format!("r{row}c0={}", raw.cell(row, 0)))
        .collect();
    Err(GiosError::UnrecognizedFormat { inspected })
}

/// Header row holds labels, `data_row` holds the first timestamp and no
/// timestamp appears in between
fn matches_fixed_offset(raw: &RawTable, offset: &FixedOffset) -> bool {
    let FixedOffset {
        header_row,
        data_row,
    } = *offset;

    if data_row >= raw.height() || data_row <= header_row {
        return false;
    }

    let header_is_labels = parse_timestamp(raw.cell(header_row, 0)).is_none()
        && (1..raw.width()).any(|col| !raw.cell(header_row, col).is_empty());
    let data_is_timestamp = parse_timestamp(raw.cell(data_row, 0)).is_some();
    let gap_is_clear =
        (header_row + 1..data_row).all(|row| parse_timestamp(raw.cell(row, 0)).is_none());

    header_is_labels && data_is_timestamp && gap_is_clear
}
