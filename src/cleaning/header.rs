//! Header resolution per raw layout.
//!
//! Locates the station-code row and the first data row, builds the column
//! labels, and stages the data rows for filtering.

use super::coercion::parse_timestamp;
use super::metadata_filter::normalize_token;
use crate::config::CleaningConfig;
use crate::constants::{NUMBER_ROW_MARKER, TIMESTAMP_COLUMN};
use crate::error::{GiosError, Result};
use crate::models::{Cell, FormatKind, HeaderLayout, RawTable, StagedRow, StagedTable};
use tracing::debug;

/// Whether a cell holds `marker`, ignoring case and surrounding whitespace
pub(crate) fn cell_matches(cell: &Cell, marker: &str) -> bool {
    match cell {
        Cell::Text(text) => normalize_token(text) == normalize_token(marker),
        _ => false,
    }
}

/// First row within `limit` rows whose first cell holds `marker`
pub(crate) fn find_marker_row(raw: &RawTable, marker: &str, limit: usize) -> Option<usize> {
    (0..raw.height().min(limit)).find(|&row| cell_matches(raw.cell(row, 0), marker))
}

/// Locate header and first data row for the given layout
pub fn resolve_header(
    raw: &RawTable,
    kind: FormatKind,
    config: &CleaningConfig,
) -> Result<HeaderLayout> {
    let (header_row, data_row) = match kind {
        FormatKind::SingleHeader => {
            let header_row = find_marker_row(raw, &config.station_marker, raw.height())
                .ok_or_else(|| GiosError::HeaderNotFound {
                    format: kind.to_string(),
                    reason: format!("no row starts with '{}'", config.station_marker),
                })?;
            // Stray rows may sit between the header and the first reading
            let data_row = (header_row + 1..raw.height())
                .find(|&row| parse_timestamp(raw.cell(row, 0)).is_some())
                .unwrap_or(raw.height());
            (header_row, data_row)
        }
        FormatKind::SplitHeader => {
            let number_row = find_marker_row(raw, NUMBER_ROW_MARKER, config.marker_scan_rows)
                .ok_or_else(|| GiosError::HeaderNotFound {
                    format: kind.to_string(),
                    reason: format!("no leading '{}' row", NUMBER_ROW_MARKER),
                })?;
            let header_row = number_row + 1;
            if !cell_matches(raw.cell(header_row, 0), &config.station_marker) {
                return Err(GiosError::HeaderNotFound {
                    format: kind.to_string(),
                    reason: format!(
                        "row {} starts with {} instead of '{}'",
                        header_row,
                        raw.cell(header_row, 0),
                        config.station_marker
                    ),
                });
            }
            // Skip the units row that follows the station codes
            (header_row, header_row + 2)
        }
        FormatKind::FixedOffset {
            header_row,
            data_row,
        } => {
            if header_row >= raw.height() {
                return Err(GiosError::HeaderNotFound {
                    format: kind.to_string(),
                    reason: format!(
                        "header row {} beyond table height {}",
                        header_row,
                        raw.height()
                    ),
                });
            }
            (header_row, data_row)
        }
    };

    let mut labels = vec![TIMESTAMP_COLUMN.to_string()];
    let mut source_columns = vec![0];
    for column in 1..raw.width() {
        match raw.cell(header_row, column).as_label() {
            Some(label) => {
                labels.push(label);
                source_columns.push(column);
            }
            None => debug!("Skipping unlabelled column {}", column),
        }
    }

    debug!(
        "Resolved {} header: header_row={}, data_row={}, {} stations",
        kind,
        header_row,
        data_row,
        labels.len() - 1
    );

    Ok(HeaderLayout {
        header_row,
        data_row,
        labels,
        source_columns,
    })
}

/// Collect the rows below the header, skipping rows that are entirely blank
pub fn stage_rows(raw: &RawTable, layout: &HeaderLayout) -> StagedTable {
    let rows = (layout.data_row..raw.height())
        .filter_map(|row| {
            let cells: Vec<Cell> = layout
                .source_columns
                .iter()
                .map(|&column| raw.cell(row, column).clone())
                .collect();
            if cells.iter().all(Cell::is_empty) {
                return None;
            }
            Some(StagedRow {
                source_row: row,
                cells,
            })
        })
        .collect();

    StagedTable {
        labels: layout.labels.clone(),
        rows,
    }
}
