//! Removal of non-measurement rows interleaved with data.
//!
//! Archive sheets carry indicator, averaging-time, unit and measurement-time
//! rows between the header and the readings. They are recognised by the
//! label in the first column, compared case- and whitespace-insensitively.

use super::coercion::parse_timestamp;
use crate::config::CleaningConfig;
use crate::constants::METADATA_ROW_TOKENS;
use crate::models::{Cell, StagedTable};
use std::collections::HashSet;
use tracing::debug;

/// Lowercase and collapse internal whitespace
pub(crate) fn normalize_token(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Counts of rows removed by one filter pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub metadata_rows: usize,
    pub non_timestamp_rows: usize,
}

/// Filter for metadata rows; idempotent
#[derive(Debug, Clone)]
pub struct MetadataFilter {
    tokens: HashSet<String>,
    unit_markers: Vec<String>,
}

impl MetadataFilter {
    pub fn new(config: &CleaningConfig) -> Self {
        let tokens = METADATA_ROW_TOKENS
            .iter()
            .map(|t| normalize_token(t))
            .chain(std::iter::once(normalize_token(&config.station_marker)))
            .chain(config.extra_metadata_tokens.iter().map(|t| normalize_token(t)))
            .collect();

        let unit_markers = config
            .unit_markers
            .iter()
            .map(|m| normalize_token(m))
            .filter(|m| !m.is_empty())
            .collect();

        Self {
            tokens,
            unit_markers,
        }
    }

    /// Whether a first-column cell labels a metadata row
    pub fn is_metadata_label(&self, cell: &Cell) -> bool {
        let Cell::Text(text) = cell else {
            return false;
        };
        let token = normalize_token(text);
        self.tokens.contains(&token) || self.unit_markers.iter().any(|m| token.contains(m))
    }

    pub fn apply(&self, staged: StagedTable) -> StagedTable {
        self.apply_with_stats(staged).0
    }

    /// Drop metadata rows, then any row whose first column is not a timestamp
    pub fn apply_with_stats(&self, staged: StagedTable) -> (StagedTable, FilterStats) {
        let mut stats = FilterStats::default();
        let rows = staged
            .rows
            .into_iter()
            .filter(|row| {
                if self.is_metadata_label(row.first()) {
                    debug!("Dropping metadata row {}: {}", row.source_row, row.first());
                    stats.metadata_rows += 1;
                    return false;
                }
                if parse_timestamp(row.first()).is_none() {
                    debug!(
                        "Dropping row {}: first column {} is not a timestamp",
                        row.source_row,
                        row.first()
                    );
                    stats.non_timestamp_rows += 1;
                    return false;
                }
                true
            })
            .collect();

        (
            StagedTable {
                labels: staged.labels,
                rows,
            },
            stats,
        )
    }
}
