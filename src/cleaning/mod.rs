//! Cleaning pipeline for raw GIOŚ archive sheets.
//!
//! Turns one raw sheet into a [`CanonicalTable`]: a table keyed by unique,
//! increasing timestamps with one numeric column per station.
//!
//! The stages run in a fixed order:
//!
//! 1. [`detector`] picks the [`FormatKind`] (unless the caller supplies one)
//! 2. [`header`] locates the station-code row and the first data row
//! 3. [`metadata_filter`] drops unit / indicator / averaging-time rows
//! 4. [`coercion`] parses timestamps and values
//! 5. [`midnight`] moves 00:00 readings back to the day they close
//! 6. [`assembler`] keys, sorts and de-duplicates the rows
//! 7. [`column_names`] reduces labels to bare station codes
//!
//! # Example
//!
//! ```rust
//! use gios_processor::cleaning::clean;
//! use gios_processor::models::RawTable;
//!
//! let raw = RawTable::from_strings([
//!     vec!["Nr", "1", "2"],
//!     vec!["Kod stacji", "S1", "S2"],
//!     vec!["Jednostka", "ug/m3", "ug/m3"],
//!     vec!["2021-01-01 01:00", "5,0", "3,0"],
//!     vec!["2021-01-01 00:00", "7,0", "1,0"],
//! ]);
//!
//! let table = clean(&raw)?;
//! assert_eq!(table.height(), 2);
//! assert_eq!(table.columns(), &["S1", "S2"]);
//! # Ok::<(), gios_processor::error::GiosError>(())
//! ```

pub mod assembler;
pub mod coercion;
pub mod column_names;
pub mod detector;
pub mod header;
pub mod metadata_filter;
pub mod midnight;

#[cfg(test)]
pub mod tests;

pub use assembler::{assemble, combine};
pub use column_names::{merge_duplicate_columns, normalize_column_names, normalize_label};
pub use detector::detect_format;
pub use header::{resolve_header, stage_rows};
pub use metadata_filter::MetadataFilter;
pub use midnight::{apply_midnight_shift, shift_midnight};

use crate::config::CleaningConfig;
use crate::error::{GiosError, Result};
use crate::models::{CanonicalTable, CleaningReport, FormatKind, RawTable};
use tracing::{debug, warn};

/// Clean a raw sheet with the default configuration and detected layout
pub fn clean(raw: &RawTable) -> Result<CanonicalTable> {
    Cleaner::default().clean(raw)
}

/// Configured cleaning pipeline
#[derive(Debug, Clone)]
pub struct Cleaner {
    config: CleaningConfig,
    filter: MetadataFilter,
}

impl Default for Cleaner {
    fn default() -> Self {
        let config = CleaningConfig::default();
        let filter = MetadataFilter::new(&config);
        Self { config, filter }
    }
}

impl Cleaner {
    /// Create a cleaner after validating its configuration
    pub fn new(config: CleaningConfig) -> Result<Self> {
        config.validate()?;
        let filter = MetadataFilter::new(&config);
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Identify the layout of a raw sheet
    pub fn detect(&self, raw: &RawTable) -> Result<FormatKind> {
        detect_format(raw, &self.config)
    }

    /// Detect the layout and clean
    pub fn clean(&self, raw: &RawTable) -> Result<CanonicalTable> {
        self.clean_with_report(raw).map(|(table, _)| table)
    }

    /// Clean using a layout chosen by the caller (e.g. from the archive year)
    pub fn clean_as(&self, raw: &RawTable, kind: FormatKind) -> Result<CanonicalTable> {
        self.clean_as_with_report(raw, kind).map(|(table, _)| table)
    }

    pub fn clean_with_report(&self, raw: &RawTable) -> Result<(CanonicalTable, CleaningReport)> {
        let kind = self.detect(raw)?;
        self.clean_as_with_report(raw, kind)
    }

    pub fn clean_as_with_report(
        &self,
        raw: &RawTable,
        kind: FormatKind,
    ) -> Result<(CanonicalTable, CleaningReport)> {
        let mut report = CleaningReport {
            format: Some(kind),
            ..Default::default()
        };

        let layout = resolve_header(raw, kind, &self.config)?;
        report.header_row = layout.header_row;
        report.data_row = layout.data_row;

        let staged = stage_rows(raw, &layout);
        report.raw_rows = staged.rows.len();

        let (filtered, filter_stats) = self.filter.apply_with_stats(staged);
        report.metadata_rows_dropped = filter_stats.metadata_rows;

        let coerced = coercion::coerce(filtered);
        report.unparseable_timestamps =
            filter_stats.non_timestamp_rows + coerced.unparseable_timestamps;
        report.unparseable_values = coerced.unparseable_values;

        let mut timestamps = coerced.timestamps;
        report.midnight_rows_shifted = apply_midnight_shift(&mut timestamps);

        let (table, assembly) = assemble(
            coerced.labels,
            timestamps,
            coerced.rows,
            coerced.source_rows,
            self.config.duplicate_policy,
        )?;
        report.empty_rows_dropped = assembly.empty_rows_dropped;
        report.duplicates_merged = assembly.duplicates_merged;

        let table = normalize_column_names(&table, &self.config.measurement_suffixes);
        let table = merge_duplicate_columns(&table, self.config.column_collision)?;

        report.rows_out = table.height();
        report.columns_out = table.width();
        report.empty_result = table.is_empty();

        if table.is_empty() {
            warn!(
                "No data rows survived cleaning of {} sheet (header_row={}, data_row={}); \
                 the layout or header offset is probably wrong",
                kind, layout.header_row, layout.data_row
            );
            if self.config.fail_on_empty {
                return Err(GiosError::EmptyResult {
                    format: kind.to_string(),
                });
            }
        }

        debug!(
            "Cleaned {} sheet: {} rows in, {} rows x {} stations out \
             ({} metadata, {} bad timestamps, {} bad values, {} midnight shifts)",
            kind,
            report.raw_rows,
            report.rows_out,
            report.columns_out,
            report.metadata_rows_dropped,
            report.unparseable_timestamps,
            report.unparseable_values,
            report.midnight_rows_shifted
        );

        Ok((table, report))
    }
}
