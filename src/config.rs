//! Configuration management and validation.
//!
//! Provides configuration structures for the cleaning pipeline, the station
//! metadata sheet, the analysis layer and artifact writing. Every structure
//! has a working `Default` and can be loaded from a JSON file.

use crate::constants::{
    DEFAULT_DAILY_LIMIT, DEFAULT_FIXED_OFFSETS, DEFAULT_MARKER_SCAN_ROWS, DEFAULT_RANKING_SIZE,
    MEASUREMENT_SUFFIXES, META_CITY, META_CURRENT_CODE, META_LEGACY_CODE, META_REGION,
    STATION_CODE_MARKER, UNIT_ROW_MARKERS,
};
use crate::error::{GiosError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// What to do when two rows share a timestamp after the midnight shift
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateTimestamp`
    #[default]
    Reject,
    /// Average the non-missing readings per station
    Mean,
}

/// What to do when two columns end up with the same station label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnCollision {
    /// Fail with `DuplicateColumn`
    #[default]
    Reject,
    /// Average the non-missing readings per row
    Mean,
}

/// Header row / first data row pair for marker-less sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedOffset {
    pub header_row: usize,
    pub data_row: usize,
}

/// Settings for the cleaning pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// First-column label of the station-code header row
    pub station_marker: String,

    /// Metadata row labels in addition to the built-in set
    pub extra_metadata_tokens: Vec<String>,

    /// Substrings marking unit / averaging-period rows
    pub unit_markers: Vec<String>,

    /// Suffixes stripped from station labels
    pub measurement_suffixes: Vec<String>,

    /// Known layouts of marker-less sheets, tried in order
    pub fixed_offsets: Vec<FixedOffset>,

    /// Rows scanned from the top when looking for the station marker
    pub marker_scan_rows: usize,

    /// Policy for timestamps that collide after the midnight shift
    pub duplicate_policy: DuplicatePolicy,

    /// Policy for station labels that collide after normalization
    pub column_collision: ColumnCollision,

    /// Treat a table with no surviving rows as an error instead of a warning
    pub fail_on_empty: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            station_marker: STATION_CODE_MARKER.to_string(),
            extra_metadata_tokens: Vec::new(),
            unit_markers: UNIT_ROW_MARKERS.iter().map(|s| s.to_string()).collect(),
            measurement_suffixes: MEASUREMENT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            fixed_offsets: DEFAULT_FIXED_OFFSETS
                .iter()
                .map(|&(header_row, data_row)| FixedOffset {
                    header_row,
                    data_row,
                })
                .collect(),
            marker_scan_rows: DEFAULT_MARKER_SCAN_ROWS,
            duplicate_policy: DuplicatePolicy::default(),
            column_collision: ColumnCollision::default(),
            fail_on_empty: false,
        }
    }
}

impl CleaningConfig {
    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.station_marker.trim().is_empty() {
            return Err(GiosError::Configuration {
                message: "station_marker must not be empty".to_string(),
            });
        }

        if self.marker_scan_rows == 0 {
            return Err(GiosError::Configuration {
                message: "marker_scan_rows must be greater than 0".to_string(),
            });
        }

        if let Some(offset) = self
            .fixed_offsets
            .iter()
            .find(|o| o.data_row <= o.header_row)
        {
            return Err(GiosError::Configuration {
                message: format!(
                    "fixed offset data_row {} must come after header_row {}",
                    offset.data_row, offset.header_row
                ),
            });
        }

        if self.measurement_suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err(GiosError::Configuration {
                message: "measurement_suffixes must not contain empty entries".to_string(),
            });
        }

        debug!(
            "Cleaning configuration validated: {} fixed offsets, {} suffixes",
            self.fixed_offsets.len(),
            self.measurement_suffixes.len()
        );
        Ok(())
    }
}

/// Column labels of the station metadata sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataColumns {
    /// Exact label of the current-code column
    pub current_code: String,
    /// Substring identifying the legacy-codes column
    pub legacy_codes: String,
    /// Exact label of the region column
    pub region: String,
    /// Exact label of the city column
    pub city: String,
}

impl Default for MetadataColumns {
    fn default() -> Self {
        Self {
            current_code: META_CURRENT_CODE.to_string(),
            legacy_codes: META_LEGACY_CODE.to_string(),
            region: META_REGION.to_string(),
            city: META_CITY.to_string(),
        }
    }
}

/// Settings for exceedance counting and ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Daily mean limit; a day exceeds when its mean is strictly greater
    pub daily_limit: f64,
    /// Stations reported at each end of a ranking
    pub ranking_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            ranking_size: DEFAULT_RANKING_SIZE,
        }
    }
}

/// Supported compression algorithms for the Parquet artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Settings for persisting the cleaned artifacts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub compression: CompressionAlgorithm,
    /// Also write a CSV copy of the canonical table
    pub write_csv: bool,
}

/// Top-level configuration for the processor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GiosConfig {
    pub cleaning: CleaningConfig,
    pub metadata_columns: MetadataColumns,
    pub analysis: AnalysisConfig,
    pub writer: WriterConfig,
}

impl GiosConfig {
    /// Load configuration from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GiosConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;

        if !self.analysis.daily_limit.is_finite() {
            return Err(GiosError::Configuration {
                message: "daily_limit must be a finite number".to_string(),
            });
        }

        Ok(())
    }
}
