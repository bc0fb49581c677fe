//! Application constants for the GIOŚ processor
//!
//! Marker tokens, metadata row labels, timestamp formats and default
//! thresholds used throughout the cleaning pipeline and analysis layer.

// =============================================================================
// Raw Sheet Markers
// =============================================================================

/// First-column label of the station-code header row
pub const STATION_CODE_MARKER: &str = "Kod stacji";

/// First-column label of the running-number row that opens split-header sheets
pub const NUMBER_ROW_MARKER: &str = "Nr";

/// Label given to the timestamp column regardless of its raw label
pub const TIMESTAMP_COLUMN: &str = "Data";

/// First-column labels of rows that carry sheet metadata rather than readings
pub const METADATA_ROW_TOKENS: &[&str] = &[
    NUMBER_ROW_MARKER,
    STATION_CODE_MARKER,
    "Wskaźnik",
    "Czas uśredniania",
    "Jednostka",
    "Czas pomiaru",
    "Kod stanowiska",
];

/// Substrings marking unit or averaging-period annotations
pub const UNIT_ROW_MARKERS: &[&str] = &["1g", "24g", "ug/m3", "µg/m3", "μg/m3"];

/// Per-measurement suffixes appended to station codes in some years
pub const MEASUREMENT_SUFFIXES: &[&str] = &["-PM2.5-1g", "-PM10-1g"];

/// Rows scanned from the top of a sheet when looking for a marker
pub const DEFAULT_MARKER_SCAN_ROWS: usize = 20;

/// Known (header row, first data row) pairs for marker-less sheets
pub const DEFAULT_FIXED_OFFSETS: &[(usize, usize)] = &[(0, 1), (0, 3)];

/// Non-empty CSV lines inspected when choosing the delimiter
pub const DELIMITER_SNIFF_LINES: usize = 5;

// =============================================================================
// Timestamp Formats
// =============================================================================

/// Datetime layouts seen in the timestamp column across archive years
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts (read as midnight)
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

// =============================================================================
// Station Metadata Sheet
// =============================================================================

/// Column holding the current station code
pub const META_CURRENT_CODE: &str = "Kod stacji";

/// Substring identifying the column of legacy station codes
pub const META_LEGACY_CODE: &str = "Stary Kod stacji";

/// Column holding the voivodeship of the station
pub const META_REGION: &str = "Województwo";

/// Column holding the city of the station
pub const META_CITY: &str = "Miejscowość";

// =============================================================================
// Analysis Defaults
// =============================================================================

/// WHO daily PM2.5 guideline in µg/m³
pub const DEFAULT_DAILY_LIMIT: f64 = 15.0;

/// Stations reported at each end of an exceedance ranking
pub const DEFAULT_RANKING_SIZE: usize = 3;

// =============================================================================
// Output Artifacts
// =============================================================================

/// Canonical measurement table artifact
pub const DATABASE_PARQUET_FILENAME: &str = "database.parquet";

/// Optional CSV copy of the canonical table
pub const DATABASE_CSV_FILENAME: &str = "database.csv";

/// Station mapping artifact
pub const METADATA_FILENAME: &str = "metadata.json";
