//! GIOŚ Processor Library
//!
//! Cleans the hourly air-quality archives published by the Polish Chief
//! Inspectorate of Environmental Protection (GIOŚ) into a canonical table:
//! unique increasing timestamps named `Data` and one numeric column per
//! station.
//!
//! This library provides tools for:
//! - Detecting the raw layout of each yearly archive and locating its header
//! - Dropping metadata rows and coercing timestamps and decimal-comma values
//! - Applying the hour-ending midnight convention before any grouping
//! - Mapping legacy station codes to current ones from the station metadata
//! - Daily and monthly means, limit exceedance counts and station rankings
//! - Writing the cleaned table to Parquet with a JSON metadata sidecar

pub mod analysis;
pub mod cleaning;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod source;
pub mod stations;
pub mod writer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

pub use cleaning::{Cleaner, clean};
pub use config::GiosConfig;
pub use error::{GiosError, Result};
pub use models::{CanonicalTable, Cell, CleaningReport, FormatKind, RawTable};
pub use stations::StationDirectory;
