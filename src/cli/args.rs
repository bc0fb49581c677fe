//! Command-line argument definitions for the GIOŚ processor
//!
//! Uses the clap derive API. Global flags control logging and the optional
//! JSON configuration file; each subcommand carries its own inputs.

use crate::config::DuplicatePolicy;
use crate::error::GiosError;
use crate::models::FormatKind;
use crate::source::year_from_path;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// CLI arguments for the GIOŚ archive processor
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gios-processor",
    version,
    about = "Clean GIOŚ air-quality archives into a canonical hourly table",
    long_about = "Normalizes the yearly hourly-measurement archives published by the Polish \
                  Chief Inspectorate of Environmental Protection (GIOŚ) into one table keyed \
                  by timestamp with a column per station, and reports daily-limit exceedances."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output and log only errors
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// JSON configuration file; absent keys keep their defaults
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Clean archive files and save the canonical table
    Clean(CleanArgs),
    /// Clean archive files and report daily-limit exceedances
    Report(ReportArgs),
}

/// Inputs shared by every command that cleans archives
#[derive(Debug, Clone, Parser)]
pub struct InputArgs {
    /// Archive files (.xlsx, .csv) or directories to search for them
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Raw layout: auto, single-header, split-header, by-year or fixed:HEADER:DATA
    #[arg(
        long = "format",
        value_name = "FORMAT",
        default_value = "auto",
        value_parser = parse_format_choice
    )]
    pub format: FormatChoice,

    /// Worksheet to read from spreadsheet inputs (default: first sheet)
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,

    /// Station metadata sheet used to map legacy codes to current ones
    #[arg(short = 'm', long = "metadata", value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// What to do with repeated timestamps
    #[arg(long = "duplicates", value_enum)]
    pub duplicates: Option<DuplicatesArg>,
}

#[derive(Debug, Clone, Parser)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory for database.parquet and metadata.json
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Also write database.csv
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Daily mean limit in µg/m³ (default from config, 15.0)
    #[arg(long = "limit", value_name = "VALUE")]
    pub limit: Option<f64>,

    /// Stations shown at each end of the ranking
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Also count exceedance days per voivodeship and year (needs --metadata)
    #[arg(long = "by-region", requires = "metadata")]
    pub by_region: bool,

    /// List exceedance days for every station, not just the ranking ends
    #[arg(long = "per-station")]
    pub per_station: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicatesArg {
    Reject,
    Mean,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::Reject => DuplicatePolicy::Reject,
            DuplicatesArg::Mean => DuplicatePolicy::Mean,
        }
    }
}

/// How the raw layout of each input is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    /// Inspect each sheet
    Auto,
    /// Derive the layout from the year in each file name
    ByYear,
    /// Use one layout for every input
    Fixed(FormatKind),
}

impl FormatChoice {
    /// Layout to force for `path`; `None` means detect from content
    pub fn kind_for(&self, path: &Path) -> Option<FormatKind> {
        match self {
            FormatChoice::Auto => None,
            FormatChoice::ByYear => year_from_path(path).map(FormatKind::for_year),
            FormatChoice::Fixed(kind) => Some(*kind),
        }
    }
}

impl FromStr for FormatChoice {
    type Err = GiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GiosError::Configuration {
            message: format!(
                "Unknown format '{s}'. Expected auto, single-header, split-header, by-year or fixed:HEADER:DATA"
            ),
        };

        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(FormatChoice::Auto),
            "by-year" => Ok(FormatChoice::ByYear),
            "single-header" => Ok(FormatChoice::Fixed(FormatKind::SingleHeader)),
            "split-header" => Ok(FormatChoice::Fixed(FormatKind::SplitHeader)),
            other => {
                let offsets = other.strip_prefix("fixed:").ok_or_else(invalid)?;
                let (header, data) = offsets.split_once(':').ok_or_else(invalid)?;
                let header_row: usize = header.parse().map_err(|_| invalid())?;
                let data_row: usize = data.parse().map_err(|_| invalid())?;
                if data_row <= header_row {
                    return Err(invalid());
                }
                Ok(FormatChoice::Fixed(FormatKind::FixedOffset {
                    header_row,
                    data_row,
                }))
            }
        }
    }
}

fn parse_format_choice(s: &str) -> Result<FormatChoice, String> {
    s.parse().map_err(|e: GiosError| e.to_string())
}

impl fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatChoice::Auto => write!(f, "auto"),
            FormatChoice::ByYear => write!(f, "by-year"),
            FormatChoice::Fixed(kind) => write!(f, "{kind}"),
        }
    }
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
