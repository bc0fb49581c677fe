//! Command implementations for the GIOŚ processor CLI
//!
//! Each subcommand lives in its own module; `shared` holds the logging,
//! configuration and archive-loading steps they have in common.

pub mod clean;
pub mod report;
pub mod shared;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Dispatch to the subcommand handler
pub fn run(args: Args) -> Result<()> {
    shared::setup_logging(&args)?;

    match &args.command {
        Commands::Clean(clean_args) => clean::run_clean(&args, clean_args),
        Commands::Report(report_args) => report::run_report(&args, report_args),
    }
}
