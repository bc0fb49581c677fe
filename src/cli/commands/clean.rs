//! Clean command: archives in, canonical table and metadata out

use super::shared::{load_archives, load_configuration, print_summary};
use crate::cli::args::{Args, CleanArgs};
use crate::writer::save_local;
use anyhow::{Context, Result};
use colored::*;
use indicatif::HumanDuration;
use std::time::Instant;
use tracing::{debug, info};

/// Clean every input, combine the years and save the artifacts
pub fn run_clean(args: &Args, clean: &CleanArgs) -> Result<()> {
    let start_time = Instant::now();
    info!("Starting GIOŚ archive cleaning");
    debug!("Command line arguments: {:?}", clean);

    let mut config = load_configuration(args, &clean.input)?;
    if clean.csv {
        config.writer.write_csv = true;
    }

    let loaded = load_archives(&clean.input, &config, args.show_progress())?;
    print_summary(&loaded);

    let saved = save_local(&clean.output, &loaded.table, &loaded.directory, &config.writer)
        .with_context(|| format!("Failed to save dataset to {}", clean.output.display()))?;

    println!(
        "  {} {}",
        "Database:".bright_cyan(),
        saved.database.display().to_string().bright_white()
    );
    if let Some(csv) = &saved.csv {
        println!(
            "  {} {}",
            "CSV copy:".bright_cyan(),
            csv.display().to_string().bright_white()
        );
    }
    println!(
        "  {} {}",
        "Metadata:".bright_cyan(),
        saved.metadata.display().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(start_time.elapsed()).to_string().bright_white()
    );

    Ok(())
}
