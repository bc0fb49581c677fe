//! Shared components for CLI commands
//!
//! Logging setup, configuration loading and the load-and-clean loop used by
//! both `clean` and `report`.

use crate::cleaning::{Cleaner, combine, merge_duplicate_columns};
use crate::cli::args::{Args, InputArgs};
use crate::config::GiosConfig;
use crate::models::{CanonicalTable, CleaningReport};
use crate::source::{discover_sources, read_raw_table};
use crate::stations::StationDirectory;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Outcome of cleaning every input of a command
#[derive(Debug)]
pub struct LoadedArchives {
    pub table: CanonicalTable,
    pub directory: StationDirectory,
    pub reports: Vec<(PathBuf, CleaningReport)>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gios_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load the JSON configuration if one was given, then apply CLI overrides
pub fn load_configuration(args: &Args, input: &InputArgs) -> Result<GiosConfig> {
    let mut config = match &args.config_file {
        Some(path) => GiosConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => GiosConfig::default(),
    };

    if let Some(duplicates) = input.duplicates {
        config.cleaning.duplicate_policy = duplicates.into();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Read the station metadata sheet, or an empty directory when none is given
pub fn load_directory(
    path: Option<&Path>,
    config: &GiosConfig,
) -> Result<StationDirectory> {
    let Some(path) = path else {
        return Ok(StationDirectory::default());
    };

    let raw = read_raw_table(path, None)
        .with_context(|| format!("Failed to read station metadata {}", path.display()))?;
    let directory = StationDirectory::from_raw(&raw, &config.metadata_columns)
        .with_context(|| format!("Invalid station metadata in {}", path.display()))?;

    info!(
        "Loaded {} stations ({} code mappings) from {}",
        directory.records().len(),
        directory.code_mapping().len(),
        path.display()
    );
    Ok(directory)
}

/// Clean every input file and join the results into one table
///
/// A file that fails to load or clean is reported and skipped; the command
/// fails only when no file could be cleaned.
pub fn load_archives(
    input: &InputArgs,
    config: &GiosConfig,
    show_progress: bool,
) -> Result<LoadedArchives> {
    let cleaner = Cleaner::new(config.cleaning.clone()).context("Invalid cleaning configuration")?;
    // Station metadata is read once and only borrowed afterwards
    let directory = load_directory(input.metadata.as_deref(), config)?;

    let files = discover_sources(&input.inputs).context("Failed to discover input files")?;
    if files.is_empty() {
        bail!("No .xlsx or .csv archives found in the given inputs");
    }

    println!(
        "{} {} archive files (format: {})",
        "Cleaning".bright_green().bold(),
        files.len().to_string().bright_white().bold(),
        input.format
    );

    let pb = if show_progress {
        create_progress_bar(files.len() as u64, "Cleaning archives")
    } else {
        ProgressBar::hidden()
    };

    let mut tables = Vec::with_capacity(files.len());
    let mut reports = Vec::with_capacity(files.len());
    let mut failed = Vec::new();

    for path in &files {
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        match clean_file(&cleaner, path, input, &directory, config) {
            Ok((table, report)) => {
                debug!(
                    "{}: {} layout, {} rows x {} stations",
                    path.display(),
                    report.format.map(|f| f.to_string()).unwrap_or_default(),
                    report.rows_out,
                    report.columns_out
                );
                if report.empty_result {
                    warn!("{} produced no data rows", path.display());
                }
                tables.push(table);
                reports.push((path.clone(), report));
            }
            Err(e) => {
                error!("Failed to clean {}: {:#}", path.display(), e);
                failed.push((path.clone(), format!("{:#}", e)));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Archives cleaned");

    if tables.is_empty() {
        bail!("None of the {} archive files could be cleaned", files.len());
    }

    let table = combine(&tables, config.cleaning.duplicate_policy)
        .context("Failed to combine yearly tables")?;
    info!(
        "Combined table: {} rows x {} stations",
        table.height(),
        table.width()
    );

    Ok(LoadedArchives {
        table,
        directory,
        reports,
        failed,
    })
}

/// Load and clean one file, then map legacy station codes to current ones
fn clean_file(
    cleaner: &Cleaner,
    path: &Path,
    input: &InputArgs,
    directory: &StationDirectory,
    config: &GiosConfig,
) -> Result<(CanonicalTable, CleaningReport)> {
    let raw = read_raw_table(path, input.sheet.as_deref())?;

    let (table, report) = match input.format.kind_for(path) {
        Some(kind) => cleaner.clean_as_with_report(&raw, kind)?,
        None => cleaner.clean_with_report(&raw)?,
    };

    if directory.code_mapping().is_empty() {
        return Ok((table, report));
    }
    let renamed = crate::analysis::rename_columns(&table, directory.code_mapping());
    let merged = merge_duplicate_columns(&renamed, config.cleaning.column_collision)?;
    Ok((merged, report))
}

/// Print the per-run summary in the same style for every command
pub fn print_summary(loaded: &LoadedArchives) {
    println!("\n{}", "Cleaning Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Files cleaned:".bright_cyan(),
        loaded.reports.len().to_string().bright_white()
    );
    if !loaded.failed.is_empty() {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            loaded.failed.len().to_string().bright_red().bold()
        );
        for (path, reason) in &loaded.failed {
            println!("    {} {}", path.display(), reason.dimmed());
        }
    }

    let totals = loaded
        .reports
        .iter()
        .fold(CleaningReport::default(), |mut acc, (_, r)| {
            acc.metadata_rows_dropped += r.metadata_rows_dropped;
            acc.unparseable_timestamps += r.unparseable_timestamps;
            acc.unparseable_values += r.unparseable_values;
            acc.midnight_rows_shifted += r.midnight_rows_shifted;
            acc
        });
    println!(
        "  {} {} metadata rows, {} bad timestamps, {} bad values, {} midnight shifts",
        "Dropped/adjusted:".bright_cyan(),
        totals.metadata_rows_dropped,
        totals.unparseable_timestamps,
        totals.unparseable_values,
        totals.midnight_rows_shifted
    );
    println!(
        "  {} {} rows x {} stations",
        "Canonical table:".bright_cyan(),
        loaded.table.height().to_string().bright_white().bold(),
        loaded.table.width().to_string().bright_white().bold()
    );
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
