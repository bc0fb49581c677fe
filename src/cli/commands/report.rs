//! Report command: daily-limit exceedances and station rankings

use super::shared::{load_archives, load_configuration, print_summary};
use crate::analysis::{
    ExceedanceSummary, Ranking, StationCount, YearlyExceedances, count_exceedances,
    merge_duplicate_columns, rank_stations, rename_columns, yearly_exceedances,
};
use crate::cli::args::{Args, ReportArgs};
use crate::config::ColumnCollision;
use anyhow::{Context, Result, bail};
use colored::*;
use tracing::info;

pub fn run_report(args: &Args, report: &ReportArgs) -> Result<()> {
    let config = load_configuration(args, &report.input)?;
    let limit = report.limit.unwrap_or(config.analysis.daily_limit);
    let top = report.top.unwrap_or(config.analysis.ranking_size);
    if !limit.is_finite() {
        bail!("--limit must be a finite number");
    }

    let loaded = load_archives(&report.input, &config, args.show_progress())?;
    print_summary(&loaded);

    info!("Counting days with daily mean above {}", limit);
    let summary = count_exceedances(&loaded.table, limit);
    print_exceedances(&summary);
    if report.per_station {
        print_station_block("Exceedance days per station", &summary.per_station);
    }
    print_ranking(&rank_stations(&summary, top));

    if report.by_region {
        // Stations of one voivodeship are averaged into a single regional series
        let regional = rename_columns(&loaded.table, loaded.directory.region_mapping());
        let regional = merge_duplicate_columns(&regional, ColumnCollision::Mean)
            .context("Failed to merge stations by region")?;
        print_yearly(&yearly_exceedances(&regional, limit));
    }

    Ok(())
}

fn print_exceedances(summary: &ExceedanceSummary) {
    println!(
        "\n{} (daily mean > {} µg/m³)",
        "Exceedance Days".bright_green().bold(),
        summary.limit
    );
    println!(
        "  {} {} of {}",
        "Days with any exceedance:".bright_cyan(),
        summary.days_any.to_string().bright_white().bold(),
        summary.days_observed
    );
}

fn print_ranking(ranking: &Ranking) {
    print_station_block("Most exceedance days", &ranking.top);
    print_station_block("Fewest exceedance days", &ranking.bottom);
}

fn print_station_block(title: &str, entries: &[StationCount]) {
    println!("\n{}", title.bright_green().bold());
    for line in station_lines(entries) {
        println!("  {}", line.bright_white());
    }
}

/// One aligned `station days` line per entry, in the given order
fn station_lines(entries: &[StationCount]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| format!("{:<24} {:>4}", entry.station, entry.days))
        .collect()
}

fn print_yearly(yearly: &YearlyExceedances) {
    println!("\n{}", "Exceedance Days by Region".bright_green().bold());
    for (year, counts) in yearly.years.iter().zip(&yearly.counts) {
        println!("  {}", year.to_string().bright_cyan().bold());
        for (region, days) in yearly.columns.iter().zip(counts) {
            println!("    {:<24} {}", region, days);
        }
    }
}
