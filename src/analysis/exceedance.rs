//! Daily-limit exceedance counts and station rankings

use super::aggregate::daily_mean;
use crate::models::{CalendarKey, SeriesTable};
use chrono::Datelike;
use serde::Serialize;

/// Days above the limit for one station
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationCount {
    pub station: String,
    pub days: usize,
}

/// Exceedance days per station over a whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceedanceSummary {
    pub limit: f64,
    /// In table column order
    pub per_station: Vec<StationCount>,
    /// Days on which at least one station exceeded the limit
    pub days_any: usize,
    /// Days with any row in the input
    pub days_observed: usize,
}

impl ExceedanceSummary {
    pub fn days_for(&self, station: &str) -> Option<usize> {
        self.per_station
            .iter()
            .find(|c| c.station == station)
            .map(|c| c.days)
    }
}

/// Count days whose daily mean is strictly above `limit`
///
/// Tables keyed by date are treated as already daily; a missing daily mean
/// never counts as an exceedance.
pub fn count_exceedances<K: CalendarKey>(table: &SeriesTable<K>, limit: f64) -> ExceedanceSummary {
    let daily = daily_mean(table);

    let per_station = daily
        .stations()
        .map(|series| StationCount {
            station: series.label.to_string(),
            days: series.values.iter().flatten().filter(|&&v| v > limit).count(),
        })
        .collect();

    let days_any = daily
        .rows()
        .filter(|row| row.iter().flatten().any(|&v| v > limit))
        .count();

    ExceedanceSummary {
        limit,
        per_station,
        days_any,
        days_observed: daily.height(),
    }
}

/// Exceedance days per year and column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyExceedances {
    pub limit: f64,
    pub years: Vec<i32>,
    pub columns: Vec<String>,
    /// One row per year, one entry per column
    pub counts: Vec<Vec<usize>>,
}

impl YearlyExceedances {
    pub fn get(&self, year: i32, column: &str) -> Option<usize> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.counts[row][col])
    }
}

/// Count exceedance days separately for every calendar year
pub fn yearly_exceedances<K: CalendarKey>(
    table: &SeriesTable<K>,
    limit: f64,
) -> YearlyExceedances {
    let daily = daily_mean(table);
    let mut years: Vec<i32> = Vec::new();
    let mut counts: Vec<Vec<usize>> = Vec::new();

    for (day, row) in daily.keys().iter().zip(daily.rows()) {
        if years.last() != Some(&day.year()) {
            years.push(day.year());
            counts.push(vec![0; daily.width()]);
        }
        if let Some(year_counts) = counts.last_mut() {
            for (col, value) in row.into_iter().enumerate() {
                if value.is_some_and(|v| v > limit) {
                    year_counts[col] += 1;
                }
            }
        }
    }

    YearlyExceedances {
        limit,
        years,
        columns: daily.columns().to_vec(),
        counts,
    }
}

/// Stations with the most and the fewest exceedance days
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    /// Descending by days
    pub top: Vec<StationCount>,
    /// Ascending by days
    pub bottom: Vec<StationCount>,
}

/// Rank stations by exceedance days; ties keep table column order
pub fn rank_stations(summary: &ExceedanceSummary, n: usize) -> Ranking {
    let mut descending = summary.per_station.clone();
    descending.sort_by(|a, b| b.days.cmp(&a.days));

    let mut ascending = summary.per_station.clone();
    ascending.sort_by(|a, b| a.days.cmp(&b.days));

    Ranking {
        top: descending.into_iter().take(n).collect(),
        bottom: ascending.into_iter().take(n).collect(),
    }
}
