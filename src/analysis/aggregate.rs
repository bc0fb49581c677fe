//! Calendar aggregation of station tables

use crate::models::{CalendarKey, DailyTable, MonthlyTable, SeriesTable, YearMonth, mean_of};
use serde::Serialize;

/// Group rows by a monotone function of the key and average each group
///
/// Keys are sorted, so any grouping that preserves order produces
/// contiguous runs.
fn group_mean<K, G>(table: &SeriesTable<K>, group_of: impl Fn(K) -> G) -> SeriesTable<G>
where
    K: CalendarKey,
    G: Ord + Copy,
{
    let mut groups: Vec<(G, usize, usize)> = Vec::new();
    for (row, key) in table.keys().iter().enumerate() {
        let group = group_of(*key);
        match groups.last_mut() {
            Some((last, _, end)) if *last == group => *end = row + 1,
            _ => groups.push((group, row, row + 1)),
        }
    }

    let keys = groups.iter().map(|(g, _, _)| *g).collect();
    let values = table
        .stations()
        .map(|series| {
            groups
                .iter()
                .map(|&(_, start, end)| mean_of(series.values[start..end].iter().copied()))
                .collect()
        })
        .collect();

    SeriesTable::from_parts(
        table.index_name().to_string(),
        keys,
        table.columns().to_vec(),
        values,
    )
}

/// Daily means per station, keyed by the calendar date of each key
///
/// Midnight keys already carry the previous day's date, so the 24:00
/// reading lands in the day it closes. Only days present in the input
/// appear; a day where a station has no readings is missing for it.
pub fn daily_mean<K: CalendarKey>(table: &SeriesTable<K>) -> DailyTable {
    group_mean(table, |key| key.calendar_date())
}

/// Monthly means per station
pub fn monthly_mean<K: CalendarKey>(table: &SeriesTable<K>) -> MonthlyTable {
    group_mean(table, |key| YearMonth::of(key.calendar_date()))
}

/// Mean across all stations for every key, as a single-column table
pub fn row_mean<K: CalendarKey>(table: &SeriesTable<K>, label: &str) -> SeriesTable<K> {
    let values = table.rows().map(mean_of).collect();
    SeriesTable::from_parts(
        table.index_name().to_string(),
        table.keys().to_vec(),
        vec![label.to_string()],
        vec![values],
    )
}

/// Year by month grid of one column of a monthly table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMonthPivot {
    pub label: String,
    pub years: Vec<i32>,
    /// One row per year, indexed by month - 1
    pub values: Vec<[Option<f64>; 12]>,
}

impl YearMonthPivot {
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = usize::try_from(month).ok()?.checked_sub(1)?;
        self.values[row].get(col).copied().flatten()
    }
}

/// Reshape one column of a monthly table into a year by month grid
pub fn year_month_pivot(table: &MonthlyTable, label: &str) -> Option<YearMonthPivot> {
    let column = table.column(label)?;
    let mut years: Vec<i32> = Vec::new();
    let mut values: Vec<[Option<f64>; 12]> = Vec::new();

    for (key, value) in table.keys().iter().zip(column) {
        if years.last() != Some(&key.year) {
            years.push(key.year);
            values.push([None; 12]);
        }
        let slot = values
            .last_mut()
            .and_then(|row| row.get_mut((key.month as usize).wrapping_sub(1)));
        if let Some(slot) = slot {
            *slot = *value;
        }
    }

    Some(YearMonthPivot {
        label: label.to_string(),
        years,
        values,
    })
}
