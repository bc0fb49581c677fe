//! Column selection, relabelling and row filtering

use super::aggregate::monthly_mean;
use crate::models::{CalendarKey, MonthlyTable, SeriesTable, mean_of};
use crate::stations::{ColumnMapping, StationDirectory};
use chrono::Datelike;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use tracing::debug;

/// Keep the columns whose label is in `codes`, in table order
pub fn select_stations<K, S>(table: &SeriesTable<K>, codes: &[S]) -> SeriesTable<K>
where
    K: Ord + Copy,
    S: AsRef<str>,
{
    let wanted: HashSet<&str> = codes.iter().map(AsRef::as_ref).collect();
    let positions: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, label)| wanted.contains(label.as_str()))
        .map(|(i, _)| i)
        .collect();

    if positions.len() < wanted.len() {
        debug!(
            "Selected {} of {} requested stations",
            positions.len(),
            wanted.len()
        );
    }
    table.select_positions(&positions)
}

/// Keep the stations located in any of `cities`
pub fn select_cities<K, S>(
    table: &SeriesTable<K>,
    directory: &StationDirectory,
    cities: &[S],
) -> SeriesTable<K>
where
    K: Ord + Copy,
    S: AsRef<str>,
{
    select_stations(table, &directory.stations_in_cities(cities))
}

/// Relabel columns through `mapping`; unmapped labels are kept
///
/// Two columns may end up with the same label. Apply
/// [`super::merge_duplicate_columns`] to resolve that.
pub fn rename_columns<K, M>(table: &SeriesTable<K>, mapping: &M) -> SeriesTable<K>
where
    K: Ord + Copy,
    M: ColumnMapping + ?Sized,
{
    let (index_name, keys, columns, values) = table.clone().into_parts();
    let columns = columns
        .into_iter()
        .map(|label| match mapping.map_label(&label) {
            Some(mapped) => mapped.to_string(),
            None => label,
        })
        .collect();
    SeriesTable::from_parts(index_name, keys, columns, values)
}

/// Drop every row with at least one missing value
pub fn drop_incomplete_rows<K: Ord + Copy>(table: &SeriesTable<K>) -> SeriesTable<K> {
    table.filter_rows(|_, row| row.iter().all(Option::is_some))
}

/// Keep rows whose calendar year lies in `years`
///
/// Removes the 00:00 reading that the midnight shift moves into the year
/// before a dataset's first day.
pub fn filter_years<K: CalendarKey>(
    table: &SeriesTable<K>,
    years: RangeInclusive<i32>,
) -> SeriesTable<K> {
    table.filter_rows(|key, _| years.contains(&key.calendar_date().year()))
}

/// Monthly mean per city over the given years, one column per city
///
/// Each city's value is the mean across its stations of their monthly
/// means. Cities without any station in the table are left out.
pub fn city_monthly_trend<K, S>(
    table: &SeriesTable<K>,
    directory: &StationDirectory,
    cities: &[S],
    years: RangeInclusive<i32>,
) -> MonthlyTable
where
    K: CalendarKey,
    S: AsRef<str>,
{
    let monthly = monthly_mean(&filter_years(table, years));
    let mut labels = Vec::new();
    let mut values = Vec::new();

    for city in cities {
        let city_table = select_cities(&monthly, directory, &[city.as_ref()]);
        if city_table.width() == 0 {
            debug!("No stations for city {} in table", city.as_ref());
            continue;
        }
        labels.push(city.as_ref().to_string());
        values.push(city_table.rows().map(mean_of).collect());
    }

    let (index_name, keys, _, _) = monthly.into_parts();
    SeriesTable::from_parts(index_name, keys, labels, values)
}
