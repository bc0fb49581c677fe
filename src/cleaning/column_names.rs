//! Station label normalization.
//!
//! The same physical station is labelled differently across years
//! ("DsWrocWybCon-PM2.5-1g", " DsWrocWybCon", ...). Labels are reduced to the
//! bare station code so tables from different archives can be joined and
//! looked up in the station mapping.

use crate::config::ColumnCollision;
use crate::error::{GiosError, Result};
use crate::models::{SeriesTable, mean_of};
use std::collections::HashMap;
use tracing::debug;

/// Remove all whitespace and every known suffix, until nothing changes
pub fn normalize_label<S: AsRef<str>>(label: &str, suffixes: &[S]) -> String {
    let mut current: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    loop {
        let next = suffixes
            .iter()
            .fold(current.clone(), |acc, suffix| acc.replace(suffix.as_ref(), ""));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Copy of the table with every station label normalized
pub fn normalize_column_names<K: Ord + Copy, S: AsRef<str>>(
    table: &SeriesTable<K>,
    suffixes: &[S],
) -> SeriesTable<K> {
    let labels = table
        .columns()
        .iter()
        .map(|label| normalize_label(label, suffixes))
        .collect();
    let (index_name, keys, _, values) = table.clone().into_parts();
    SeriesTable::from_parts(index_name, keys, labels, values)
}

/// Resolve repeated labels into a single column each
///
/// Columns keep the position of their first occurrence. Under
/// `ColumnCollision::Mean` each row of a merged column is the mean of the
/// non-missing readings it collects.
pub fn merge_duplicate_columns<K: Ord + Copy>(
    table: &SeriesTable<K>,
    policy: ColumnCollision,
) -> Result<SeriesTable<K>> {
    if table.has_unique_columns() {
        return Ok(table.clone());
    }

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (position, label) in table.columns().iter().enumerate() {
        match index.get(label.as_str()) {
            Some(&group) => {
                if policy == ColumnCollision::Reject {
                    return Err(GiosError::DuplicateColumn {
                        label: label.clone(),
                    });
                }
                groups[group].1.push(position);
            }
            None => {
                index.insert(label, groups.len());
                groups.push((label.clone(), vec![position]));
            }
        }
    }

    let mut labels = Vec::with_capacity(groups.len());
    let mut values = Vec::with_capacity(groups.len());
    for (label, positions) in groups {
        if positions.len() > 1 {
            debug!("Merging {} columns labelled '{}'", positions.len(), label);
        }
        let merged = (0..table.height())
            .map(|row| mean_of(positions.iter().map(|&col| table.value(row, col))))
            .collect();
        labels.push(label);
        values.push(merged);
    }

    Ok(SeriesTable::from_parts(
        table.index_name().to_string(),
        table.keys().to_vec(),
        labels,
        values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MEASUREMENT_SUFFIXES;
    use chrono::NaiveDate;

    fn table(labels: &[&str], values: Vec<Vec<Option<f64>>>) -> SeriesTable<NaiveDate> {
        let keys = (1..=values.first().map_or(0, Vec::len) as u32)
            .map(|d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap())
            .collect();
        SeriesTable::new(
            "Data",
            keys,
            labels.iter().map(|s| s.to_string()).collect(),
            values,
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_label_strips_suffix_and_spaces() {
        assert_eq!(
            normalize_label(" DsWrocWybCon-PM2.5-1g ", MEASUREMENT_SUFFIXES),
            "DsWrocWybCon"
        );
        assert_eq!(normalize_label("Mp Krak Bulwar", MEASUREMENT_SUFFIXES), "MpKrakBulwar");
    }

    #[test]
    fn test_normalize_label_reaches_fixed_point() {
        // Removing spaces or one suffix can expose another suffix
        for label in ["S1-PM2.5- 1g", "S1-PM2.5-PM2.5-1g-1g", "S1 -PM10-1g"] {
            let once = normalize_label(label, MEASUREMENT_SUFFIXES);
            assert_eq!(once, "S1", "{label}");
            assert_eq!(normalize_label(&once, MEASUREMENT_SUFFIXES), once);
        }
    }

    #[test]
    fn test_normalize_column_names_is_idempotent() {
        let t = table(
            &["A-PM2.5-1g", " B ", "C D"],
            vec![vec![Some(1.0)], vec![Some(2.0)], vec![None]],
        );
        let once = normalize_column_names(&t, MEASUREMENT_SUFFIXES);
        let twice = normalize_column_names(&once, MEASUREMENT_SUFFIXES);
        assert_eq!(once, twice);
        assert_eq!(once.columns(), &["A", "B", "CD"]);
    }

    #[test]
    fn test_merge_rejects_collisions_by_default() {
        let t = table(&["S1", "S1"], vec![vec![Some(1.0)], vec![Some(3.0)]]);
        assert!(matches!(
            merge_duplicate_columns(&t, ColumnCollision::Reject),
            Err(GiosError::DuplicateColumn { label }) if label == "S1"
        ));
    }

    #[test]
    fn test_merge_mean_collapses_columns() {
        let t = table(
            &["S1", "S2", "S1"],
            vec![
                vec![Some(1.0), None],
                vec![Some(9.0), Some(9.0)],
                vec![Some(3.0), Some(4.0)],
            ],
        );
        let merged = merge_duplicate_columns(&t, ColumnCollision::Mean).unwrap();
        assert_eq!(merged.columns(), &["S1", "S2"]);
        assert_eq!(merged.column("S1").unwrap(), &[Some(2.0), Some(4.0)]);
    }
}
