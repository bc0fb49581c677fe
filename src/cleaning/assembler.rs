//! Canonical table assembly.
//!
//! Keys the coerced rows by their shifted timestamp, sorts them, drops rows
//! with no readings at all and resolves duplicate keys according to the
//! configured policy. Also joins per-year tables into one.

use crate::config::DuplicatePolicy;
use crate::constants::TIMESTAMP_COLUMN;
use crate::error::{GiosError, Result};
use crate::models::{CanonicalTable, mean_of};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::debug;

/// Counts collected while assembling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub empty_rows_dropped: usize,
    pub duplicates_merged: usize,
}

/// One row awaiting collapse, with the raw-table row it came from if known
struct KeyedRow {
    key: NaiveDateTime,
    source_row: Option<usize>,
    values: Vec<Option<f64>>,
}

/// Build the canonical table from row-major values
///
/// `source_rows` gives the raw-table row of each entry and is only used to
/// point at the offending rows when a duplicate key is rejected.
pub fn assemble(
    labels: Vec<String>,
    timestamps: Vec<NaiveDateTime>,
    rows: Vec<Vec<Option<f64>>>,
    source_rows: Vec<usize>,
    policy: DuplicatePolicy,
) -> Result<(CanonicalTable, AssemblyStats)> {
    let mut sources = source_rows.into_iter();
    let keyed = timestamps
        .into_iter()
        .zip(rows)
        .map(|(key, values)| KeyedRow {
            key,
            source_row: sources.next(),
            values,
        })
        .collect();
    collapse(labels, keyed, policy)
}

/// Join several canonical tables on their keys
///
/// Columns are the union of all labels in first-seen order; stations absent
/// from a table read as missing there. Keys present in more than one table
/// go through the same duplicate policy as within a single table.
pub fn combine(tables: &[CanonicalTable], policy: DuplicatePolicy) -> Result<CanonicalTable> {
    let mut labels: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in tables {
        for label in table.columns() {
            if !positions.contains_key(label) {
                positions.insert(label.clone(), labels.len());
                labels.push(label.clone());
            }
        }
    }

    let mut keyed = Vec::with_capacity(tables.iter().map(|t| t.height()).sum());
    for table in tables {
        let targets: Vec<usize> = table.columns().iter().map(|l| positions[l]).collect();
        for (row, key) in table.keys().iter().enumerate() {
            let mut values = vec![None; labels.len()];
            for (col, &target) in targets.iter().enumerate() {
                values[target] = table.value(row, col);
            }
            keyed.push(KeyedRow {
                key: *key,
                source_row: None,
                values,
            });
        }
    }

    let (combined, stats) = collapse(labels, keyed, policy)?;
    debug!(
        "Combined {} tables into {} rows ({} duplicate keys merged)",
        tables.len(),
        combined.height(),
        stats.duplicates_merged
    );
    Ok(combined)
}

fn collapse(
    labels: Vec<String>,
    mut keyed: Vec<KeyedRow>,
    policy: DuplicatePolicy,
) -> Result<(CanonicalTable, AssemblyStats)> {
    let mut stats = AssemblyStats::default();

    let before = keyed.len();
    keyed.retain(|row| row.values.iter().any(Option::is_some));
    stats.empty_rows_dropped = before - keyed.len();

    // Stable: equal keys keep their source order
    keyed.sort_by_key(|row| row.key);

    let mut keys = Vec::with_capacity(keyed.len());
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(keyed.len()); labels.len()];

    let mut start = 0;
    while start < keyed.len() {
        let key = keyed[start].key;
        let end = start + keyed[start..].iter().take_while(|row| row.key == key).count();
        let group = &keyed[start..end];

        if group.len() > 1 {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(GiosError::DuplicateTimestamp {
                        timestamp: key,
                        count: group.len(),
                        source_rows: group.iter().filter_map(|row| row.source_row).collect(),
                    });
                }
                DuplicatePolicy::Mean => stats.duplicates_merged += group.len() - 1,
            }
        }

        keys.push(key);
        for (col, column) in columns.iter_mut().enumerate() {
            column.push(mean_of(group.iter().map(|row| row.values[col])));
        }
        start = end;
    }

    let table = CanonicalTable::from_parts(TIMESTAMP_COLUMN.to_string(), keys, labels, columns);
    Ok((table, stats))
}
