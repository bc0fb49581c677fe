//! Station metadata and code mappings.
//!
//! Station codes change over the years; the agency's metadata sheet lists
//! each station's current code, its former codes, its voivodeship and its
//! city. [`StationDirectory`] is built once from that sheet and then only
//! read. Rebuilding means constructing a new directory, never mutating one
//! that is in use.

use crate::cleaning::normalize_label;
use crate::cleaning::header::cell_matches;
use crate::config::MetadataColumns;
use crate::error::{GiosError, Result};
use crate::models::RawTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

const NO_SUFFIXES: &[&str] = &[];

/// Lookup from a column label to a replacement label
pub trait ColumnMapping {
    fn map_label(&self, label: &str) -> Option<&str>;
}

impl ColumnMapping for BTreeMap<String, String> {
    fn map_label(&self, label: &str) -> Option<&str> {
        self.get(label).map(String::as_str)
    }
}

impl ColumnMapping for std::collections::HashMap<String, String> {
    fn map_label(&self, label: &str) -> Option<&str> {
        self.get(label).map(String::as_str)
    }
}

/// One row of the station metadata sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    pub current_code: String,
    pub legacy_codes: Vec<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Legacy or current station code to current code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationCodeMapping {
    codes: BTreeMap<String, String>,
}

impl StationCodeMapping {
    pub fn get(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// Current code for `code`, or `code` itself when unknown
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ColumnMapping for StationCodeMapping {
    fn map_label(&self, label: &str) -> Option<&str> {
        self.get(label)
    }
}

/// Current station code to voivodeship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMapping {
    regions: BTreeMap<String, String>,
}

impl RegionMapping {
    pub fn get(&self, code: &str) -> Option<&str> {
        self.regions.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Distinct region names in sorted order
    pub fn regions(&self) -> BTreeSet<&str> {
        self.regions.values().map(String::as_str).collect()
    }
}

impl ColumnMapping for RegionMapping {
    fn map_label(&self, label: &str) -> Option<&str> {
        self.get(label)
    }
}

/// Station metadata with its derived lookups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationDirectory {
    records: Vec<StationRecord>,
    codes: StationCodeMapping,
    regions: RegionMapping,
}

impl StationDirectory {
    /// Build the directory from a metadata sheet whose first row holds labels
    pub fn from_raw(raw: &RawTable, columns: &MetadataColumns) -> Result<Self> {
        let header = raw.row(0).unwrap_or(&[]);
        let exact = |name: &str| header.iter().position(|cell| cell_matches(cell, name));

        let current_col = exact(&columns.current_code).ok_or_else(|| GiosError::MissingColumn {
            column: columns.current_code.clone(),
        })?;
        let legacy_col = header
            .iter()
            .position(|cell| {
                cell.as_label()
                    .is_some_and(|label| label.contains(columns.legacy_codes.as_str()))
            })
            .ok_or_else(|| GiosError::MissingColumn {
                column: columns.legacy_codes.clone(),
            })?;
        let region_col = exact(&columns.region).ok_or_else(|| GiosError::MissingColumn {
            column: columns.region.clone(),
        })?;
        let city_col = exact(&columns.city);

        let records = (1..raw.height())
            .filter_map(|row| {
                let current_code = raw
                    .cell(row, current_col)
                    .as_label()
                    .map(|code| normalize_label(&code, NO_SUFFIXES))?;
                let legacy_codes = raw
                    .cell(row, legacy_col)
                    .as_label()
                    .map(|codes| split_codes(&codes))
                    .unwrap_or_default();
                Some(StationRecord {
                    current_code,
                    legacy_codes,
                    region: raw.cell(row, region_col).as_label(),
                    city: city_col.and_then(|col| raw.cell(row, col).as_label()),
                })
            })
            .collect();

        Ok(Self::from_records(records))
    }

    /// Build the directory from already-parsed records
    pub fn from_records(records: Vec<StationRecord>) -> Self {
        let mut codes = BTreeMap::new();
        let mut regions = BTreeMap::new();

        for record in &records {
            codes.insert(record.current_code.clone(), record.current_code.clone());
            if let Some(region) = &record.region {
                regions.insert(record.current_code.clone(), region.clone());
            }
        }

        for record in &records {
            for legacy in &record.legacy_codes {
                match codes.get(legacy) {
                    Some(existing) if existing != &record.current_code => {
                        warn!(
                            "Station code {} already maps to {}; ignoring mapping to {}",
                            legacy, existing, record.current_code
                        );
                    }
                    Some(_) => {}
                    None => {
                        codes.insert(legacy.clone(), record.current_code.clone());
                    }
                }
            }
        }

        debug!(
            "Station directory: {} stations, {} code mappings, {} regions",
            records.len(),
            codes.len(),
            regions.len()
        );

        Self {
            records,
            codes: StationCodeMapping { codes },
            regions: RegionMapping { regions },
        }
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn code_mapping(&self) -> &StationCodeMapping {
        &self.codes
    }

    pub fn region_mapping(&self) -> &RegionMapping {
        &self.regions
    }

    pub fn record(&self, current_code: &str) -> Option<&StationRecord> {
        self.records.iter().find(|r| r.current_code == current_code)
    }

    /// Current codes of stations located in any of `cities`
    pub fn stations_in_cities<S: AsRef<str>>(&self, cities: &[S]) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| {
                r.city
                    .as_deref()
                    .is_some_and(|city| cities.iter().any(|c| c.as_ref() == city))
            })
            .map(|r| r.current_code.as_str())
            .collect()
    }

    /// Distinct cities of the given station codes, sorted
    pub fn cities_of<S: AsRef<str>>(&self, codes: &[S]) -> Vec<&str> {
        let wanted: BTreeSet<&str> = codes.iter().map(AsRef::as_ref).collect();
        self.records
            .iter()
            .filter(|r| wanted.contains(r.current_code.as_str()))
            .filter_map(|r| r.city.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Split a comma-separated list of legacy codes
fn split_codes(codes: &str) -> Vec<String> {
    codes
        .split(',')
        .map(|code| normalize_label(code, NO_SUFFIXES))
        .filter(|code| !code.is_empty())
        .collect()
}
