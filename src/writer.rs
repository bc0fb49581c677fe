//! Persisting cleaned tables and station metadata.
//!
//! A saved dataset is a directory holding `database.parquet` (timestamp
//! column plus one `f64` column per station), an optional `database.csv`
//! copy, and `metadata.json` with the station records and code mappings.

use crate::config::WriterConfig;
use crate::constants::{DATABASE_CSV_FILENAME, DATABASE_PARQUET_FILENAME, METADATA_FILENAME};
use crate::error::{GiosError, Result};
use crate::models::CanonicalTable;
use crate::stations::{StationCodeMapping, StationDirectory, StationRecord};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Contents of `metadata.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub index: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub stations: Vec<StationRecord>,
    pub code_mapping: StationCodeMapping,
}

/// Paths written by [`save_local`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub database: PathBuf,
    pub csv: Option<PathBuf>,
    pub metadata: PathBuf,
}

/// Convert a canonical table into a polars frame
pub fn to_dataframe(table: &CanonicalTable) -> Result<DataFrame> {
    if !table.has_unique_columns() {
        let mut seen = std::collections::HashSet::new();
        let label = table
            .columns()
            .iter()
            .find(|c| !seen.insert(c.as_str()))
            .cloned()
            .unwrap_or_default();
        return Err(GiosError::DuplicateColumn { label });
    }

    let millis: Vec<i64> = table
        .keys()
        .iter()
        .map(|ts| ts.and_utc().timestamp_millis())
        .collect();
    let index = Series::new(table.index_name().into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut columns = Vec::with_capacity(table.width() + 1);
    columns.push(index.into_column());
    for station in table.stations() {
        columns.push(Series::new(station.label.into(), station.values).into_column());
    }

    Ok(DataFrame::new(columns)?)
}

/// Rebuild a canonical table from a frame written by [`to_dataframe`]
pub fn from_dataframe(df: &DataFrame) -> Result<CanonicalTable> {
    let mut names = df.get_column_names().into_iter().map(|n| n.to_string());
    let index_name = names.next().ok_or_else(|| GiosError::InvalidTable {
        reason: "frame has no columns".to_string(),
    })?;

    let millis = df.column(&index_name)?.cast(&DataType::Int64)?;
    let keys = millis
        .i64()?
        .into_iter()
        .map(|ms| {
            ms.and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| GiosError::InvalidTable {
                    reason: format!("null or out-of-range value in '{index_name}'"),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut labels = Vec::new();
    let mut values = Vec::new();
    for name in names {
        let column = df.column(&name)?.cast(&DataType::Float64)?;
        values.push(column.f64()?.into_iter().collect());
        labels.push(name);
    }

    CanonicalTable::new(index_name, keys, labels, values)
}

/// Write the cleaned table and station metadata into `dir`
pub fn save_local(
    dir: &Path,
    table: &CanonicalTable,
    directory: &StationDirectory,
    config: &WriterConfig,
) -> Result<SavedArtifacts> {
    fs::create_dir_all(dir)?;
    let mut df = to_dataframe(table)?;

    let database = dir.join(DATABASE_PARQUET_FILENAME);
    ParquetWriter::new(File::create(&database)?)
        .with_compression(config.compression.to_polars_compression())
        .with_statistics(StatisticsOptions::default())
        .finish(&mut df)?;
    debug!("Wrote {} rows to {}", df.height(), database.display());

    let csv = if config.write_csv {
        let path = dir.join(DATABASE_CSV_FILENAME);
        let mut file = BufWriter::new(File::create(&path)?);
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Some(path)
    } else {
        None
    };

    let metadata_path = dir.join(METADATA_FILENAME);
    let metadata = DatasetMetadata {
        index: table.index_name().to_string(),
        rows: table.height(),
        columns: table.columns().to_vec(),
        first_timestamp: table.keys().first().copied(),
        last_timestamp: table.keys().last().copied(),
        stations: directory.records().to_vec(),
        code_mapping: directory.code_mapping().clone(),
    };
    serde_json::to_writer_pretty(BufWriter::new(File::create(&metadata_path)?), &metadata)?;

    info!(
        "Saved {} rows x {} stations to {}",
        table.height(),
        table.width(),
        dir.display()
    );

    Ok(SavedArtifacts {
        database,
        csv,
        metadata: metadata_path,
    })
}

/// Read back a directory written by [`save_local`]
pub fn load_local(dir: &Path) -> Result<(CanonicalTable, StationDirectory)> {
    let df = ParquetReader::new(File::open(dir.join(DATABASE_PARQUET_FILENAME))?).finish()?;
    let table = from_dataframe(&df)?;

    let metadata: DatasetMetadata =
        serde_json::from_reader(BufReader::new(File::open(dir.join(METADATA_FILENAME))?))?;
    let directory = StationDirectory::from_records(metadata.stations);

    Ok((table, directory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressionAlgorithm;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_table() -> CanonicalTable {
        CanonicalTable::new(
            "Data",
            vec![at(1, 0), at(1, 1), at(1, 2)],
            vec!["S1".to_string(), "S2".to_string()],
            vec![
                vec![Some(7.0), Some(5.0), None],
                vec![Some(1.0), None, Some(2.5)],
            ],
        )
        .unwrap()
    }

    fn sample_directory() -> StationDirectory {
        StationDirectory::from_records(vec![StationRecord {
            current_code: "S1".to_string(),
            legacy_codes: vec!["OLD1".to_string()],
            region: Some("MAZOWIECKIE".to_string()),
            city: Some("Warszawa".to_string()),
        }])
    }

    #[test]
    fn test_to_dataframe_schema() {
        let df = to_dataframe(&sample_table()).unwrap();

        assert_eq!(df.shape(), (3, 3));
        assert_eq!(
            df.column("Data").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(df.column("S1").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("S2").unwrap().null_count(), 1);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let table = sample_table()
            .with_labels(vec!["S1".to_string(), "S1".to_string()])
            .unwrap();
        assert!(matches!(
            to_dataframe(&table),
            Err(GiosError::DuplicateColumn { .. })
        ));
    }

    /// Test writing every artifact and reading the dataset back
    ///
    /// Purpose: Validate the on-disk layout of a saved dataset
    /// Benefit: Saved data can be reloaded without re-cleaning the archives
    #[test]
    fn test_save_and_load_local() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dataset");
        let config = WriterConfig {
            compression: CompressionAlgorithm::Zstd,
            write_csv: true,
        };

        let saved = save_local(&out, &sample_table(), &sample_directory(), &config).unwrap();
        assert!(saved.database.exists());
        assert!(saved.csv.as_ref().is_some_and(|p| p.exists()));
        assert!(saved.metadata.exists());

        let json = fs::read_to_string(&saved.metadata).unwrap();
        assert!(json.contains("\"OLD1\""));
        assert!(json.contains("\"rows\": 3"));

        let (table, directory) = load_local(&out).unwrap();
        assert_eq!(table, sample_table());
        assert_eq!(directory.code_mapping().get("OLD1"), Some("S1"));
    }

    #[test]
    fn test_csv_copy_is_optional() {
        let temp_dir = TempDir::new().unwrap();
        let saved = save_local(
            temp_dir.path(),
            &sample_table(),
            &StationDirectory::default(),
            &WriterConfig::default(),
        )
        .unwrap();
        assert!(saved.csv.is_none());
        assert!(!temp_dir.path().join(DATABASE_CSV_FILENAME).exists());
    }
}
