//! Loading raw archive sheets from disk.
//!
//! Spreadsheets go through `calamine`, CSV exports through `csv`. Both end
//! up as a [`RawTable`] whose cell positions match the source sheet, so the
//! layout detector sees the same grid regardless of file type.

use crate::constants::DELIMITER_SNIFF_LINES;
use crate::error::{GiosError, Result};
use crate::models::{Cell, RawTable};
use calamine::{Data, Range, Reader, open_workbook_auto};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

static YEAR_IN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").unwrap());

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Source of raw archive tables for a given year
///
/// Implementations own retries and caching. The cleaning core only ever
/// sees a fully loaded table or an error.
pub trait ArchiveFetcher {
    fn fetch(&self, year: i32, archive_id: &str) -> Result<RawTable>;
}

/// Archives unpacked on disk as `root/<year>/<archive_id>`
#[derive(Debug, Clone)]
pub struct LocalArchive {
    root: PathBuf,
    sheet: Option<String>,
}

impl LocalArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sheet: None,
        }
    }

    /// Read a named worksheet instead of the first one
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn path_for(&self, year: i32, archive_id: &str) -> PathBuf {
        self.root.join(year.to_string()).join(archive_id)
    }
}

impl ArchiveFetcher for LocalArchive {
    fn fetch(&self, year: i32, archive_id: &str) -> Result<RawTable> {
        read_raw_table(&self.path_for(year, archive_id), self.sheet.as_deref())
    }
}

/// Load a spreadsheet or CSV file into a raw table
pub fn read_raw_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    match extension_of(path).as_deref() {
        Some("csv") | Some("txt") => read_csv(path),
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext) => read_spreadsheet(path, sheet),
        _ => Err(GiosError::UnsupportedSource {
            path: path.to_path_buf(),
        }),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether `path` has an extension `read_raw_table` understands
pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| {
        ext == "csv" || ext == "txt" || SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
    })
}

fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match sheet {
        Some(name) => workbook.worksheet_range(name)?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| GiosError::InvalidTable {
                reason: format!("workbook {} has no worksheets", path.display()),
            })??,
    };

    let table = range_to_table(&range);
    debug!(
        "Loaded {} rows x {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

/// Convert a worksheet range, padding so cell (0, 0) is the sheet's A1
fn range_to_table(range: &Range<Data>) -> RawTable {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }
    RawTable::new(rows)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Cell::DateTime(datetime),
            None => Cell::Number(dt.as_f64()),
        },
    }
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let delimiter = sniff_delimiter(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| Cell::text(String::from_utf8_lossy(field)))
                .collect(),
        );
    }

    debug!(
        "Loaded {} CSV rows from {} (delimiter {:?})",
        rows.len(),
        path.display(),
        delimiter as char
    );
    Ok(RawTable::new(rows))
}

/// Pick `;` or `,` by counting unquoted occurrences over the first few
/// non-empty lines
fn sniff_delimiter(path: &Path) -> Result<u8> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    let (mut semicolons, mut commas) = (0, 0);
    // Quoted fields may span lines
    let mut quoted = false;
    let mut inspected = 0;

    while inspected < DELIMITER_SNIFF_LINES {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        inspected += 1;

        for &byte in &line {
            match byte {
                b'"' => quoted = !quoted,
                b';' if !quoted => semicolons += 1,
                b',' if !quoted => commas += 1,
                _ => {}
            }
        }
    }

    Ok(if semicolons > commas { b';' } else { b',' })
}

/// Archive year embedded in a file name, e.g. `2016_PM25_1g.xlsx`
pub fn year_from_path(path: &Path) -> Option<i32> {
    let name = path.file_name()?.to_str()?;
    YEAR_IN_NAME
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Expand files and directories into a sorted list of loadable files
pub fn discover_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_supported(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            if !is_supported(input) {
                return Err(GiosError::UnsupportedSource {
                    path: input.clone(),
                });
            }
            files.push(input.clone());
        } else {
            return Err(GiosError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )));
        }
    }

    files.sort();
    files.dedup();
    debug!("Discovered {} source files", files.len());
    Ok(files)
}
