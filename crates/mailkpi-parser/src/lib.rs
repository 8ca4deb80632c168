//! # mailkpi-parser
//!
//! Loader for the semicolon-delimited correspondence export.
//!
//! This crate provides:
//! - Header validation against the expected column set (missing columns
//!   are a fatal input error, never silently recovered)
//! - Month-first/ISO date parsing that degrades per field to an absent
//!   value, never an error
//! - Verbatim pass-through of any columns beyond the expected set
//!
//! ## Example
//!
//! ```rust
//! use mailkpi_parser::load_records;
//!
//! let input = "\
//! FECHA RADICACION;FECHA RECIBIDO CORRESPONDENCIA;MEDIO DE ENVIO;DEPENDENCIA QUE ENVIA;MES;OBSERVACIÓN
//! 2024-05-02;2024-05-03;Courier;4 GRUPO CENTRO DE EXCELENCIA;MAYO;
//! ";
//!
//! let table = load_records(input.as_bytes()).unwrap();
//! assert_eq!(table.records.len(), 1);
//! assert_eq!(table.records[0].channel, "Courier");
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use mailkpi_core::{Record, RecordSet, EXPECTED_COLUMNS};
use std::path::Path;
use thiserror::Error;

/// Loading error
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing expected columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Date formats accepted by the loader, tried in order. Month-first and
/// ISO-like only; day-first inputs are not supported.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];

/// Parse a date cell, tolerating a trailing time-of-day (truncated).
///
/// Empty or unparseable cells become `None`; a per-field failure is a
/// recovered condition, not an error.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return Some(date);
        }
        let with_time = format!("{format} %H:%M:%S");
        if let Ok(stamp) = NaiveDateTime::parse_from_str(cell, &with_time) {
            return Some(stamp.date());
        }
    }
    None
}

/// Load a record set from raw bytes (semicolon-delimited, UTF-8, optional
/// leading BOM).
pub fn load_records(input: &[u8]) -> Result<RecordSet, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(strip_bom(input));

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(columns.record_from_row(&row));
    }

    Ok(RecordSet { records, extra_columns: columns.extra_names(&headers) })
}

/// Load a record set from a file path
pub fn load_file(path: &Path) -> Result<RecordSet, LoadError> {
    let bytes = std::fs::read(path)?;
    load_records(&bytes)
}

fn strip_bom(input: &[u8]) -> &[u8] {
    input.strip_prefix(b"\xef\xbb\xbf").unwrap_or(input)
}

/// Header positions of the expected columns plus the pass-through rest
struct ColumnIndex {
    filed: usize,
    received: usize,
    channel: usize,
    department: usize,
    month: usize,
    observation: usize,
    extra: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let expected: Vec<usize> = EXPECTED_COLUMNS
            .iter()
            .filter_map(|name| position(name))
            .collect();
        let extra = (0..headers.len()).filter(|i| !expected.contains(i)).collect();

        Ok(Self {
            filed: expected[0],
            received: expected[1],
            channel: expected[2],
            department: expected[3],
            month: expected[4],
            observation: expected[5],
            extra,
        })
    }

    fn record_from_row(&self, row: &csv::StringRecord) -> Record {
        let cell = |i: usize| row.get(i).unwrap_or("").to_string();

        let mut record = Record::new()
            .channel(cell(self.channel))
            .department(cell(self.department))
            .month(cell(self.month))
            .observation(cell(self.observation));
        record.filed = parse_date(&cell(self.filed));
        record.received = parse_date(&cell(self.received));
        record.extra = self.extra.iter().map(|&i| cell(i)).collect();
        record
    }

    fn extra_names(&self, headers: &[String]) -> Vec<String> {
        self.extra.iter().map(|&i| headers[i].clone()).collect()
    }
}
