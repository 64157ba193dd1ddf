//! CSV ingest and validation.
//!
//! This module turns a quarterly CSV export into a chronologically sorted
//! [`Dataset`].
//!
//! Design goals:
//! - **Strict schema** for the two required columns (every missing column is reported)
//! - **Fail fast** on the first bad period or PE cell, with its line number
//! - **Deterministic behavior** (stable sort, duplicates kept in input order)
//! - **Separation of concerns**: no scaling or fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use crate::domain::{ColumnNames, Dataset, Observation, Period};
use crate::error::{ForecastError, Result};

/// Load observations from a CSV file on disk.
pub fn load_dataset(path: &Path, columns: &ColumnNames) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| {
        ForecastError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open CSV '{}': {e}", path.display()),
        ))
    })?;
    load_dataset_from_reader(file, &path.display().to_string(), columns)
}

/// Load observations from any CSV reader; `source` is only used for messages.
pub fn load_dataset_from_reader<R: Read>(reader: R, source: &str, columns: &ColumnNames) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let period_key = normalize_header_name(&columns.period);
    let pe_key = normalize_header_name(&columns.pe);
    ensure_required_columns_exist(&header_map, &[(&period_key, &columns.period), (&pe_key, &columns.pe)])?;
    let period_idx = header_map[&period_key];
    let pe_idx = header_map[&pe_key];

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result?;

        let raw_period = record.get(period_idx).unwrap_or("");
        let period = Period::parse(raw_period).map_err(|_| ForecastError::Parse {
            input: raw_period.to_string(),
            line: Some(line),
        })?;

        let raw_pe = record.get(pe_idx).unwrap_or("");
        let pe = parse_finite(raw_pe).ok_or_else(|| ForecastError::InvalidValue {
            line,
            column: columns.pe.clone(),
            value: raw_pe.to_string(),
        })?;

        observations.push(Observation::new(period, pe));
    }

    let dataset = Dataset::new(source, observations).ok_or_else(|| ForecastError::EmptyDataset {
        source_name: source.to_string(),
    })?;

    let stats = dataset.stats();
    debug!(
        "loaded {} observations from '{}' ({} .. {})",
        stats.n_obs, source, stats.first, stats.last
    );
    Ok(dataset)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// `required` pairs each normalized lookup key with the name as configured.
fn ensure_required_columns_exist(header_map: &HashMap<String, usize>, required: &[(&String, &String)]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|(key, _)| !header_map.contains_key(*key))
        .map(|(_, name)| (*name).clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ForecastError::Schema { missing })
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
