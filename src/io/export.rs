//! Export forecast results.
//!
//! - CSV: one row per forecast quarter, easy to consume in spreadsheets
//! - JSON: the full result plus run metadata (see `domain::ForecastFile`)

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Dataset, ForecastFile, ForecastResult, SvrParams};
use crate::error::{ForecastError, Result};

/// Write `period,time,predicted_pe` rows.
pub fn write_forecast_csv(path: &Path, result: &ForecastResult) -> Result<()> {
    let file = create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for p in &result.predictions {
        writer.serialize(p)?;
    }
    writer.flush()?;
    Ok(())
}

/// Build the JSON document for a forecast run.
pub fn forecast_file(dataset: &Dataset, params: &SvrParams, result: &ForecastResult) -> ForecastFile {
    ForecastFile {
        tool: "pe".to_string(),
        generated_at: Utc::now(),
        source: dataset.source().to_string(),
        last_observed: dataset.last().period.to_string(),
        params: *params,
        forecast: result.clone(),
    }
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, file: &ForecastFile) -> Result<()> {
    let out = create(path)?;
    serde_json::to_writer_pretty(out, file)?;
    Ok(())
}

/// Read a forecast JSON file written by [`write_forecast_json`].
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile> {
    let file = File::open(path).map_err(|e| with_path(e, "open", path))?;
    Ok(serde_json::from_reader(file)?)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| with_path(e, "create", path))
}

fn with_path(e: std::io::Error, action: &str, path: &Path) -> ForecastError {
    ForecastError::Io(std::io::Error::new(
        e.kind(),
        format!("failed to {action} '{}': {e}", path.display()),
    ))
}
