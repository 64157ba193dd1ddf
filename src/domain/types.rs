//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and forecasting
//! - exported to JSON/CSV
//! - printed in the terminal report

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::Period;

/// Kernel family for the support vector regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    /// Radial basis function `exp(-gamma * |x - y|^2)`.
    Rbf,
    /// Plain dot product.
    Linear,
    /// `(gamma * <x, y> + coef0)^degree`.
    Poly,
}

impl KernelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            KernelKind::Rbf => "rbf",
            KernelKind::Linear => "linear",
            KernelKind::Poly => "poly",
        }
    }
}

/// Kernel coefficient setting.
///
/// `Scale` and `Auto` are resolved against the training inputs when the model
/// is fit:
///
/// - `Scale`: `1 / (n_features * var(X))`, falling back to `1.0` for a constant input
/// - `Auto`: `1 / n_features`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gamma {
    Scale,
    Auto,
    Value(f64),
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gamma::Scale => write!(f, "scale"),
            Gamma::Auto => write!(f, "auto"),
            Gamma::Value(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for Gamma {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scale" => Ok(Gamma::Scale),
            "auto" => Ok(Gamma::Auto),
            other => {
                let v: f64 = other
                    .parse()
                    .map_err(|_| format!("expected `scale`, `auto` or a positive number, got '{s}'"))?;
                if v.is_finite() && v > 0.0 {
                    Ok(Gamma::Value(v))
                } else {
                    Err(format!("gamma must be finite and > 0, got {v}"))
                }
            }
        }
    }
}

/// Hyperparameters for epsilon-SVR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvrParams {
    pub kernel: KernelKind,
    /// Regularization strength (`C`); larger values penalize tube violations more.
    pub c: f64,
    pub gamma: Gamma,
    /// Half-width of the no-penalty tube around each training target.
    pub epsilon: f64,
    /// Polynomial degree (poly kernel only).
    pub degree: u32,
    /// Independent term (poly kernel only).
    pub coef0: f64,
    /// Stopping tolerance on the maximal KKT violation.
    pub tol: f64,
    /// Hard cap on solver iterations.
    pub max_iter: usize,
}

impl Default for SvrParams {
    fn default() -> Self {
        Self {
            kernel: KernelKind::Rbf,
            c: 1.0,
            gamma: Gamma::Scale,
            epsilon: 0.1,
            degree: 3,
            coef0: 0.0,
            tol: 1e-3,
            max_iter: 10_000_000,
        }
    }
}

/// Names of the two required CSV columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub period: String,
    pub pe: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            period: "period".to_string(),
            pe: "pe".to_string(),
        }
    }
}

/// One historical record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub period: Period,
    /// Numeric time coordinate (`period.time()`).
    pub time: f64,
    pub pe: f64,
}

impl Observation {
    pub fn new(period: Period, pe: f64) -> Self {
        Self {
            period,
            time: period.time(),
            pe,
        }
    }
}

/// Summary stats about the loaded observations.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_obs: usize,
    pub first: Period,
    pub last: Period,
    pub pe_min: f64,
    pub pe_max: f64,
}

/// Chronologically ordered observations.
///
/// The constructor sorts by time coordinate (stable, so duplicate periods keep
/// their input order) and refuses empty input. There is no way to mutate a
/// dataset after construction; reloading builds a new one.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    observations: Vec<Observation>,
    stats: DatasetStats,
}

impl Dataset {
    pub fn new(source: impl Into<String>, mut observations: Vec<Observation>) -> Option<Self> {
        observations.sort_by(|a, b| a.time.total_cmp(&b.time));
        let stats = compute_stats(&observations)?;
        Some(Self {
            source: source.into(),
            observations,
            stats,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.time).collect()
    }

    pub fn pe_values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.pe).collect()
    }

    /// The chronologically last observation.
    pub fn last(&self) -> &Observation {
        // Non-empty by construction.
        &self.observations[self.observations.len() - 1]
    }
}

fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    let first = observations.first()?;
    let last = observations.last()?;

    let mut pe_min = f64::INFINITY;
    let mut pe_max = f64::NEG_INFINITY;
    for o in observations {
        pe_min = pe_min.min(o.pe);
        pe_max = pe_max.max(o.pe);
    }

    Some(DatasetStats {
        n_obs: observations.len(),
        first: first.period,
        last: last.period,
        pe_min,
        pe_max,
    })
}

/// A single forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodPrediction {
    pub period: String,
    pub time: f64,
    pub predicted_pe: f64,
}

/// Output of one forecast call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predictions: Vec<PeriodPrediction>,
    pub average_pe: f64,
    pub years_predicted: u32,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and environment).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub data_path: PathBuf,
    pub columns: ColumnNames,
    pub years: u32,
    pub svr: SvrParams,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub last_observed: String,
    pub params: SvrParams,
    pub forecast: ForecastResult,
}
