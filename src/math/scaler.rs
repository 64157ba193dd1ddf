//! Standardization (zero mean, unit variance).
//!
//! A [`StandardScaler`] learns a mean and population standard deviation from
//! training data and then maps values to and from the standardized scale:
//!
//! ```text
//! scaled = (raw - mean) / std
//! raw    = scaled * std + mean
//! ```
//!
//! Zero-variance columns use `std = 1.0`, so a constant input standardizes to
//! all zeros and the inverse returns the constant.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Fitted statistics of a scaler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub mean: f64,
    /// Population standard deviation (`1.0` if the data had zero variance).
    pub std: f64,
}

/// A single-column standard scaler.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    params: Option<ScaleParams>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn mean and standard deviation from `data`.
    ///
    /// Fails if the scaler is already fitted (call [`reset`](Self::reset)
    /// first) or if `data` is empty.
    pub fn fit(&mut self, data: &[f64]) -> Result<ScaleParams> {
        if self.params.is_some() {
            return Err(ForecastError::ScalerAlreadyFitted);
        }
        if data.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "cannot fit a scaler on an empty column".to_string(),
            ));
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        let std = if std > f64::EPSILON * mean.abs().max(1.0) { std } else { 1.0 };

        let params = ScaleParams { mean, std };
        self.params = Some(params);
        Ok(params)
    }

    /// Fit on `data` and return it standardized.
    pub fn fit_transform(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        self.fit(data)?;
        self.transform_all(data)
    }

    pub fn transform(&self, x: f64) -> Result<f64> {
        let p = self.params()?;
        Ok((x - p.mean) / p.std)
    }

    pub fn inverse_transform(&self, z: f64) -> Result<f64> {
        let p = self.params()?;
        Ok(z * p.std + p.mean)
    }

    pub fn transform_all(&self, data: &[f64]) -> Result<Vec<f64>> {
        let p = self.params()?;
        Ok(data.iter().map(|&x| (x - p.mean) / p.std).collect())
    }

    pub fn inverse_transform_all(&self, data: &[f64]) -> Result<Vec<f64>> {
        let p = self.params()?;
        Ok(data.iter().map(|&z| z * p.std + p.mean).collect())
    }

    pub fn params(&self) -> Result<ScaleParams> {
        self.params.ok_or(ForecastError::ScalerNotFitted)
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    /// Forget the fitted statistics.
    pub fn reset(&mut self) {
        self.params = None;
    }
}

static NEXT_SCALING_ID: AtomicU64 = AtomicU64::new(1);

/// The pair of scalers fitted during feature preparation.
///
/// Every instance gets a process-unique id. Training sets and trained models
/// record the id they were produced with, which lets the forecaster reject a
/// model paired with somebody else's scalers. The scalers are only reachable
/// by shared reference, so a state can never be refitted under the same id.
#[derive(Debug, Clone)]
pub struct ScalingState {
    id: u64,
    time: StandardScaler,
    pe: StandardScaler,
}

impl ScalingState {
    /// Fit both scalers; every call yields a new id.
    pub fn fit(times: &[f64], pe_values: &[f64]) -> Result<Self> {
        let mut time = StandardScaler::new();
        let mut pe = StandardScaler::new();
        time.fit(times)?;
        pe.fit(pe_values)?;

        Ok(Self {
            id: NEXT_SCALING_ID.fetch_add(1, Ordering::Relaxed),
            time,
            pe,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn time(&self) -> &StandardScaler {
        &self.time
    }

    pub fn pe(&self) -> &StandardScaler {
        &self.pe
    }
}
