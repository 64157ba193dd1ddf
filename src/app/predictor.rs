//! Stateful, staged PE predictor.
//!
//! `PePredictor` drives the four stages one call at a time:
//!
//! ```text
//! load_data -> prepare_data -> train_model -> predict_future_pe
//! ```
//!
//! Each stage checks that its prerequisite exists before touching any state,
//! and loading new data discards everything derived from the previous dataset.

use std::io::Read;
use std::path::Path;

use crate::domain::{ColumnNames, Dataset, ForecastResult, SvrParams};
use crate::error::{ForecastError, Result};
use crate::fit::{TrainingSet, fit_svr, prepare};
use crate::forecast::forecast;
use crate::io::ingest::{load_dataset, load_dataset_from_reader};
use crate::math::ScalingState;
use crate::models::TrainedModel;

#[derive(Debug, Clone)]
pub struct PePredictor {
    params: SvrParams,
    columns: ColumnNames,
    data: Option<Dataset>,
    prepared: Option<(ScalingState, TrainingSet)>,
    model: Option<TrainedModel>,
}

impl PePredictor {
    pub fn new(params: SvrParams) -> Self {
        Self::with_columns(params, ColumnNames::default())
    }

    pub fn with_columns(params: SvrParams, columns: ColumnNames) -> Self {
        Self {
            params,
            columns,
            data: None,
            prepared: None,
            model: None,
        }
    }

    pub fn load_data(&mut self, path: &Path) -> Result<&Dataset> {
        let dataset = load_dataset(path, &self.columns)?;
        Ok(self.replace_data(dataset))
    }

    pub fn load_from_reader<R: Read>(&mut self, reader: R, source: &str) -> Result<&Dataset> {
        let dataset = load_dataset_from_reader(reader, source, &self.columns)?;
        Ok(self.replace_data(dataset))
    }

    /// Fit fresh scalers on the loaded dataset.
    pub fn prepare_data(&mut self) -> Result<()> {
        let data = self.data.as_ref().ok_or(ForecastError::NotLoaded)?;
        let prepared = prepare(data)?;
        self.prepared = Some(prepared);
        self.model = None;
        Ok(())
    }

    pub fn train_model(&mut self) -> Result<&TrainedModel> {
        let (_, training) = self.prepared.as_ref().ok_or(ForecastError::NotPrepared)?;
        let model = fit_svr(training, &self.params)?;
        Ok(&*self.model.insert(model))
    }

    pub fn predict_future_pe(&self, years: u32) -> Result<ForecastResult> {
        let model = self.model.as_ref().ok_or(ForecastError::NotTrained)?;
        let (scaling, _) = self.prepared.as_ref().ok_or(ForecastError::NotPrepared)?;
        let data = self.data.as_ref().ok_or(ForecastError::NotLoaded)?;
        forecast(model, scaling, data.last().period, years)
    }

    pub fn params(&self) -> &SvrParams {
        &self.params
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.data.as_ref()
    }

    pub fn scaling(&self) -> Option<&ScalingState> {
        self.prepared.as_ref().map(|(s, _)| s)
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn replace_data(&mut self, dataset: Dataset) -> &Dataset {
        self.prepared = None;
        self.model = None;
        self.data.insert(dataset)
    }
}

impl Default for PePredictor {
    fn default() -> Self {
        Self::new(SvrParams::default())
    }
}

/// Load, prepare, train and forecast in one call; returns only the average PE.
pub fn predict_pe(path: &Path, years: u32, params: SvrParams) -> Result<f64> {
    let mut predictor = PePredictor::new(params);
    predictor.load_data(path)?;
    predictor.prepare_data()?;
    predictor.train_model()?;
    Ok(predictor.predict_future_pe(years)?.average_pe)
}
