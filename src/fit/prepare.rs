//! Feature preparation: standardize the time axis and the PE target.

use log::debug;

use crate::domain::Dataset;
use crate::error::Result;
use crate::math::ScalingState;

/// Standardized training pairs, tagged with the scaling state that produced them.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    scaling_id: u64,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn scaling_id(&self) -> u64 {
        self.scaling_id
    }
}

/// Fit a fresh pair of scalers on `dataset` and standardize both columns.
pub fn prepare(dataset: &Dataset) -> Result<(ScalingState, TrainingSet)> {
    let times = dataset.times();
    let pe_values = dataset.pe_values();
    let scaling = ScalingState::fit(&times, &pe_values)?;

    let x = scaling.time().transform_all(&times)?;
    let y = scaling.pe().transform_all(&pe_values)?;

    let tp = scaling.time().params()?;
    let pp = scaling.pe().params()?;
    debug!(
        "prepared {} rows: time mean={:.4} std={:.4}, pe mean={:.4} std={:.4}",
        x.len(),
        tp.mean,
        tp.std,
        pp.mean,
        pp.std
    );

    let training = TrainingSet {
        x,
        y,
        scaling_id: scaling.id(),
    };
    Ok((scaling, training))
}
