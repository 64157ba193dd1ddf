//! Trained support vector regression model.
//!
//! The decision function of an epsilon-SVR is
//!
//! ```text
//! f(x) = Σ_i coef_i * k(sv_i, x) + intercept
//! ```
//!
//! where `coef_i = α_i - α*_i` is non-zero only for support vectors. Inputs and
//! outputs both live on the standardized scale; the model remembers which
//! `ScalingState` produced its training data.

use crate::math::Kernel;

/// Solver diagnostics recorded at fit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitDiagnostics {
    pub iterations: usize,
    pub converged: bool,
    pub n_train: usize,
}

/// A fitted epsilon-SVR on standardized `(time, pe)` data.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    kernel: Kernel,
    support_vectors: Vec<f64>,
    dual_coef: Vec<f64>,
    intercept: f64,
    scaling_id: u64,
    diagnostics: FitDiagnostics,
}

impl TrainedModel {
    pub(crate) fn new(
        kernel: Kernel,
        support_vectors: Vec<f64>,
        dual_coef: Vec<f64>,
        intercept: f64,
        scaling_id: u64,
        diagnostics: FitDiagnostics,
    ) -> Self {
        debug_assert_eq!(support_vectors.len(), dual_coef.len());
        Self {
            kernel,
            support_vectors,
            dual_coef,
            intercept,
            scaling_id,
            diagnostics,
        }
    }

    /// Predict a standardized PE for a standardized time coordinate.
    pub fn predict_scaled(&self, x: f64) -> f64 {
        self.support_vectors
            .iter()
            .zip(self.dual_coef.iter())
            .map(|(&sv, &c)| c * self.kernel.eval(sv, x))
            .sum::<f64>()
            + self.intercept
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn support_vectors(&self) -> &[f64] {
        &self.support_vectors
    }

    pub fn dual_coef(&self) -> &[f64] {
        &self.dual_coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_support(&self) -> usize {
        self.support_vectors.len()
    }

    /// Id of the `ScalingState` the training data was standardized with.
    pub fn scaling_id(&self) -> u64 {
        self.scaling_id
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }
}
