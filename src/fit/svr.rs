//! Epsilon-insensitive support vector regression.
//!
//! We solve the standard epsilon-SVR dual over `2l` variables
//! `a = [α; α*]` (with `l` training points):
//!
//! ```text
//! minimize   ½ aᵀ Q a + pᵀ a
//! subject to 0 ≤ a_t ≤ C,   Σ s_t a_t = 0
//!
//! s_t = +1 for t < l, -1 otherwise
//! Q_tu = s_t s_u k(x_t mod l, x_u mod l)
//! p_t = ε - z_t (t < l),   ε + z_(t-l) (t ≥ l)
//! ```
//!
//! Implementation choices:
//! - Sequential minimal optimization: every iteration updates one pair of
//!   variables analytically, chosen by maximal violation + second-order gain.
//! - The full Gram matrix is materialized once (`nalgebra::DMatrix`). Quarterly
//!   histories are tiny, so there is no kernel cache and no shrinking.
//! - No randomness: identical input and parameters give identical models.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

use crate::domain::{Gamma, SvrParams};
use crate::error::{ForecastError, Result};
use crate::fit::prepare::TrainingSet;
use crate::math::Kernel;
use crate::models::{FitDiagnostics, TrainedModel};

/// Floor for non-positive curvature along a working pair.
const TAU: f64 = 1e-12;

/// Fit an epsilon-SVR on a standardized training set.
pub fn fit_svr(training: &TrainingSet, params: &SvrParams) -> Result<TrainedModel> {
    validate_params(params)?;
    if training.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "cannot fit a model on an empty training set".to_string(),
        ));
    }

    let kernel = resolve_kernel(params, &training.x);
    let gram = kernel.gram(&training.x);
    let targets = DVector::from_column_slice(&training.y);

    debug!(
        "fitting svr: kernel={} gamma={:.6} C={} epsilon={} n={}",
        kernel.kind.display_name(),
        kernel.gamma,
        params.c,
        params.epsilon,
        training.len()
    );

    let solution = solve_dual(&gram, &targets, params);
    if !solution.converged {
        warn!(
            "svr solver stopped at the iteration cap ({}) before reaching tol={}",
            params.max_iter, params.tol
        );
    }

    let mut support_vectors = Vec::new();
    let mut dual_coef = Vec::new();
    for (i, &b) in solution.beta.iter().enumerate() {
        if b != 0.0 {
            support_vectors.push(training.x[i]);
            dual_coef.push(b);
        }
    }

    info!(
        "svr fit: {} support vectors of {} points in {} iterations",
        support_vectors.len(),
        training.len(),
        solution.iterations
    );

    let diagnostics = FitDiagnostics {
        iterations: solution.iterations,
        converged: solution.converged,
        n_train: training.len(),
    };

    Ok(TrainedModel::new(
        kernel,
        support_vectors,
        dual_coef,
        -solution.rho,
        training.scaling_id(),
        diagnostics,
    ))
}

/// Resolve `gamma = scale|auto|value` against the (one-dimensional) inputs.
pub fn resolve_kernel(params: &SvrParams, x: &[f64]) -> Kernel {
    const N_FEATURES: f64 = 1.0;

    let gamma = match params.gamma {
        Gamma::Value(g) => g,
        Gamma::Auto => 1.0 / N_FEATURES,
        Gamma::Scale => {
            let n = x.len().max(1) as f64;
            let mean = x.iter().sum::<f64>() / n;
            let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            if var > 0.0 { 1.0 / (N_FEATURES * var) } else { 1.0 }
        }
    };

    Kernel {
        kind: params.kernel,
        gamma,
        degree: params.degree,
        coef0: params.coef0,
    }
}

fn validate_params(params: &SvrParams) -> Result<()> {
    if !params.c.is_finite() || params.c <= 0.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "C must be finite and > 0 (got {})",
            params.c
        )));
    }
    if !params.epsilon.is_finite() || params.epsilon < 0.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "epsilon must be finite and >= 0 (got {})",
            params.epsilon
        )));
    }
    if let Gamma::Value(g) = params.gamma {
        if !g.is_finite() || g <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "gamma must be finite and > 0 (got {g})"
            )));
        }
    }
    if i32::try_from(params.degree).is_err() {
        return Err(ForecastError::InvalidParameter(format!(
            "degree must be at most {} (got {})",
            i32::MAX,
            params.degree
        )));
    }
    if !params.coef0.is_finite() {
        return Err(ForecastError::InvalidParameter("coef0 must be finite".to_string()));
    }
    if !params.tol.is_finite() || params.tol <= 0.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "tol must be finite and > 0 (got {})",
            params.tol
        )));
    }
    if params.max_iter == 0 {
        return Err(ForecastError::InvalidParameter("max_iter must be > 0".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct DualSolution {
    /// `α_i - α*_i` per training point.
    beta: Vec<f64>,
    rho: f64,
    iterations: usize,
    converged: bool,
}

/// Working state of the SMO solver.
struct Smo<'a> {
    gram: &'a DMatrix<f64>,
    l: usize,
    c: f64,
    alpha: DVector<f64>,
    grad: DVector<f64>,
    diag: DVector<f64>,
}

impl<'a> Smo<'a> {
    fn new(gram: &'a DMatrix<f64>, z: &DVector<f64>, c: f64, epsilon: f64) -> Self {
        let l = z.len();
        let n = 2 * l;
        let grad = DVector::from_fn(n, |t, _| if t < l { epsilon - z[t] } else { epsilon + z[t - l] });
        let diag = DVector::from_fn(n, |t, _| gram[(t % l, t % l)]);
        Self {
            gram,
            l,
            c,
            alpha: DVector::zeros(n),
            grad,
            diag,
        }
    }

    fn n(&self) -> usize {
        2 * self.l
    }

    fn sign(&self, t: usize) -> f64 {
        if t < self.l { 1.0 } else { -1.0 }
    }

    fn q(&self, t: usize, u: usize) -> f64 {
        self.sign(t) * self.sign(u) * self.gram[(t % self.l, u % self.l)]
    }

    fn at_upper(&self, t: usize) -> bool {
        self.alpha[t] >= self.c
    }

    fn at_lower(&self, t: usize) -> bool {
        self.alpha[t] <= 0.0
    }

    /// Pick the next working pair, or `None` once the KKT gap is below `tol`.
    fn select_working_set(&self, tol: f64) -> Option<(usize, usize)> {
        let n = self.n();

        let mut gmax = f64::NEG_INFINITY;
        let mut i = None;
        for t in 0..n {
            if self.sign(t) > 0.0 {
                if !self.at_upper(t) && -self.grad[t] >= gmax {
                    gmax = -self.grad[t];
                    i = Some(t);
                }
            } else if !self.at_lower(t) && self.grad[t] >= gmax {
                gmax = self.grad[t];
                i = Some(t);
            }
        }
        let i = i?;

        let mut gmax2 = f64::NEG_INFINITY;
        let mut j = None;
        let mut obj_diff_min = f64::INFINITY;
        for t in 0..n {
            let (grad_diff, quad) = if self.sign(t) > 0.0 {
                if self.at_lower(t) {
                    continue;
                }
                gmax2 = gmax2.max(self.grad[t]);
                (
                    gmax + self.grad[t],
                    self.diag[i] + self.diag[t] - 2.0 * self.sign(i) * self.q(i, t),
                )
            } else {
                if self.at_upper(t) {
                    continue;
                }
                gmax2 = gmax2.max(-self.grad[t]);
                (
                    gmax - self.grad[t],
                    self.diag[i] + self.diag[t] + 2.0 * self.sign(i) * self.q(i, t),
                )
            };

            if grad_diff > 0.0 {
                let quad = if quad > 0.0 { quad } else { TAU };
                let obj_diff = -(grad_diff * grad_diff) / quad;
                if obj_diff <= obj_diff_min {
                    obj_diff_min = obj_diff;
                    j = Some(t);
                }
            }
        }

        if gmax + gmax2 < tol {
            return None;
        }
        j.map(|j| (i, j))
    }

    /// Analytic two-variable update, clipped to the box.
    fn update_pair(&mut self, i: usize, j: usize) {
        let c = self.c;
        let q_ij = self.q(i, j);
        let old_ai = self.alpha[i];
        let old_aj = self.alpha[j];

        if self.sign(i) != self.sign(j) {
            let quad = self.diag[i] + self.diag[j] + 2.0 * q_ij;
            let quad = if quad > 0.0 { quad } else { TAU };
            let delta = (-self.grad[i] - self.grad[j]) / quad;
            let diff = old_ai - old_aj;
            let mut ai = old_ai + delta;
            let mut aj = old_aj + delta;

            if diff > 0.0 {
                if aj < 0.0 {
                    aj = 0.0;
                    ai = diff;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = -diff;
            }
            if diff > 0.0 {
                if ai > c {
                    ai = c;
                    aj = c - diff;
                }
            } else if aj > c {
                aj = c;
                ai = c + diff;
            }

            self.alpha[i] = ai;
            self.alpha[j] = aj;
        } else {
            let quad = self.diag[i] + self.diag[j] - 2.0 * q_ij;
            let quad = if quad > 0.0 { quad } else { TAU };
            let delta = (self.grad[i] - self.grad[j]) / quad;
            let sum = old_ai + old_aj;
            let mut ai = old_ai - delta;
            let mut aj = old_aj + delta;

            if sum > c {
                if ai > c {
                    ai = c;
                    aj = sum - c;
                }
            } else if aj < 0.0 {
                aj = 0.0;
                ai = sum;
            }
            if sum > c {
                if aj > c {
                    aj = c;
                    ai = sum - c;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = sum;
            }

            self.alpha[i] = ai;
            self.alpha[j] = aj;
        }

        let d_ai = self.alpha[i] - old_ai;
        let d_aj = self.alpha[j] - old_aj;
        for t in 0..self.n() {
            self.grad[t] += self.q(i, t) * d_ai + self.q(j, t) * d_aj;
        }
    }

    /// Offset `ρ` from the KKT conditions (average over free variables).
    fn rho(&self) -> f64 {
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut sum_free = 0.0;
        let mut n_free = 0usize;

        for t in 0..self.n() {
            let y_grad = self.sign(t) * self.grad[t];
            if self.at_upper(t) {
                if self.sign(t) < 0.0 {
                    upper = upper.min(y_grad);
                } else {
                    lower = lower.max(y_grad);
                }
            } else if self.at_lower(t) {
                if self.sign(t) > 0.0 {
                    upper = upper.min(y_grad);
                } else {
                    lower = lower.max(y_grad);
                }
            } else {
                n_free += 1;
                sum_free += y_grad;
            }
        }

        if n_free > 0 {
            sum_free / n_free as f64
        } else {
            (upper + lower) / 2.0
        }
    }
}

fn solve_dual(gram: &DMatrix<f64>, z: &DVector<f64>, params: &SvrParams) -> DualSolution {
    let mut smo = Smo::new(gram, z, params.c, params.epsilon);

    let mut iterations = 0usize;
    let mut converged = false;
    while iterations < params.max_iter {
        let Some((i, j)) = smo.select_working_set(params.tol) else {
            converged = true;
            break;
        };
        smo.update_pair(i, j);
        iterations += 1;
    }

    let l = smo.l;
    let beta = (0..l).map(|t| smo.alpha[t] - smo.alpha[t + l]).collect();

    DualSolution {
        beta,
        rho: smo.rho(),
        iterations,
        converged,
    }
}
