//! Kernel functions for one-dimensional inputs.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::KernelKind;

/// A kernel with its coefficients resolved to concrete numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kernel {
    pub kind: KernelKind,
    pub gamma: f64,
    pub degree: u32,
    pub coef0: f64,
}

impl Kernel {
    pub fn eval(&self, a: f64, b: f64) -> f64 {
        match self.kind {
            KernelKind::Rbf => {
                let d = a - b;
                (-self.gamma * d * d).exp()
            }
            KernelKind::Linear => a * b,
            KernelKind::Poly => {
                let degree = i32::try_from(self.degree).unwrap_or(i32::MAX);
                (self.gamma * a * b + self.coef0).powi(degree)
            }
        }
    }

    /// Full Gram matrix `K[i, j] = k(x_i, x_j)`.
    pub fn gram(&self, x: &[f64]) -> DMatrix<f64> {
        let n = x.len();
        DMatrix::from_fn(n, n, |i, j| self.eval(x[i], x[j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel(kind: KernelKind) -> Kernel {
        Kernel {
            kind,
            gamma: 0.5,
            degree: 3,
            coef0: 1.0,
        }
    }

    #[test]
    fn rbf_is_one_on_the_diagonal_and_decays() {
        let k = kernel(KernelKind::Rbf);
        assert_eq!(k.eval(0.3, 0.3), 1.0);
        assert!((k.eval(0.0, 2.0) - (-2.0f64).exp()).abs() < 1e-15);
        assert!(k.eval(0.0, 3.0) < k.eval(0.0, 1.0));
    }

    #[test]
    fn linear_and_poly_match_closed_forms() {
        assert_eq!(kernel(KernelKind::Linear).eval(2.0, -3.0), -6.0);
        // (0.5 * 2 * 1 + 1)^3 = 8
        assert!((kernel(KernelKind::Poly).eval(2.0, 1.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn gram_matrix_is_symmetric() {
        let g = kernel(KernelKind::Rbf).gram(&[-1.0, 0.0, 0.5, 2.0]);
        assert_eq!(g.nrows(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(g[(i, j)], g[(j, i)]);
            }
        }
    }
}
