//! Parareal as a linear recurrence on the global stacked vector.
//!
//! With the global coarse and fine operators `G` and `F` of the time mesh, one
//! Parareal iteration reads `G y_{k+1} = (G − F) y_k + b`, i.e.
//!
//! ```text
//! y_{k+1} = P y_k + B b,    P = G⁻¹ (G − F),    B = G⁻¹
//! ```
//!
//! and the coarse predictor is `y_0 = B b`. Unrolling gives
//! `y_k = (I + P + … + P^k) B b`. This path shares nothing with the step-by-step
//! iteration in the controller beyond the propagation matrices of the slices.

use faer::Mat;

use crate::core::traits::{MatShape, MatVec};
use crate::error::PararealError;
use crate::matrix::CsrMatrix;
use crate::matrix::dense::{add_scaled, extract_block};
use crate::solver::LuSolver;

/// Iteration matrix `P` and input matrix `B` of the Parareal recurrence.
#[derive(Debug, Clone)]
pub struct PararealMatrix {
    pub p: Mat<f64>,
    pub b: Mat<f64>,
}

impl PararealMatrix {
    /// Derive `(P, B)` from the global coarse and fine operators.
    pub fn from_operators(coarse: &CsrMatrix, fine: &CsrMatrix) -> Result<Self, PararealError> {
        PararealError::check_dim(coarse.nrows(), fine.nrows())?;
        PararealError::check_dim(coarse.ncols(), fine.ncols())?;
        let g = coarse.to_dense();
        let f = fine.to_dense();
        let b = LuSolver::factor(&g)?.inverse()?;
        let p = &b * &add_scaled(&g, -1.0, &f);
        Ok(Self { p, b })
    }

    /// Size of the global stacked vector.
    pub fn dim(&self) -> usize {
        self.p.nrows()
    }

    /// One iteration `P y + B rhs`.
    pub fn apply(&self, y: &[f64], rhs: &[f64]) -> Result<Vec<f64>, PararealError> {
        PararealError::check_dim(self.dim(), y.len())?;
        PararealError::check_dim(self.dim(), rhs.len())?;
        let mut py = vec![0.0; self.dim()];
        let mut brhs = vec![0.0; self.dim()];
        self.p.matvec(y, &mut py);
        self.b.matvec(rhs, &mut brhs);
        Ok(py.iter().zip(&brhs).map(|(a, b)| a + b).collect())
    }

    /// Coarse predictor `B rhs` followed by `niter` iterations.
    pub fn iterate(&self, rhs: &[f64], niter: usize) -> Result<Vec<f64>, PararealError> {
        PararealError::check_dim(self.dim(), rhs.len())?;
        let mut y = vec![0.0; self.dim()];
        self.b.matvec(rhs, &mut y);
        for _ in 0..niter {
            y = self.apply(&y, rhs)?;
        }
        Ok(y)
    }

    /// Map from the initial value to the final-slice value after `niter` iterations:
    /// the last block row and first block column of `(I + P + … + P^niter) B`.
    pub fn stability_function(&self, ndof: usize, niter: usize) -> Result<Mat<f64>, PararealError> {
        let dim = self.dim();
        if ndof == 0 || dim % ndof != 0 {
            return Err(PararealError::Dimension { expected: dim, found: ndof });
        }
        // only the first block column of B sees the initial value
        let mut term = extract_block(&self.b, 0, 0, dim, ndof);
        let mut acc = term.clone();
        for _ in 0..niter {
            term = &self.p * &term;
            acc = add_scaled(&acc, 1.0, &term);
        }
        Ok(extract_block(&acc, dim - ndof, 0, ndof, ndof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // scalar problem, two slices: G_i = g, F_i = f
    fn two_slice(g: f64, f: f64) -> PararealMatrix {
        let op = |r: f64| {
            CsrMatrix::from_csr(3, 3, vec![0, 1, 3, 5], vec![0, 0, 1, 1, 2], vec![1.0, -r, 1.0, -r, 1.0]).unwrap()
        };
        PararealMatrix::from_operators(&op(g), &op(f)).unwrap()
    }

    #[test]
    fn predictor_is_coarse_sweep() {
        let pm = two_slice(0.5, 0.25);
        let y = pm.iterate(&[1.0, 0.0, 0.0], 0).unwrap();
        assert!((y[1] - 0.5).abs() < 1e-15);
        assert!((y[2] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn exact_after_nslices_iterations() {
        let pm = two_slice(0.5, 0.25);
        let y = pm.iterate(&[1.0, 0.0, 0.0], 2).unwrap();
        assert!((y[1] - 0.25).abs() < 1e-15);
        assert!((y[2] - 0.0625).abs() < 1e-15);
    }

    #[test]
    fn stability_function_matches_iterate() {
        let pm = two_slice(0.6, 0.3);
        for k in 0..4 {
            let s = pm.stability_function(1, k).unwrap();
            let y = pm.iterate(&[2.0, 0.0, 0.0], k).unwrap();
            assert!((2.0 * s[(0, 0)] - y[2]).abs() < 1e-14);
        }
    }

    #[test]
    fn dimension_errors() {
        let pm = two_slice(0.5, 0.25);
        assert!(pm.apply(&[1.0], &[1.0, 0.0, 0.0]).is_err());
        assert!(pm.stability_function(2, 1).is_err());
        let small = CsrMatrix::identity(2);
        assert!(PararealMatrix::from_operators(&small, &CsrMatrix::identity(3)).is_err());
    }
}
