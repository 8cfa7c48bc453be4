//! Wrappers for faer dense matrix types and vector operations.
//!
//! Implements the core linear algebra traits for `faer::Mat` and plain slices so the
//! propagators, the time mesh and the matrix-form analysis can share one vocabulary.
//! Norms optionally run on Rayon when the `rayon` feature is enabled.

use crate::core::traits::{InnerProduct, MatShape, MatVec};
use faer::Mat;
use num_traits::Float;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl MatVec<f64> for Mat<f64> {
    fn matvec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (j, xj) in x.iter().enumerate() {
                sum += self[(i, j)] * xj;
            }
            *yi = sum;
        }
    }
}

impl MatShape for Mat<f64> {
    fn nrows(&self) -> usize {
        Mat::nrows(self)
    }
    fn ncols(&self) -> usize {
        Mat::ncols(self)
    }
}

/// Implements inner product and norms for slices, with optional Rayon parallelism.
///
/// The infinity norm is order-independent, so the parallel and serial paths
/// agree bit for bit.
impl<T: Float + Send + Sync> InnerProduct<[T]> for () {
    type Scalar = T;

    fn dot(&self, x: &[T], y: &[T]) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.par_iter()
                .zip(y.par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }

    fn norm(&self, x: &[T]) -> T {
        self.dot(x, x).sqrt()
    }

    fn norm_inf(&self, x: &[T]) -> T {
        x.iter().fold(T::zero(), |acc, v| acc.max(v.abs()))
    }
}

/// Infinity norm of `x - y`.
pub fn max_abs_diff(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    x.iter()
        .zip(y)
        .fold(0.0_f64, |acc, (a, b)| acc.max((a - b).abs()))
}
