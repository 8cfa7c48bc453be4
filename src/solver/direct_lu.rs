//! Direct dense solver using Faer: full-pivoting LU.
//!
//! Propagators factor their implicit system matrix once per `advance` call and reuse
//! the factorization for every internal sub-step; the matrix-form analysis uses the
//! same solver to invert the global coarse operator and to solve the global fine system.
//!
//! Faer does not report singular pivots. A factorization is rejected when the
//! smallest pivot of U is zero or below `n·ε` relative to the largest one, and
//! every solve is checked for non-finite results.
//!
//! # References
//! - Faer documentation: https://github.com/sarah-ek/faer-rs
//! - Golub & Van Loan, Matrix Computations

use crate::error::PararealError;
use crate::matrix::dense::all_finite;
use faer::linalg::solvers::{FullPivLu, SolveCore};
use faer::{Conj, Mat, MatMut};

/// LU solver using full pivoting from Faer.
///
/// Stores the LU factorization for reuse.
#[derive(Debug)]
pub struct LuSolver {
    factor: FullPivLu<f64>,
    n: usize,
}

impl LuSolver {
    /// Factor a square matrix.
    ///
    /// # Errors
    /// * `Dimension` if `a` is not square
    /// * `SingularSystem` if `a` has non-finite entries or a pivot that is zero
    ///   relative to the largest one
    pub fn factor(a: &Mat<f64>) -> Result<Self, PararealError> {
        PararealError::check_dim(a.nrows(), a.ncols())?;
        if !all_finite(a) {
            return Err(PararealError::SingularSystem(
                "matrix has non-finite entries".into(),
            ));
        }
        let n = a.nrows();
        let factor = FullPivLu::new(a.as_ref());
        let u = factor.U();
        let (min_pivot, max_pivot) = (0..n)
            .map(|i| u[(i, i)].abs())
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), p| (lo.min(p), hi.max(p)));
        if n > 0 && (min_pivot == 0.0 || min_pivot <= n as f64 * f64::EPSILON * max_pivot) {
            return Err(PararealError::SingularSystem(format!(
                "{n}x{n} matrix is numerically singular (pivot ratio {:.3e})",
                min_pivot / max_pivot
            )));
        }
        Ok(LuSolver { factor, n })
    }

    /// Overwrite `x` (holding b on input) with A⁻¹ b.
    pub fn solve_in_place(&self, x: &mut [f64]) -> Result<(), PararealError> {
        PararealError::check_dim(self.n, x.len())?;
        let n = x.len();
        let x_mat = MatMut::from_column_major_slice_mut(x, n, 1);
        self.factor.solve_in_place_with_conj(Conj::No, x_mat);
        if x.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(PararealError::SingularSystem(format!(
                "zero pivot in {n}x{n} LU factorization"
            )))
        }
    }

    /// Return A⁻¹ b.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, PararealError> {
        let mut x = b.to_vec();
        self.solve_in_place(&mut x)?;
        Ok(x)
    }

    /// Return A⁻¹ B for a matrix of right-hand sides.
    pub fn solve_mat(&self, b: &Mat<f64>) -> Result<Mat<f64>, PararealError> {
        PararealError::check_dim(self.n, b.nrows())?;
        let mut x = b.clone();
        self.factor.solve_in_place_with_conj(Conj::No, x.as_mut());
        if all_finite(&x) {
            Ok(x)
        } else {
            Err(PararealError::SingularSystem(format!(
                "zero pivot in {0}x{0} LU factorization",
                self.n
            )))
        }
    }

    /// Explicit inverse A⁻¹.
    pub fn inverse(&self) -> Result<Mat<f64>, PararealError> {
        self.solve_mat(&Mat::<f64>::identity(self.n, self.n))
    }
}
