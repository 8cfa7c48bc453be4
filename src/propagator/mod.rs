//! Time propagators for `M u' = A u`.
//!
//! A propagator advances a [`Solution`] across `[t_start, t_end]` with `n_steps`
//! uniform internal sub-steps. Parareal uses one propagator in the coarse role and
//! one in the fine role; both must be deterministic and linear in the initial value,
//! which is what makes the global block operators of the time mesh well defined.

use std::fmt::Debug;
use std::sync::Arc;

use faer::Mat;

use crate::error::PararealError;
use crate::solution::{LinearOperators, Solution};

pub mod backward_euler;
pub mod trapezoidal;

pub use backward_euler::BackwardEuler;
pub use trapezoidal::Trapezoidal;

/// A one-step time integration scheme.
pub trait Propagator: Send + Sync + Debug {
    /// Advance `u` from `t_start` to `t_end` in `n_steps` uniform sub-steps.
    ///
    /// # Errors
    /// * `Configuration` if `t_end <= t_start` or `n_steps == 0`
    /// * `SingularSystem` if an internal linear solve fails
    fn advance(
        &self,
        u: &Solution,
        t_start: f64,
        t_end: f64,
        n_steps: usize,
    ) -> Result<Solution, PararealError>;

    /// Dense matrix R with `advance(u).values() == R · u.values()` for every `u`
    /// carrying `ops`.
    ///
    /// Built column by column from `advance` applied to unit vectors.
    fn update_matrix(
        &self,
        ops: &Arc<LinearOperators>,
        t_start: f64,
        t_end: f64,
        n_steps: usize,
    ) -> Result<Mat<f64>, PararealError> {
        let ndof = ops.ndof();
        let zero = Solution::with_operators(vec![0.0; ndof], Arc::clone(ops))?;
        let mut r = Mat::<f64>::zeros(ndof, ndof);
        for j in 0..ndof {
            let column = self.advance(&zero.unit(j)?, t_start, t_end, n_steps)?;
            for (i, v) in column.values().iter().enumerate() {
                r[(i, j)] = *v;
            }
        }
        Ok(r)
    }
}

/// Shared handle to a propagator, as stored by time slices.
pub type PropagatorRef = Arc<dyn Propagator>;

/// Sub-step size for `n_steps` uniform steps over `[t_start, t_end]`.
pub fn step_size(t_start: f64, t_end: f64, n_steps: usize) -> Result<f64, PararealError> {
    if !(t_start.is_finite() && t_end.is_finite()) || t_end <= t_start {
        return Err(PararealError::config(format!(
            "propagation interval [{t_start}, {t_end}] is empty or not finite"
        )));
    }
    if n_steps == 0 {
        return Err(PararealError::config("propagator needs at least one step"));
    }
    Ok((t_end - t_start) / n_steps as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_size_validates() {
        assert_eq!(step_size(0.0, 1.0, 4).unwrap(), 0.25);
        assert!(step_size(1.0, 1.0, 4).is_err());
        assert!(step_size(0.0, 1.0, 0).is_err());
        assert!(step_size(0.0, f64::NAN, 1).is_err());
    }
}
