//! Trapezoidal rule (Crank–Nicolson), second order.
//!
//! Each sub-step solves `(M − Δt/2·A) u_{k+1} = (M + Δt/2·A) u_k`.

use super::{Propagator, step_size};
use crate::core::traits::MatVec;
use crate::error::PararealError;
use crate::solution::Solution;
use crate::solver::LuSolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct Trapezoidal;

impl Propagator for Trapezoidal {
    fn advance(
        &self,
        u: &Solution,
        t_start: f64,
        t_end: f64,
        n_steps: usize,
    ) -> Result<Solution, PararealError> {
        let dt = step_size(t_start, t_end, n_steps)?;
        let ops = u.operators();
        let lu = LuSolver::factor(&ops.shifted(-0.5 * dt))?;
        let explicit = ops.shifted(0.5 * dt);
        let mut y = u.values().to_vec();
        let mut rhs = vec![0.0; y.len()];
        for _ in 0..n_steps {
            explicit.matvec(&y, &mut rhs);
            lu.solve_in_place(&mut rhs)?;
            std::mem::swap(&mut y, &mut rhs);
        }
        u.with_values(y)
    }
}
