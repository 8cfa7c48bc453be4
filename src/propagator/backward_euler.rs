//! Implicit (backward) Euler, first order.
//!
//! Each sub-step solves `(M − Δt·A) u_{k+1} = M u_k`.

use std::sync::Arc;

use faer::Mat;

use super::{Propagator, step_size};
use crate::error::PararealError;
use crate::matrix::dense::mat_pow;
use crate::solution::{LinearOperators, OperatorKind, Solution};
use crate::solver::LuSolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardEuler;

impl Propagator for BackwardEuler {
    fn advance(
        &self,
        u: &Solution,
        t_start: f64,
        t_end: f64,
        n_steps: usize,
    ) -> Result<Solution, PararealError> {
        let dt = step_size(t_start, t_end, n_steps)?;
        let ops = u.operators();
        let lu = LuSolver::factor(&ops.shifted(-dt))?;
        let mass = ops.operator(OperatorKind::M);
        let mut y = u.values().to_vec();
        let mut rhs = vec![0.0; y.len()];
        for _ in 0..n_steps {
            mass.spmv(&y, &mut rhs)?;
            lu.solve_in_place(&mut rhs)?;
            std::mem::swap(&mut y, &mut rhs);
        }
        u.with_values(y)
    }

    /// Closed form `((M − Δt·A)⁻¹ M)^n`.
    fn update_matrix(
        &self,
        ops: &Arc<LinearOperators>,
        t_start: f64,
        t_end: f64,
        n_steps: usize,
    ) -> Result<Mat<f64>, PararealError> {
        let dt = step_size(t_start, t_end, n_steps)?;
        let lu = LuSolver::factor(&ops.shifted(-dt))?;
        let step = lu.solve_mat(ops.dense(OperatorKind::M))?;
        Ok(mat_pow(&step, n_steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MatVec;
    use crate::matrix::CsrMatrix;

    fn scalar(lambda: f64, y0: f64) -> Solution {
        Solution::new(vec![y0], CsrMatrix::from_diagonal(&[lambda]), CsrMatrix::identity(1)).unwrap()
    }

    #[test]
    fn scalar_decay_matches_formula() {
        // y' = -2y, 8 steps of size 1/8: y = (1 / (1 + 2/8))^8
        let u = scalar(-2.0, 1.0);
        let out = BackwardEuler.advance(&u, 0.0, 1.0, 8).unwrap();
        let expected = (1.0_f64 / 1.25).powi(8);
        assert!((out.values()[0] - expected).abs() < 1e-15);
    }

    #[test]
    fn is_linear_in_initial_value() {
        let a = CsrMatrix::from_bands(3, &[(-1, 1.0), (0, -2.0), (1, 1.0)]);
        let m = CsrMatrix::from_diagonal(&[10.0, 11.0, 12.0]);
        let u1 = Solution::new(vec![1.0, 0.5, -1.0], a, m).unwrap();
        let u2 = u1.with_values(vec![0.0, 2.0, 3.0]).unwrap();
        let combo = u1.scale(2.0).axpy(-3.0, &u2).unwrap();
        let lhs = BackwardEuler.advance(&combo, 0.0, 0.5, 5).unwrap();
        let f1 = BackwardEuler.advance(&u1, 0.0, 0.5, 5).unwrap();
        let f2 = BackwardEuler.advance(&u2, 0.0, 0.5, 5).unwrap();
        let rhs = f1.scale(2.0).axpy(-3.0, &f2).unwrap();
        assert!(lhs.approx_eq(&rhs, 1e-13));
    }

    #[test]
    fn update_matrix_matches_advance() {
        let a = CsrMatrix::from_bands(4, &[(-1, 1.0), (0, -2.0), (1, 1.0)]);
        let m = CsrMatrix::from_diagonal(&[10.0, 10.5, 11.0, 12.0]);
        let u = Solution::new(vec![1.0, -2.0, 0.5, 3.0], a, m).unwrap();
        let r = BackwardEuler.update_matrix(u.operators(), 0.2, 0.7, 6).unwrap();
        let mut y = vec![0.0; 4];
        r.matvec(u.values(), &mut y);
        let stepped = BackwardEuler.advance(&u, 0.2, 0.7, 6).unwrap();
        assert!(stepped.approx_eq(&u.with_values(y).unwrap(), 1e-13));
    }

    #[test]
    fn singular_system_is_reported() {
        // M - dt*A = 1 - 1*1 = 0
        let u = scalar(1.0, 1.0);
        let err = BackwardEuler.advance(&u, 0.0, 1.0, 1).unwrap_err();
        assert!(matches!(err, PararealError::SingularSystem(_)));
    }

    #[test]
    fn rank_deficient_mass_matrix_is_reported() {
        // A = 0 leaves M - dt*A = M, whose rows are linearly dependent
        let m = CsrMatrix::from_dense(&Mat::from_fn(3, 3, |i, j| (3 * i + j + 1) as f64));
        let a = CsrMatrix::from_diagonal(&[0.0; 3]);
        let u = Solution::new(vec![1.0, 0.0, 0.0], a, m).unwrap();
        let err = BackwardEuler.advance(&u, 0.0, 1.0, 4).unwrap_err();
        assert!(matches!(err, PararealError::SingularSystem(_)));
        let err = BackwardEuler.update_matrix(u.operators(), 0.0, 1.0, 4).unwrap_err();
        assert!(matches!(err, PararealError::SingularSystem(_)));
    }
}
