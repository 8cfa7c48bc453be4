//! One sub-interval of the time horizon.

use std::sync::Arc;

use faer::Mat;

use crate::error::PararealError;
use crate::propagator::PropagatorRef;
use crate::solution::{LinearOperators, Solution};

/// Which propagator of a slice to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Coarse,
    Fine,
}

/// A time slice `[t_start, t_end]` with its propagators and evolving values.
///
/// Values are replaced, never mutated: every update stores a fresh `Solution`,
/// so clones handed out earlier keep describing the iterate they were taken from.
#[derive(Debug, Clone)]
pub struct TimeSlice {
    index: usize,
    t_start: f64,
    t_end: f64,
    n_fine: usize,
    n_coarse: usize,
    coarse: PropagatorRef,
    fine: PropagatorRef,
    start: Solution,
    coarse_end: Option<Solution>,
    fine_end: Option<Solution>,
    end: Option<Solution>,
}

impl TimeSlice {
    pub(crate) fn new(
        index: usize,
        (t_start, t_end): (f64, f64),
        (n_fine, n_coarse): (usize, usize),
        coarse: PropagatorRef,
        fine: PropagatorRef,
        start: Solution,
    ) -> Result<Self, PararealError> {
        if t_start.partial_cmp(&t_end) != Some(std::cmp::Ordering::Less) {
            return Err(PararealError::config(format!(
                "slice {index}: t_start ({t_start}) must be smaller than t_end ({t_end})"
            )));
        }
        if n_fine == 0 || n_coarse == 0 {
            return Err(PararealError::config(format!(
                "slice {index}: step counts must be at least 1"
            )));
        }
        Ok(Self {
            index,
            t_start,
            t_end,
            n_fine,
            n_coarse,
            coarse,
            fine,
            start,
            coarse_end: None,
            fine_end: None,
            end: None,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn n_fine(&self) -> usize {
        self.n_fine
    }

    pub fn n_coarse(&self) -> usize {
        self.n_coarse
    }

    pub fn steps(&self, role: Role) -> usize {
        match role {
            Role::Coarse => self.n_coarse,
            Role::Fine => self.n_fine,
        }
    }

    pub fn propagator(&self, role: Role) -> &PropagatorRef {
        match role {
            Role::Coarse => &self.coarse,
            Role::Fine => &self.fine,
        }
    }

    pub fn start_value(&self) -> &Solution {
        &self.start
    }

    pub fn coarse_end(&self) -> Option<&Solution> {
        self.coarse_end.as_ref()
    }

    pub fn fine_end(&self) -> Option<&Solution> {
        self.fine_end.as_ref()
    }

    /// Corrected end value, passed on to the next slice.
    pub fn end_value(&self) -> Option<&Solution> {
        self.end.as_ref()
    }

    pub(crate) fn set_start(&mut self, u: Solution) {
        self.start = u;
    }

    fn propagate(&self, role: Role, u: &Solution) -> Result<Solution, PararealError> {
        self.propagator(role)
            .advance(u, self.t_start, self.t_end, self.steps(role))
    }

    /// Predictor: coarse-propagate the start value; the result is also the end value.
    pub(crate) fn run_coarse(&mut self) -> Result<&Solution, PararealError> {
        let g = self.propagate(Role::Coarse, &self.start)?;
        self.coarse_end = Some(g.clone());
        Ok(self.end.insert(g))
    }

    /// Fine-propagate the current start value.
    pub(crate) fn run_fine(&mut self) -> Result<(), PararealError> {
        let f = self.propagate(Role::Fine, &self.start)?;
        self.fine_end = Some(f);
        Ok(())
    }

    /// Correction `end = F(old start) + G(new start) − G(old start)`.
    ///
    /// Takes the new start value, refreshes the stored coarse end value with
    /// `G(new start)` and returns the corrected end value.
    pub(crate) fn correct(&mut self, new_start: Solution) -> Result<&Solution, PararealError> {
        let (Some(fine_end), Some(coarse_old)) = (&self.fine_end, &self.coarse_end) else {
            return Err(PararealError::config(format!(
                "slice {}: correction requires a predictor and a fine sweep",
                self.index
            )));
        };
        let coarse_new = self.propagate(Role::Coarse, &new_start)?;
        let end = fine_end.add(&coarse_new)?.sub(coarse_old)?;
        self.start = new_start;
        self.coarse_end = Some(coarse_new);
        Ok(self.end.insert(end))
    }

    /// Dense propagation matrix of the given role over this slice.
    pub fn update_matrix(&self, role: Role, ops: &Arc<LinearOperators>) -> Result<Mat<f64>, PararealError> {
        self.propagator(role)
            .update_matrix(ops, self.t_start, self.t_end, self.steps(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use crate::propagator::BackwardEuler;

    fn slice(start: f64) -> TimeSlice {
        let u = Solution::new(vec![start], CsrMatrix::from_diagonal(&[-1.0]), CsrMatrix::identity(1)).unwrap();
        TimeSlice::new(0, (0.0, 0.5), (4, 1), Arc::new(BackwardEuler), Arc::new(BackwardEuler), u).unwrap()
    }

    #[test]
    fn rejects_empty_interval() {
        let s = slice(1.0);
        let err = TimeSlice::new(1, (0.5, 0.5), (1, 1), s.coarse.clone(), s.fine.clone(), s.start.clone());
        assert!(matches!(err, Err(PararealError::Configuration(_))));
    }

    #[test]
    fn correction_needs_previous_sweeps() {
        let mut s = slice(1.0);
        let u = s.start_value().clone();
        assert!(s.correct(u).is_err());
    }

    #[test]
    fn correction_with_unchanged_start_yields_fine_value() {
        let mut s = slice(1.0);
        s.run_coarse().unwrap();
        s.run_fine().unwrap();
        let u = s.start_value().clone();
        let end = s.correct(u).unwrap().clone();
        assert!(end.approx_eq(s.fine_end().unwrap(), 1e-15));
    }

    #[test]
    fn correction_shifts_by_coarse_difference() {
        let mut s = slice(1.0);
        let g_old = s.run_coarse().unwrap().clone();
        s.run_fine().unwrap();
        let new_start = s.start_value().scale(2.0);
        let end = s.correct(new_start).unwrap().values()[0];
        let f = s.fine_end().unwrap().values()[0];
        let g_new = s.coarse_end().unwrap().values()[0];
        assert!((g_new - 2.0 * g_old.values()[0]).abs() < 1e-15);
        assert!((end - (f + g_new - g_old.values()[0])).abs() < 1e-15);
        assert_eq!(s.start_value().values()[0], 2.0);
    }

    #[test]
    fn update_matrix_follows_role() {
        let s = slice(1.0);
        let ops = s.start_value().operators();
        let g = s.update_matrix(Role::Coarse, ops).unwrap();
        let f = s.update_matrix(Role::Fine, ops).unwrap();
        // one step of size 0.5 against four steps of size 0.125
        assert!((g[(0, 0)] - 1.0 / 1.5).abs() < 1e-15);
        assert!((f[(0, 0)] - (1.0_f64 / 1.125).powi(4)).abs() < 1e-15);
    }
}
