//! The Parareal iteration.
//!
//! A run starts with a coarse predictor sweep over all slices. Each correction
//! iteration then
//!
//! 1. fine-propagates every slice from its current start value (parallel),
//! 2. walks the slices left to right, setting each start value to the corrected
//!    end value of the left neighbour and computing
//!    `end = F(old start) + G(new start) − G(old start)` (sequential); the new
//!    coarse value `G(new start)` replaces the stored one during the same walk,
//! 3. compares the stacked end values with those of the previous iteration in the
//!    max norm and stops once the change drops below the tolerance.
//!
//! Reaching `maxiter` without convergence is a normal outcome reported through
//! [`RunStats::converged`].

use faer::Mat;
use tracing::{debug, trace, warn};

use crate::config::PararealOptions;
use crate::core::max_abs_diff;
use crate::error::PararealError;
use crate::parallel::SweepExecutor;
use crate::propagator::PropagatorRef;
use crate::solution::Solution;
use crate::timemesh::TimeMesh;
use crate::utils::{Convergence, RunStats};

pub mod matrix;
pub use matrix::PararealMatrix;

/// Parareal controller for one initial-value problem.
#[derive(Debug)]
pub struct Parareal {
    options: PararealOptions,
    timemesh: TimeMesh,
    u0: Solution,
    conv: Convergence,
    stats: RunStats,
    history: Vec<Vec<f64>>,
}

impl Parareal {
    /// Validate `options` and build the time mesh.
    ///
    /// # Errors
    /// `Configuration` for an invalid horizon, step count, tolerance, iteration
    /// budget or thread count.
    pub fn new(
        options: PararealOptions,
        coarse: PropagatorRef,
        fine: PropagatorRef,
        u0: Solution,
    ) -> Result<Self, PararealError> {
        options.validate()?;
        let executor = SweepExecutor::from_threads(options.threads)?;
        let timemesh = TimeMesh::build(&options, coarse, fine, &u0)?.with_executor(executor);
        let conv = Convergence { tol: options.tolerance, max_iters: options.maxiter };
        Ok(Self {
            options,
            timemesh,
            u0,
            conv,
            stats: RunStats::default(),
            history: Vec::new(),
        })
    }

    pub fn options(&self) -> &PararealOptions {
        &self.options
    }

    pub fn timemesh(&self) -> &TimeMesh {
        &self.timemesh
    }

    pub fn initial_value(&self) -> &Solution {
        &self.u0
    }

    /// Run the predictor and up to `maxiter` correction iterations.
    ///
    /// Any state of a previous run is discarded first.
    pub fn run(&mut self) -> Result<&RunStats, PararealError> {
        self.stats = RunStats::default();
        self.history.clear();

        self.timemesh.run_coarse()?;
        let mut previous = self.stacked()?;
        self.history.push(previous.clone());

        for k in 1..=self.conv.max_iters {
            self.timemesh.run_fine()?;
            self.correction_sweep()?;
            let current = self.stacked()?;
            let defect = max_abs_diff(&current, &previous);
            let (stop, converged) = self.conv.check(defect, k);
            self.stats.record(defect, converged);
            debug!(iteration = k, defect, "parareal iteration done");
            self.history.push(current.clone());
            previous = current;
            if stop {
                break;
            }
        }

        if !self.stats.converged && self.conv.tol > 0.0 {
            warn!(
                iterations = self.stats.iterations,
                defect = self.stats.final_defect,
                tolerance = self.conv.tol,
                "parareal did not converge"
            );
        }
        Ok(&self.stats)
    }

    fn correction_sweep(&mut self) -> Result<(), PararealError> {
        let mut new_start = self.u0.clone();
        for i in 0..self.timemesh.nslices() {
            let slice = self
                .timemesh
                .slice_mut(i)
                .ok_or_else(|| PararealError::config(format!("slice {i} missing")))?;
            new_start = slice.correct(new_start)?.clone();
            trace!(slice = i, norm = new_start.norm(), "corrected end value");
        }
        Ok(())
    }

    fn stacked(&self) -> Result<Vec<f64>, PararealError> {
        self.timemesh
            .stacked_end_values()
            .ok_or_else(|| PararealError::config("end values requested before the predictor sweep"))
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn iterations(&self) -> usize {
        self.stats.iterations
    }

    pub fn is_converged(&self) -> bool {
        self.stats.converged
    }

    /// Stacked global vector after the predictor (index 0) and after every
    /// completed iteration.
    pub fn history(&self) -> &[Vec<f64>] {
        &self.history
    }

    /// End value of slice `i` after the last completed iteration.
    pub fn get_end_value(&self, i: usize) -> Option<&Solution> {
        self.timemesh.slice(i)?.end_value()
    }

    /// End value of the final slice, the result at `tend`.
    pub fn get_last_end_value(&self) -> Option<&Solution> {
        self.timemesh.last_slice()?.end_value()
    }

    /// `[u0; end_0; ...; end_{n-1}]`, comparable with the solution of the global
    /// fine operator.
    pub fn get_parareal_vector(&self) -> Option<Vec<f64>> {
        self.timemesh.stacked_end_values()
    }

    /// Right-hand side `[u0; 0; ...; 0]` of the global systems.
    pub fn get_global_rhs(&self) -> Result<Vec<f64>, PararealError> {
        self.timemesh.get_global_rhs(&self.u0)
    }

    /// `(P, B)` with `y_{k+1} = P y_k + B b`.
    pub fn get_parareal_matrix(&self) -> Result<PararealMatrix, PararealError> {
        let coarse = self.timemesh.get_coarse_matrix(&self.u0)?;
        let fine = self.timemesh.get_fine_matrix(&self.u0)?;
        PararealMatrix::from_operators(&coarse, &fine)
    }

    /// ndof×ndof map from the initial value to the final-slice value after `niter`
    /// iterations. `niter == 0` gives the coarse predictor.
    pub fn get_parareal_stab_function(&self, niter: usize) -> Result<Mat<f64>, PararealError> {
        self.get_parareal_matrix()?
            .stability_function(self.timemesh.ndof(), niter)
    }
}
