//! Convergence tracking & tolerance checks for the Parareal iteration.

/// Stopping criteria.
#[derive(Clone, Copy, Debug)]
pub struct Convergence {
    pub tol: f64,
    pub max_iters: usize,
}

/// Outcome of a run. `converged == false` after `max_iters` is a normal result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    /// Completed correction iterations
    pub iterations: usize,
    /// Max-norm update of the slice end values in the last iteration
    pub final_defect: f64,
    pub converged: bool,
    /// Update norm of every iteration, in order
    pub defects: Vec<f64>,
}

impl Convergence {
    /// Returns `(should_stop, converged)` for the update norm `defect` of iteration `i`.
    ///
    /// The comparison is strict, so a tolerance of zero always runs `max_iters`
    /// iterations.
    pub fn check(&self, defect: f64, i: usize) -> (bool, bool) {
        let converged = defect < self.tol;
        (converged || i >= self.max_iters, converged)
    }
}

impl RunStats {
    pub(crate) fn record(&mut self, defect: f64, converged: bool) {
        self.iterations += 1;
        self.final_defect = defect;
        self.converged = converged;
        self.defects.push(defect);
    }
}
