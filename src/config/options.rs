//! Run options for a Parareal solve.
//!
//! `PararealOptions` collects the time horizon, the slice decomposition, the step
//! counts of both propagators and the stopping criteria. Options are plain data;
//! `validate` is called by the time mesh and the controller before anything is built.

use crate::error::PararealError;

/// Horizon, decomposition and stopping criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct PararealOptions {
    /// Start of the time horizon
    pub tstart: f64,

    /// End of the time horizon
    pub tend: f64,

    /// Number of time slices
    pub nslices: usize,

    /// Fine sub-steps per slice
    pub n_fine: usize,

    /// Coarse sub-steps per slice
    pub n_coarse: usize,

    /// Stop once the max-norm update of the slice end values drops below this
    pub tolerance: f64,

    /// Maximum number of correction iterations
    pub maxiter: usize,

    /// Worker threads for the fine sweep; `None` uses one per core
    pub threads: Option<usize>,
}

impl Default for PararealOptions {
    fn default() -> Self {
        Self {
            tstart: 0.0,
            tend: 1.0,
            nslices: 4,
            n_fine: 8,
            n_coarse: 1,
            tolerance: 1e-10,
            maxiter: 4,
            threads: None,
        }
    }
}

impl PararealOptions {
    pub fn new(tstart: f64, tend: f64, nslices: usize) -> Self {
        Self { tstart, tend, nslices, ..Self::default() }
    }

    pub fn with_steps(mut self, n_fine: usize, n_coarse: usize) -> Self {
        self.n_fine = n_fine;
        self.n_coarse = n_coarse;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Length of one slice.
    pub fn slice_length(&self) -> f64 {
        (self.tend - self.tstart) / self.nslices as f64
    }

    /// The `nslices + 1` slice boundaries; the last one is `tend` itself.
    pub fn slice_boundaries(&self) -> Vec<f64> {
        let n = self.nslices;
        let dt = self.slice_length();
        (0..=n)
            .map(|i| if i == n { self.tend } else { self.tstart + i as f64 * dt })
            .collect()
    }

    /// Check the horizon and decomposition.
    ///
    /// Besides `tstart < tend`, every slice must have positive length after
    /// rounding, which fails for horizons that are narrow relative to the
    /// magnitude of `tstart`.
    pub fn validate_mesh(&self) -> Result<(), PararealError> {
        if !(self.tstart.is_finite() && self.tend.is_finite()) {
            return Err(PararealError::config("tstart and tend must be finite"));
        }
        if self.tstart >= self.tend {
            return Err(PararealError::config(format!(
                "tstart ({}) must be smaller than tend ({})",
                self.tstart, self.tend
            )));
        }
        if self.nslices == 0 {
            return Err(PararealError::config("nslices must be at least 1"));
        }
        if self.n_fine == 0 || self.n_coarse == 0 {
            return Err(PararealError::config("step counts must be at least 1"));
        }
        if self.slice_boundaries().windows(2).any(|w| w[0] >= w[1]) {
            return Err(PararealError::config(format!(
                "horizon [{}, {}] is too narrow to split into {} slices in f64",
                self.tstart, self.tend, self.nslices
            )));
        }
        Ok(())
    }

    /// Check everything a Parareal run needs.
    pub fn validate(&self) -> Result<(), PararealError> {
        self.validate_mesh()?;
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(PararealError::config("tolerance must be non-negative"));
        }
        if self.maxiter == 0 {
            return Err(PararealError::config("maxiter must be at least 1"));
        }
        if self.threads == Some(0) {
            return Err(PararealError::config("thread count must be at least 1"));
        }
        Ok(())
    }
}
