//! Decomposition of the time horizon into slices.
//!
//! The mesh owns the ordered, contiguous slices covering `[tstart, tend]`, runs the
//! sequential coarse sweep and the parallel fine sweep over them, and assembles the
//! global block-bidiagonal operators of the coarse and fine propagators:
//!
//! ```text
//! | I              |   | u_0 |   | u0 |
//! | -R_0  I        | · | u_1 | = | 0  |
//! |      -R_1  I   |   | u_2 |   | 0  |
//! ```
//!
//! where `R_i` is the propagation matrix of slice `i`. Solving the fine operator
//! against the initial-condition right-hand side gives the serial fine solution.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::PararealOptions;
use crate::error::PararealError;
use crate::matrix::{CsrMatrix, TripletBuilder};
use crate::parallel::{Executor, SweepExecutor};
use crate::propagator::PropagatorRef;
use crate::solution::Solution;

pub mod slice;
pub use slice::{Role, TimeSlice};

/// Ordered partition of `[tstart, tend]` into equal-length time slices.
#[derive(Debug)]
pub struct TimeMesh {
    tstart: f64,
    tend: f64,
    ndof: usize,
    initial: Solution,
    slices: Vec<TimeSlice>,
    executor: SweepExecutor,
}

impl TimeMesh {
    /// Partition the horizon into `options.nslices` slices. Every slice starts from
    /// `initial` until the first coarse sweep seeds it.
    pub fn build(
        options: &PararealOptions,
        coarse: PropagatorRef,
        fine: PropagatorRef,
        initial: &Solution,
    ) -> Result<Self, PararealError> {
        options.validate_mesh()?;
        let n = options.nslices;
        let slices = options
            .slice_boundaries()
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                TimeSlice::new(
                    i,
                    (w[0], w[1]),
                    (options.n_fine, options.n_coarse),
                    Arc::clone(&coarse),
                    Arc::clone(&fine),
                    initial.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(nslices = n, ndof = initial.ndof(), "built time mesh on [{}, {}]", options.tstart, options.tend);
        Ok(Self {
            tstart: options.tstart,
            tend: options.tend,
            ndof: initial.ndof(),
            initial: initial.clone(),
            slices,
            executor: SweepExecutor::default(),
        })
    }

    /// Use `executor` for the fine sweep.
    pub fn with_executor(mut self, executor: SweepExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn tstart(&self) -> f64 {
        self.tstart
    }

    pub fn tend(&self) -> f64 {
        self.tend
    }

    pub fn ndof(&self) -> usize {
        self.ndof
    }

    pub fn nslices(&self) -> usize {
        self.slices.len()
    }

    pub fn initial_value(&self) -> &Solution {
        &self.initial
    }

    pub fn slices(&self) -> &[TimeSlice] {
        &self.slices
    }

    pub fn slice(&self, i: usize) -> Option<&TimeSlice> {
        self.slices.get(i)
    }

    /// The slice ending at `tend`.
    pub fn last_slice(&self) -> Option<&TimeSlice> {
        self.slices.last()
    }

    pub(crate) fn slice_mut(&mut self, i: usize) -> Option<&mut TimeSlice> {
        self.slices.get_mut(i)
    }

    pub fn executor(&self) -> &SweepExecutor {
        &self.executor
    }

    /// Sequential coarse sweep from the initial value; each slice's coarse end value
    /// becomes the next slice's start value.
    pub fn run_coarse(&mut self) -> Result<(), PararealError> {
        let mut u = self.initial.clone();
        for slice in &mut self.slices {
            slice.set_start(u);
            u = slice.run_coarse()?.clone();
            trace!(slice = slice.index(), "coarse predictor done");
        }
        debug!(nslices = self.slices.len(), "coarse sweep done");
        Ok(())
    }

    /// Fine propagation of every slice from its current start value. Slices are
    /// independent here, so the sweep runs on the configured executor.
    pub fn run_fine(&mut self) -> Result<(), PararealError> {
        self.executor
            .for_each_mut(&mut self.slices, |slice| slice.run_fine())?;
        debug!(nslices = self.slices.len(), workers = self.executor.size(), "fine sweep done");
        Ok(())
    }

    /// Serial fine propagation over the whole horizon; returns the end value of
    /// every slice.
    pub fn serial_fine(&self, u0: &Solution) -> Result<Vec<Solution>, PararealError> {
        PararealError::check_dim(self.ndof, u0.ndof())?;
        let mut ends = Vec::with_capacity(self.slices.len());
        let mut u = u0.clone();
        for slice in &self.slices {
            u = slice.propagator(Role::Fine).advance(&u, slice.t_start(), slice.t_end(), slice.n_fine())?;
            ends.push(u.clone());
        }
        Ok(ends)
    }

    /// Current end value of every slice, `None` before the first coarse sweep.
    pub fn end_values(&self) -> Option<Vec<&Solution>> {
        self.slices.iter().map(TimeSlice::end_value).collect()
    }

    /// `[u0; end_0; ...; end_{n-1}]` as one global vector.
    pub fn stacked_end_values(&self) -> Option<Vec<f64>> {
        let ends = self.end_values()?;
        let mut y = Vec::with_capacity(self.global_dim());
        y.extend_from_slice(self.initial.values());
        for end in ends {
            y.extend_from_slice(end.values());
        }
        Some(y)
    }

    /// Size of the global stacked vector, `ndof * (nslices + 1)`.
    pub fn global_dim(&self) -> usize {
        self.ndof * (self.slices.len() + 1)
    }

    /// Right-hand side `[u0; 0; ...; 0]` of the global systems.
    pub fn get_global_rhs(&self, u0: &Solution) -> Result<Vec<f64>, PararealError> {
        PararealError::check_dim(self.ndof, u0.ndof())?;
        let mut b = vec![0.0; self.global_dim()];
        b[..self.ndof].copy_from_slice(u0.values());
        Ok(b)
    }

    fn global_operator(&self, role: Role, u0: &Solution) -> Result<CsrMatrix, PararealError> {
        PararealError::check_dim(self.ndof, u0.ndof())?;
        let n = self.ndof;
        let dim = self.global_dim();
        let mut builder = TripletBuilder::new(dim, dim);
        builder.push_identity(0, 0, n, 1.0);
        for (i, slice) in self.slices.iter().enumerate() {
            let r = slice.update_matrix(role, u0.operators())?;
            builder.push_block_scaled((i + 1) * n, i * n, &r, -1.0);
            builder.push_identity((i + 1) * n, (i + 1) * n, n, 1.0);
        }
        let op = builder.build();
        trace!(?role, nnz = op.nnz(), "assembled global operator");
        Ok(op)
    }

    /// Global fine operator; see the module documentation for its block layout.
    pub fn get_fine_matrix(&self, u0: &Solution) -> Result<CsrMatrix, PararealError> {
        self.global_operator(Role::Fine, u0)
    }

    /// Global coarse operator.
    pub fn get_coarse_matrix(&self, u0: &Solution) -> Result<CsrMatrix, PararealError> {
        self.global_operator(Role::Coarse, u0)
    }
}
