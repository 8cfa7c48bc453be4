//! parareal: parallel-in-time integration of `M u' = A u` over Faer
//!
//! This crate splits a time horizon into slices, runs a cheap coarse propagator
//! sequentially and an expensive fine propagator in parallel across the slices, and
//! corrects iteratively until the result matches the serial fine solution. The same
//! iteration is available in matrix form for verification and stability analysis.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use parareal::{BackwardEuler, CsrMatrix, Parareal, PararealOptions, Solution};
//!
//! let u0 = Solution::new(vec![1.0], CsrMatrix::from_diagonal(&[-2.0]), CsrMatrix::identity(1))?;
//! let opts = PararealOptions::new(0.0, 1.0, 4).with_steps(8, 1).with_tolerance(0.0).with_maxiter(4);
//! let mut para = Parareal::new(opts, Arc::new(BackwardEuler), Arc::new(BackwardEuler), u0)?;
//! let stats = para.run()?;
//! assert_eq!(stats.iterations, 4);
//! # Ok::<(), parareal::PararealError>(())
//! ```

pub mod parallel;

pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod matrix;
pub mod propagator;
pub mod solution;
pub mod solver;
pub mod timemesh;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use controller::*;
pub use self::core::*;
pub use error::*;
pub use matrix::*;
pub use propagator::*;
pub use solution::*;
pub use solver::*;
pub use timemesh::*;
pub use utils::*;
