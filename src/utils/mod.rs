//! Convergence utilities.

pub mod convergence;
pub use convergence::{Convergence, RunStats};
