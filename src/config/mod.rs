//! Configuration for Parareal runs.

pub mod options;
pub use options::PararealOptions;
