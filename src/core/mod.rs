//! Core traits and their implementations for faer matrices and slices.

pub mod traits;
pub mod wrappers;

pub use traits::{InnerProduct, MatShape, MatVec};
pub use wrappers::max_abs_diff;
