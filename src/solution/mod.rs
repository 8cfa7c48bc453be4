//! Solution values of linear initial-value problems.

pub mod linear;
pub use linear::{LinearOperators, OperatorKind, Solution};
