//! Direct solver interface.

pub mod direct_lu;
pub use direct_lu::LuSolver;
