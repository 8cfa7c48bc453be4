//! Matrix module: sparse CSR operators, block assembly and dense helpers.

pub mod dense;
pub mod sparse;
pub use sparse::{CsrMatrix, TripletBuilder};
