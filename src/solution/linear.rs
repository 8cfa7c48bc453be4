//! State vector of the linear ODE `M u' = A u`.
//!
//! A [`Solution`] pairs a value vector with the shared operator pair `(A, M)`
//! that defines its ODE. Solutions are values: every arithmetic operation
//! returns a new `Solution` and leaves its inputs untouched, so iterates kept in
//! a history stay valid after later iterations.

use std::sync::Arc;

use faer::Mat;

use crate::core::traits::{InnerProduct, MatShape};
use crate::core::wrappers::max_abs_diff;
use crate::error::PararealError;
use crate::matrix::CsrMatrix;

/// Selects one of the two operators of the ODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// System operator A
    A,
    /// Mass matrix M
    M,
}

/// The operator pair `(A, M)` of `M u' = A u`.
///
/// Dense copies are built once at construction; implicit propagators factor
/// `M - Δt·A` from them on every call.
#[derive(Debug)]
pub struct LinearOperators {
    a: CsrMatrix,
    m: CsrMatrix,
    a_dense: Mat<f64>,
    m_dense: Mat<f64>,
}

impl LinearOperators {
    /// Validate that A and M are square and of equal size.
    pub fn new(a: CsrMatrix, m: CsrMatrix) -> Result<Self, PararealError> {
        PararealError::check_dim(a.nrows(), a.ncols())?;
        PararealError::check_dim(m.nrows(), m.ncols())?;
        PararealError::check_dim(a.nrows(), m.nrows())?;
        let a_dense = a.to_dense();
        let m_dense = m.to_dense();
        Ok(Self { a, m, a_dense, m_dense })
    }

    pub fn ndof(&self) -> usize {
        self.a.nrows()
    }

    pub fn operator(&self, kind: OperatorKind) -> &CsrMatrix {
        match kind {
            OperatorKind::A => &self.a,
            OperatorKind::M => &self.m,
        }
    }

    pub fn dense(&self, kind: OperatorKind) -> &Mat<f64> {
        match kind {
            OperatorKind::A => &self.a_dense,
            OperatorKind::M => &self.m_dense,
        }
    }

    /// `M + alpha·A` as a dense matrix.
    pub fn shifted(&self, alpha: f64) -> Mat<f64> {
        crate::matrix::dense::add_scaled(&self.m_dense, alpha, &self.a_dense)
    }

    /// Apply A or M to `x` without touching any state.
    pub fn apply(&self, kind: OperatorKind, x: &[f64]) -> Result<Vec<f64>, PararealError> {
        let mut y = vec![0.0; self.ndof()];
        self.operator(kind).spmv(x, &mut y)?;
        Ok(y)
    }
}

/// Solutions may only be combined when their operators agree.
fn compatible(lhs: &Arc<LinearOperators>, rhs: &Arc<LinearOperators>) -> bool {
    Arc::ptr_eq(lhs, rhs) || (lhs.a == rhs.a && lhs.m == rhs.m)
}

/// A state vector `y` together with the operators `(A, M)` of its ODE.
#[derive(Clone, Debug)]
pub struct Solution {
    y: Vec<f64>,
    ops: Arc<LinearOperators>,
}

impl Solution {
    /// Build a solution from a vector and the two operators.
    ///
    /// # Errors
    /// `Dimension` if `y`, `A` and `M` do not share one size.
    pub fn new(y: Vec<f64>, a: CsrMatrix, m: CsrMatrix) -> Result<Self, PararealError> {
        Self::with_operators(y, Arc::new(LinearOperators::new(a, m)?))
    }

    /// Build a solution on an existing operator pair.
    pub fn with_operators(y: Vec<f64>, ops: Arc<LinearOperators>) -> Result<Self, PararealError> {
        PararealError::check_dim(ops.ndof(), y.len())?;
        Ok(Self { y, ops })
    }

    /// New solution with the same operators and a different value vector.
    pub fn with_values(&self, y: Vec<f64>) -> Result<Self, PararealError> {
        Self::with_operators(y, Arc::clone(&self.ops))
    }

    pub fn zeros_like(&self) -> Self {
        Self { y: vec![0.0; self.ndof()], ops: Arc::clone(&self.ops) }
    }

    /// j-th unit vector on the same operators.
    ///
    /// # Errors
    /// `Dimension` if `j >= ndof`.
    pub fn unit(&self, j: usize) -> Result<Self, PararealError> {
        let mut y = vec![0.0; self.ndof()];
        let entry = y
            .get_mut(j)
            .ok_or(PararealError::Dimension { expected: self.ndof(), found: j + 1 })?;
        *entry = 1.0;
        Ok(Self { y, ops: Arc::clone(&self.ops) })
    }

    pub fn ndof(&self) -> usize {
        self.y.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.y
    }

    pub fn into_values(self) -> Vec<f64> {
        self.y
    }

    pub fn operators(&self) -> &Arc<LinearOperators> {
        &self.ops
    }

    /// A·x or M·x.
    ///
    /// # Errors
    /// `Dimension` if `x.len() != ndof`.
    pub fn apply_operator(&self, kind: OperatorKind, x: &[f64]) -> Result<Vec<f64>, PararealError> {
        self.ops.apply(kind, x)
    }

    fn combine(&self, other: &Solution, f: impl Fn(f64, f64) -> f64) -> Result<Self, PararealError> {
        if !compatible(&self.ops, &other.ops) {
            return Err(PararealError::IncompatibleOperators);
        }
        PararealError::check_dim(self.ndof(), other.ndof())?;
        let y = self.y.iter().zip(&other.y).map(|(&a, &b)| f(a, b)).collect();
        Ok(Self { y, ops: Arc::clone(&self.ops) })
    }

    /// self + other
    pub fn add(&self, other: &Solution) -> Result<Self, PararealError> {
        self.combine(other, |a, b| a + b)
    }

    /// self - other
    pub fn sub(&self, other: &Solution) -> Result<Self, PararealError> {
        self.combine(other, |a, b| a - b)
    }

    /// self + alpha * other
    pub fn axpy(&self, alpha: f64, other: &Solution) -> Result<Self, PararealError> {
        self.combine(other, |a, b| a + alpha * b)
    }

    /// alpha * self
    pub fn scale(&self, alpha: f64) -> Self {
        Self {
            y: self.y.iter().map(|v| alpha * v).collect(),
            ops: Arc::clone(&self.ops),
        }
    }

    /// Infinity norm.
    pub fn norm(&self) -> f64 {
        ().norm_inf(self.values())
    }

    pub fn norm_l2(&self) -> f64 {
        ().norm(self.values())
    }

    /// ‖self − other‖∞ without checking operators.
    pub fn max_abs_diff(&self, other: &Solution) -> Result<f64, PararealError> {
        PararealError::check_dim(self.ndof(), other.ndof())?;
        Ok(max_abs_diff(&self.y, &other.y))
    }

    /// Entrywise comparison of the value vectors.
    pub fn approx_eq(&self, other: &Solution, tol: f64) -> bool {
        self.ndof() == other.ndof() && max_abs_diff(&self.y, &other.y) <= tol
    }
}

impl AsRef<[f64]> for Solution {
    fn as_ref(&self) -> &[f64] {
        &self.y
    }
}
