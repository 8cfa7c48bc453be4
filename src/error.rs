use thiserror::Error;

// Unified error type for parareal

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PararealError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("dimension mismatch: expected {expected}, found {found}")]
    Dimension { expected: usize, found: usize },
    #[error("solutions carry incompatible operators (A, M)")]
    IncompatibleOperators,
    #[error("singular linear system: {0}")]
    SingularSystem(String),
    #[error("invalid CSR structure: {0}")]
    InvalidCsr(String),
}

impl PararealError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PararealError::Configuration(msg.into())
    }

    /// Returns `Ok(())` when `found == expected`, a `Dimension` error otherwise.
    pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(PararealError::Dimension { expected, found })
        }
    }
}
