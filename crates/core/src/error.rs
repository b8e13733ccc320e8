//! Error types shared by the operator constructors and applications.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OperatorError>;

/// Failures raised while building or applying a measurement operator.
///
/// Allocation failure is not represented: buffers come from the global
/// allocator, which aborts on exhaustion.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid sparse matrix: {0}")]
    InvalidSparseMatrix(String),

    #[error("FFT backend failure: {0}")]
    Fft(String),
}

impl OperatorError {
    /// `Ok` when a buffer has the length an operator expects, otherwise
    /// [`OperatorError::DimensionMismatch`] naming the buffer.
    pub fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(OperatorError::DimensionMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}
