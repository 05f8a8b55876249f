//! Pass error types.

use ssir_core::CoreError;
use thiserror::Error;

/// Errors raised by IR passes.
#[derive(Debug, Error)]
pub enum PassError {
    /// A pass was invoked on IR violating its assumptions. Raised eagerly,
    /// before any mutation.
    #[error("pass precondition violated: {reason}")]
    Precondition { reason: String },

    /// An underlying model operation failed mid-pass. Callers should assume
    /// the IR is invalidated and discard it.
    #[error(transparent)]
    Core(#[from] CoreError),
}
