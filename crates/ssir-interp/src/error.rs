//! Runtime errors of the tracing interpreter.

use thiserror::Error;

/// Trap conditions surfaced while executing IR.
#[derive(Debug, Error, PartialEq)]
pub enum ExecError {
    /// An `exc_throw` (or failing `check_error`) propagated to the caller.
    #[error("exception: {kind}")]
    Exception { kind: String },

    /// The module has no function under this name.
    #[error("unknown function: '{name}'")]
    UnknownFunction { name: String },

    /// Wrong number of call arguments.
    #[error("function '{name}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// The interpreter does not model this opcode.
    #[error("unsupported op in the interpreter: {opcode}")]
    UnsupportedOp { opcode: String },

    /// The op could not be evaluated on the given operand values
    /// (division by zero, category mismatch, non-Bool branch condition).
    #[error("cannot evaluate '{opcode}' on the given operands")]
    EvalFailed { opcode: String },

    /// A `load` read a slot no `store` has written yet.
    #[error("load from an uninitialized slot")]
    UninitializedLoad,

    /// The function broke an interpreter assumption mid-flight.
    #[error("malformed function: {reason}")]
    Malformed { reason: String },

    /// Runaway recursion guard.
    #[error("call depth exceeded")]
    CallDepthExceeded,
}
