//! Core error types for ssir-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the type system, the IR data model, and the verifier.

use crate::id::{BlockId, OpId};
use crate::type_table::TypeId;
use thiserror::Error;

/// Core errors produced by the ssir-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempting to register a typedef name that already exists in the table.
    #[error("duplicate typedef name: '{name}'")]
    DuplicateTypedef { name: String },

    /// A struct-only operation was applied to a non-struct type.
    #[error("type is not a struct: {id}")]
    NotAStruct { id: TypeId },

    /// Field names must be unique within one struct.
    #[error("duplicate struct field: '{name}'")]
    DuplicateField { name: String },

    /// The textual type grammar could not be parsed.
    #[error("cannot parse type '{input}': {message}")]
    TypeParse { input: String, message: String },

    /// A constant literal cannot be coerced into the target scalar category.
    #[error("cannot convert constant to '{target}'")]
    ConstConversion { target: String },

    /// Operand types incompatible with an opcode.
    #[error("type mismatch in '{context}': {reason}")]
    TypeMismatch { context: String, reason: String },

    /// Phi construction with disagreeing predecessor/value arities.
    #[error("phi arity mismatch: {preds} predecessors vs {values} values")]
    PhiArityMismatch { preds: usize, values: usize },

    /// Broken SSA, dangling use, missing terminator, bad leaders, and friends.
    #[error("malformed IR in '{function}': {reason}")]
    MalformedIr { function: String, reason: String },

    /// An op id that is not linked into the block it was expected in.
    #[error("op {op} is not linked into a block")]
    UnlinkedOp { op: OpId },

    /// A block id that is not part of the function's block list.
    #[error("block {block} is not part of the function")]
    UnknownBlock { block: BlockId },

    /// Adding a function under a name that is already taken in the module.
    #[error("duplicate function: '{name}'")]
    DuplicateFunction { name: String },

    /// Looking up a function that the module does not contain.
    #[error("function not found: '{name}'")]
    FunctionNotFound { name: String },
}
