//! Op: a single typed operation.
//!
//! Ops live in the op arena of their [`Function`](crate::function::Function)
//! and are addressed by [`OpId`](crate::id::OpId). Their argument lists are
//! private; all mutation goes through the function (`set_args`,
//! `replace_args`, `add_metadata`, `delete`, `unlink`) so the uses-map stays
//! consistent.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::id::BlockId;
use crate::ops::Opcode;
use crate::type_table::TypeId;
use crate::value::{Operand, Value};

/// A single operation: opcode, result type, unique result name, argument
/// tree, and an optional metadata map.
#[derive(Debug, Clone)]
pub struct Op {
    pub opcode: Opcode,
    /// Result type; `Void` for value-less ops.
    pub ty: TypeId,
    /// Result name, unique within the function.
    pub name: String,
    pub(crate) args: SmallVec<[Operand; 2]>,
    pub(crate) metadata: IndexMap<String, Value>,
    pub(crate) block: Option<BlockId>,
}

impl Op {
    pub(crate) fn new(opcode: Opcode, ty: TypeId, name: String, args: Vec<Operand>) -> Self {
        Op {
            opcode,
            ty,
            name,
            args: SmallVec::from_vec(args),
            metadata: IndexMap::new(),
            block: None,
        }
    }

    /// The argument operands, in order.
    pub fn args(&self) -> &[Operand] {
        &self.args
    }

    /// The metadata map (well-known keys such as `exc.badval`, `exc.raise`).
    pub fn metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }

    /// The block this op is linked into, if any.
    pub fn block(&self) -> Option<BlockId> {
        self.block
    }

    /// Convenience: the n-th argument when it is a plain value.
    pub fn arg_value(&self, index: usize) -> Option<&Value> {
        self.args.get(index).and_then(Operand::as_value)
    }

    /// Phi arguments as parallel predecessor and value lists.
    ///
    /// Returns `None` when the op is not a phi or its args do not have the
    /// `[preds, values]` shape.
    pub fn phi_args(&self) -> Option<(Vec<BlockId>, Vec<Value>)> {
        if self.opcode != Opcode::Phi {
            return None;
        }
        let preds = self.args.first()?.as_list()?;
        let values = self.args.get(1)?.as_list()?;
        let preds: Option<Vec<BlockId>> = preds
            .iter()
            .map(|o| match o.as_value() {
                Some(Value::Block(b)) => Some(*b),
                _ => None,
            })
            .collect();
        let values: Option<Vec<Value>> =
            values.iter().map(|o| o.as_value().cloned()).collect();
        Some((preds?, values?))
    }
}
