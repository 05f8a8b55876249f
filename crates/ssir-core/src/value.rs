//! Values and operands: what ops consume.
//!
//! A [`Value`] names a definition -- an op result, a constant, a function
//! argument, a global, or a block label. Ops reference values through
//! [`Operand`] trees, which may nest lists (phi predecessor/value lists, call
//! argument lists). Values are cheap to clone and hashable, which makes them
//! the key of the function-level uses-map.

use serde::{Deserialize, Serialize};

use crate::id::{BlockId, ConstId, OpId};
use crate::type_table::TypeId;
use crate::types::ConstValue;

/// A reference to a definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// The result of an op.
    Op(OpId),
    /// A constant from the function's constant arena.
    Const(ConstId),
    /// A function argument, by position.
    Arg(u32),
    /// A module-level global or function, by name.
    Global(String),
    /// A block label.
    Block(BlockId),
}

/// A constant literal together with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Const {
    pub value: ConstValue,
    pub ty: TypeId,
}

/// One op argument: a value or a nested list of operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Value(Value),
    List(Vec<Operand>),
}

impl Operand {
    /// Visits every value in the operand tree, depth-first.
    pub fn for_each_value<F: FnMut(&Value)>(&self, f: &mut F) {
        match self {
            Operand::Value(v) => f(v),
            Operand::List(items) => {
                for item in items {
                    item.for_each_value(f);
                }
            }
        }
    }

    /// Rebuilds the operand tree with every value passed through `f`.
    pub fn map_values<F: FnMut(&Value) -> Value>(&self, f: &mut F) -> Operand {
        match self {
            Operand::Value(v) => Operand::Value(f(v)),
            Operand::List(items) => {
                Operand::List(items.iter().map(|item| item.map_values(f)).collect())
            }
        }
    }

    /// Returns the value if this operand is a plain value.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(v) => Some(v),
            Operand::List(_) => None,
        }
    }

    /// Returns the nested operands if this operand is a list.
    pub fn as_list(&self) -> Option<&[Operand]> {
        match self {
            Operand::Value(_) => None,
            Operand::List(items) => Some(items),
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

/// Collects every value referenced by a slice of operands, in order.
pub fn collect_values(args: &[Operand]) -> Vec<Value> {
    let mut out = Vec::new();
    for arg in args {
        arg.for_each_value(&mut |v| out.push(v.clone()));
    }
    out
}
