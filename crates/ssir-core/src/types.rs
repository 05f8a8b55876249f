//! The ssir type system.
//!
//! Provides the complete set of IR types: scalars (Bool, signed and unsigned
//! Int of any width, Real), arrays, vectors, pointers, function signatures,
//! structs with ordered named fields, and the special Void, Exception, Bytes
//! and Opaque types, plus named typedefs.
//!
//! Types are structural and possibly recursive. They live in a
//! [`TypeTable`](crate::type_table::TypeTable) and are addressed by
//! [`TypeId`](crate::type_table::TypeId); structural equality, hashing and
//! formatting are table operations because they must chase ids.

use serde::{Deserialize, Serialize};

use crate::type_table::TypeId;

/// The ssir type system. Each variant represents a distinct kind of type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The empty type of value-less ops (`store`, terminators).
    Void,

    /// Single-bit truth type.
    Bool,

    /// Integer of a given bit width. Signedness is part of the type; a single
    /// variant with an `unsigned` attribute rather than parallel signed and
    /// unsigned families.
    Int { bits: u8, unsigned: bool },

    /// IEEE-754 floating point of a given bit width (32 or 64).
    Real { bits: u8 },

    /// Fixed-size array: `base[count]`.
    Array { base: TypeId, count: u32 },

    /// SIMD-style vector: `Vector<base, count>`.
    Vector { base: TypeId, count: u32 },

    /// Pointer to another type.
    Pointer { base: TypeId },

    /// Function signature.
    Function {
        restype: TypeId,
        argtypes: Vec<TypeId>,
        varargs: bool,
    },

    /// Struct with ordered field names and a parallel list of field types.
    /// Field names are unique within one struct. Structs may reference
    /// themselves, directly or through a pointer.
    Struct { names: Vec<String>, types: Vec<TypeId> },

    /// A runtime exception value.
    Exception,

    /// A byte string.
    Bytes,

    /// A type no assumptions are made about.
    Opaque,

    /// Named alias for another type. Transparent for equality and for every
    /// operation that needs concrete shape; the name is kept for diagnostics.
    Typedef { name: String, target: TypeId },
}

/// Constant literal values carried by [`Const`](crate::value::Const).
///
/// `Int` stores the two's-complement bit pattern in an `i64`; the constant's
/// type decides how the pattern is interpreted (width and signedness). `Real`
/// stores `f64` for both Float32 and Float64 constants, with narrowing applied
/// where 32-bit semantics matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Bytes(Vec<u8>),
    /// An exception kind, named.
    Exception(String),
}

impl ConstValue {
    /// Maps a literal to its default type, the way untyped host scalars enter
    /// the IR: booleans are `Bool`, integers `Int32`, floats `Float64`, byte
    /// strings `Bytes`, exception kinds `Exception`.
    pub fn default_type(&self) -> TypeId {
        match self {
            ConstValue::Bool(_) => TypeId::BOOL,
            ConstValue::Int(_) => TypeId::INT32,
            ConstValue::Real(_) => TypeId::FLOAT64,
            ConstValue::Bytes(_) => TypeId::BYTES,
            ConstValue::Exception(_) => TypeId::EXCEPTION,
        }
    }

    /// Returns a human-readable name of the literal's scalar family.
    pub fn family(&self) -> &'static str {
        match self {
            ConstValue::Bool(_) => "Bool",
            ConstValue::Int(_) => "Int",
            ConstValue::Real(_) => "Real",
            ConstValue::Bytes(_) => "Bytes",
            ConstValue::Exception(_) => "Exception",
        }
    }
}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Int(i) => write!(f, "{i}"),
            ConstValue::Real(r) => write!(f, "{r}"),
            ConstValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            ConstValue::Exception(k) => write!(f, "exception<{k}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_types_of_literals() {
        assert_eq!(ConstValue::Bool(true).default_type(), TypeId::BOOL);
        assert_eq!(ConstValue::Int(7).default_type(), TypeId::INT32);
        assert_eq!(ConstValue::Real(1.5).default_type(), TypeId::FLOAT64);
        assert_eq!(ConstValue::Bytes(b"x".to_vec()).default_type(), TypeId::BYTES);
        assert_eq!(
            ConstValue::Exception("RuntimeError".into()).default_type(),
            TypeId::EXCEPTION
        );
    }

    #[test]
    fn serde_roundtrip_const_values() {
        let vals = vec![
            ConstValue::Bool(true),
            ConstValue::Int(-42),
            ConstValue::Real(2.718281828),
            ConstValue::Bytes(b"spam".to_vec()),
            ConstValue::Exception("ZeroDivisionError".into()),
        ];
        for val in &vals {
            let json = serde_json::to_string(val).unwrap();
            let back: ConstValue = serde_json::from_str(&json).unwrap();
            assert_eq!(*val, back);
        }
    }

    #[test]
    fn display_forms() {
        assert_eq!(ConstValue::Int(5).to_string(), "5");
        assert_eq!(ConstValue::Bool(false).to_string(), "false");
        assert_eq!(
            ConstValue::Exception("KeyError".into()).to_string(),
            "exception<KeyError>"
        );
    }
}
