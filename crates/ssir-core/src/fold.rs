//! Constant evaluation over `ConstValue`, parameterized by type.
//!
//! Shared by the constant propagator (which folds at the result type) and the
//! interpreter (which evaluates the same ops at run time). Integer arithmetic
//! wraps two's-complement at the type's bit width and respects signedness;
//! floating point follows IEEE-754, with Float32 results narrowed through
//! `f32`. Evaluations that have no defined result (division by zero,
//! oversized shifts, category mismatches) return `None` rather than guessing.
//!
//! Vector types evaluate with their element type's scalar semantics: a
//! constant of vector type is a broadcast scalar, so `Vector<UInt32, 4>`
//! arithmetic on two broadcast constants is UInt32 arithmetic.

use crate::ops::Opcode;
use crate::type_table::{TypeId, TypeTable};
use crate::types::{ConstValue, Type};

/// The scalar category a type evaluates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int { bits: u8, unsigned: bool },
    Real { bits: u8 },
    Bytes,
    Exception,
    Other,
}

/// Resolves a type to its scalar category, chasing typedefs and vector
/// element types.
pub fn scalar_kind(types: &TypeTable, ty: TypeId) -> ScalarKind {
    let resolved = types.resolve_typedef(ty);
    match types.kind(resolved) {
        Type::Bool => ScalarKind::Bool,
        Type::Int { bits, unsigned } => ScalarKind::Int { bits: *bits, unsigned: *unsigned },
        Type::Real { bits } => ScalarKind::Real { bits: *bits },
        Type::Bytes => ScalarKind::Bytes,
        Type::Exception => ScalarKind::Exception,
        Type::Vector { base, .. } => scalar_kind(types, *base),
        _ => ScalarKind::Other,
    }
}

/// Truncates to `bits` and re-extends per signedness, returning the i64 bit
/// pattern the IR stores.
pub(crate) fn wrap_int(v: i128, bits: u8, unsigned: bool) -> i64 {
    if bits >= 64 {
        return v as i64;
    }
    let mask = (1i128 << bits) - 1;
    let t = v & mask;
    if unsigned {
        t as i64
    } else {
        let sign = 1i128 << (bits - 1);
        (if t & sign != 0 { t - (1i128 << bits) } else { t }) as i64
    }
}

/// Reads the stored bit pattern as the mathematical value of the given
/// width/signedness.
fn interp_int(pattern: i64, bits: u8, unsigned: bool) -> i128 {
    if unsigned {
        let mask: u128 = if bits >= 64 {
            u64::MAX as u128
        } else {
            (1u128 << bits) - 1
        };
        (pattern as u64 as u128 & mask) as i128
    } else {
        wrap_int(pattern as i128, bits, false) as i128
    }
}

fn as_int(v: &ConstValue) -> Option<i64> {
    match v {
        ConstValue::Int(i) => Some(*i),
        _ => None,
    }
}

fn as_real(v: &ConstValue) -> Option<f64> {
    match v {
        ConstValue::Real(r) => Some(*r),
        _ => None,
    }
}

fn as_bool(v: &ConstValue) -> Option<bool> {
    match v {
        ConstValue::Bool(b) => Some(*b),
        _ => None,
    }
}

/// Evaluates a binary arithmetic op at the given result type.
pub fn binary(
    types: &TypeTable,
    opcode: Opcode,
    a: &ConstValue,
    b: &ConstValue,
    result_ty: TypeId,
) -> Option<ConstValue> {
    match scalar_kind(types, result_ty) {
        ScalarKind::Int { bits, unsigned } => {
            let x = interp_int(as_int(a)?, bits, unsigned);
            let y = interp_int(as_int(b)?, bits, unsigned);
            let raw = match opcode {
                Opcode::Add => x + y,
                Opcode::Sub => x - y,
                Opcode::Mul => x * y,
                Opcode::Div => {
                    if y == 0 {
                        return None;
                    }
                    x / y
                }
                Opcode::Mod => {
                    if y == 0 {
                        return None;
                    }
                    x % y
                }
                Opcode::Lshift => {
                    if !(0..i128::from(bits)).contains(&y) {
                        return None;
                    }
                    x << y
                }
                Opcode::Rshift => {
                    if !(0..i128::from(bits)).contains(&y) {
                        return None;
                    }
                    x >> y
                }
                Opcode::Bitand => x & y,
                Opcode::Bitor => x | y,
                Opcode::Bitxor => x ^ y,
                _ => return None,
            };
            Some(ConstValue::Int(wrap_int(raw, bits, unsigned)))
        }
        ScalarKind::Real { bits } => {
            let x = as_real(a)?;
            let y = as_real(b)?;
            let raw = match opcode {
                Opcode::Add => x + y,
                Opcode::Sub => x - y,
                Opcode::Mul => x * y,
                Opcode::Div => x / y,
                Opcode::Mod => x % y,
                _ => return None,
            };
            let raw = if bits == 32 { f64::from(raw as f32) } else { raw };
            Some(ConstValue::Real(raw))
        }
        ScalarKind::Bool => {
            let x = as_bool(a)?;
            let y = as_bool(b)?;
            let raw = match opcode {
                Opcode::Bitand => x & y,
                Opcode::Bitor => x | y,
                Opcode::Bitxor => x ^ y,
                _ => return None,
            };
            Some(ConstValue::Bool(raw))
        }
        _ => None,
    }
}

/// Evaluates a unary arithmetic op at the given result type.
pub fn unary(
    types: &TypeTable,
    opcode: Opcode,
    a: &ConstValue,
    result_ty: TypeId,
) -> Option<ConstValue> {
    match opcode {
        Opcode::Not => Some(ConstValue::Bool(!as_bool(a)?)),
        Opcode::Uadd => Some(a.clone()),
        Opcode::Usub | Opcode::Invert => match scalar_kind(types, result_ty) {
            ScalarKind::Int { bits, unsigned } => {
                let x = interp_int(as_int(a)?, bits, unsigned);
                let raw = if opcode == Opcode::Usub { -x } else { !x };
                Some(ConstValue::Int(wrap_int(raw, bits, unsigned)))
            }
            ScalarKind::Real { .. } if opcode == Opcode::Usub => {
                Some(ConstValue::Real(-as_real(a)?))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Evaluates a comparison under the operand type's semantics; the result is
/// always Bool.
pub fn compare(
    types: &TypeTable,
    opcode: Opcode,
    a: &ConstValue,
    b: &ConstValue,
    operand_ty: TypeId,
) -> Option<ConstValue> {
    let result = match scalar_kind(types, operand_ty) {
        ScalarKind::Int { bits, unsigned } => {
            let x = interp_int(as_int(a)?, bits, unsigned);
            let y = interp_int(as_int(b)?, bits, unsigned);
            match opcode {
                Opcode::Eq => x == y,
                Opcode::Ne => x != y,
                Opcode::Lt => x < y,
                Opcode::Le => x <= y,
                Opcode::Gt => x > y,
                Opcode::Ge => x >= y,
                _ => return None,
            }
        }
        ScalarKind::Real { .. } => {
            let x = as_real(a)?;
            let y = as_real(b)?;
            match opcode {
                Opcode::Eq => x == y,
                Opcode::Ne => x != y,
                Opcode::Lt => x < y,
                Opcode::Le => x <= y,
                Opcode::Gt => x > y,
                Opcode::Ge => x >= y,
                _ => return None,
            }
        }
        ScalarKind::Bool => {
            let x = as_bool(a)?;
            let y = as_bool(b)?;
            match opcode {
                Opcode::Eq => x == y,
                Opcode::Ne => x != y,
                _ => return None,
            }
        }
        ScalarKind::Bytes | ScalarKind::Exception => match opcode {
            Opcode::Eq => a == b,
            Opcode::Ne => a != b,
            _ => return None,
        },
        ScalarKind::Other => return None,
    };
    Some(ConstValue::Bool(result))
}

/// Evaluates a `convert` to the target type.
pub fn convert(types: &TypeTable, value: &ConstValue, target: TypeId) -> Option<ConstValue> {
    types.convert_const(value, target).ok()
}
