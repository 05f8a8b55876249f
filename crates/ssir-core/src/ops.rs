//! The fixed opcode vocabulary.
//!
//! Opcodes are grouped the way passes consume them: binary arithmetic, unary
//! arithmetic, comparisons, memory, control flow, calls, exceptions and
//! conversion. Predicates cover the properties passes branch on: terminators,
//! leaders (phis), the effect-free subset used by dead-code elimination, and
//! the foldable subset used by constant propagation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every operation the IR knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // -- Arithmetic --
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lshift,
    Rshift,
    Bitand,
    Bitor,
    Bitxor,
    Invert,
    Not,
    Uadd,
    Usub,

    // -- Comparison --
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // -- Memory --
    Alloca,
    Load,
    Store,
    Ptrload,
    Ptrcast,
    PtrIsNull,
    Getfield,
    Getindex,
    Addressof,

    // -- Control --
    Jump,
    Cbranch,
    Ret,
    Phi,

    // -- Calls --
    Call,
    CheckError,

    // -- Exceptions --
    NewExc,
    ExcThrow,
    ExcSetup,

    // -- Conversion --
    Convert,
}

impl Opcode {
    /// The opcode's stable textual name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Lshift => "lshift",
            Opcode::Rshift => "rshift",
            Opcode::Bitand => "bitand",
            Opcode::Bitor => "bitor",
            Opcode::Bitxor => "bitxor",
            Opcode::Invert => "invert",
            Opcode::Not => "not",
            Opcode::Uadd => "uadd",
            Opcode::Usub => "usub",
            Opcode::Eq => "eq",
            Opcode::Ne => "ne",
            Opcode::Lt => "lt",
            Opcode::Le => "le",
            Opcode::Gt => "gt",
            Opcode::Ge => "ge",
            Opcode::Alloca => "alloca",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Ptrload => "ptrload",
            Opcode::Ptrcast => "ptrcast",
            Opcode::PtrIsNull => "ptr_isnull",
            Opcode::Getfield => "getfield",
            Opcode::Getindex => "getindex",
            Opcode::Addressof => "addressof",
            Opcode::Jump => "jump",
            Opcode::Cbranch => "cbranch",
            Opcode::Ret => "ret",
            Opcode::Phi => "phi",
            Opcode::Call => "call",
            Opcode::CheckError => "check_error",
            Opcode::NewExc => "new_exc",
            Opcode::ExcThrow => "exc_throw",
            Opcode::ExcSetup => "exc_setup",
            Opcode::Convert => "convert",
        }
    }

    /// Terminators end a basic block and transfer control elsewhere.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Opcode::Jump | Opcode::Cbranch | Opcode::Ret | Opcode::ExcThrow
        )
    }

    /// Leaders are the phi ops at the start of a block.
    pub fn is_leader(&self) -> bool {
        matches!(self, Opcode::Phi)
    }

    /// Binary arithmetic and bitwise ops (two operands, result of operand
    /// type).
    pub fn is_binary_arith(&self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::Lshift
                | Opcode::Rshift
                | Opcode::Bitand
                | Opcode::Bitor
                | Opcode::Bitxor
        )
    }

    /// Unary arithmetic ops (one operand).
    pub fn is_unary_arith(&self) -> bool {
        matches!(
            self,
            Opcode::Invert | Opcode::Not | Opcode::Uadd | Opcode::Usub
        )
    }

    /// Comparisons (two operands, Bool result).
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Opcode::Eq | Opcode::Ne | Opcode::Lt | Opcode::Le | Opcode::Gt | Opcode::Ge
        )
    }

    /// Ops whose deletion is safe when their result is unused.
    pub fn is_effect_free(&self) -> bool {
        self.is_binary_arith()
            || self.is_unary_arith()
            || self.is_comparison()
            || matches!(
                self,
                Opcode::Alloca
                    | Opcode::Load
                    | Opcode::NewExc
                    | Opcode::Phi
                    | Opcode::Ptrload
                    | Opcode::Ptrcast
                    | Opcode::PtrIsNull
                    | Opcode::Getfield
                    | Opcode::Getindex
                    | Opcode::Addressof
                    | Opcode::Convert
            )
    }

    /// Ops a constant propagator may evaluate when all operands are constant.
    pub fn is_foldable(&self) -> bool {
        self.is_binary_arith()
            || self.is_unary_arith()
            || self.is_comparison()
            || matches!(self, Opcode::Convert)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators() {
        for op in [Opcode::Jump, Opcode::Cbranch, Opcode::Ret, Opcode::ExcThrow] {
            assert!(op.is_terminator(), "{op} should be a terminator");
        }
        for op in [Opcode::Phi, Opcode::Add, Opcode::Call, Opcode::ExcSetup] {
            assert!(!op.is_terminator(), "{op} should NOT be a terminator");
        }
    }

    #[test]
    fn effect_free_subset() {
        for op in [
            Opcode::Alloca,
            Opcode::Load,
            Opcode::NewExc,
            Opcode::Phi,
            Opcode::Add,
            Opcode::Eq,
            Opcode::Addressof,
            Opcode::Convert,
        ] {
            assert!(op.is_effect_free(), "{op} should be effect-free");
        }
        for op in [
            Opcode::Store,
            Opcode::Call,
            Opcode::Jump,
            Opcode::Ret,
            Opcode::ExcThrow,
            Opcode::CheckError,
        ] {
            assert!(!op.is_effect_free(), "{op} should NOT be effect-free");
        }
    }

    #[test]
    fn foldable_subset() {
        assert!(Opcode::Add.is_foldable());
        assert!(Opcode::Lt.is_foldable());
        assert!(Opcode::Convert.is_foldable());
        assert!(Opcode::Usub.is_foldable());
        assert!(!Opcode::Load.is_foldable());
        assert!(!Opcode::Call.is_foldable());
        assert!(!Opcode::Phi.is_foldable());
    }

    #[test]
    fn stable_names() {
        assert_eq!(Opcode::PtrIsNull.as_str(), "ptr_isnull");
        assert_eq!(Opcode::CheckError.as_str(), "check_error");
        assert_eq!(Opcode::Cbranch.to_string(), "cbranch");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Opcode::ExcThrow).unwrap();
        let back: Opcode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Opcode::ExcThrow);
    }
}
