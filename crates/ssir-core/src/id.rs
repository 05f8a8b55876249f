//! Stable ID newtypes for IR entities.
//!
//! All IDs are distinct newtype wrappers over `u32` indexing into the arenas
//! owned by [`Function`](crate::function::Function), providing type safety so
//! that an `OpId` cannot be accidentally used where a `BlockId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable operation identifier. Indexes the function's op arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpId(pub u32);

/// Stable basic-block identifier. Indexes the function's block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Stable constant identifier. Indexes the function's constant arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstId(pub u32);

// Display implementations -- just print the inner value.

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", OpId(7)), "7");
        assert_eq!(format!("{}", BlockId(0)), "0");
        assert_eq!(format!("{}", ConstId(99)), "99");
    }

    #[test]
    fn serde_roundtrip() {
        let op = OpId(42);
        let json = serde_json::to_string(&op).unwrap();
        let back: OpId = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }
}
