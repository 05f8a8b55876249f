//! TypeId and TypeTable: arena storage for structural types.
//!
//! Every type is addressed by a [`TypeId`] into a [`TypeTable`]. Non-struct,
//! non-typedef types are interned (hash-consed), so structurally identical
//! shapes usually share an id; structs carry identity and stay mutable, which
//! is what allows a recursive struct to be built by appending fields that
//! reference the struct's own id.
//!
//! Equality, hashing, formatting and the textual type grammar all live here
//! because they must chase ids through the table. Equality is structural and
//! cycle-safe (visited set of id pairs); hashing is consistent with equality
//! (typedefs resolve first, structs hash to a fixed constant).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::error::CoreError;
use crate::fold::wrap_int;
use crate::types::{ConstValue, Type};
use serde::{Deserialize, Serialize};

/// Unique identifier for a type in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Pre-registered TypeId constants for built-in types.
impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const INT8: TypeId = TypeId(2);
    pub const INT16: TypeId = TypeId(3);
    pub const INT32: TypeId = TypeId(4);
    pub const INT64: TypeId = TypeId(5);
    pub const UINT8: TypeId = TypeId(6);
    pub const UINT16: TypeId = TypeId(7);
    pub const UINT32: TypeId = TypeId(8);
    pub const UINT64: TypeId = TypeId(9);
    pub const FLOAT32: TypeId = TypeId(10);
    pub const FLOAT64: TypeId = TypeId(11);
    pub const EXCEPTION: TypeId = TypeId(12);
    pub const BYTES: TypeId = TypeId(13);
    pub const OPAQUE: TypeId = TypeId(14);
}

/// Fixed hash for all struct types, so recursive structs hash without
/// recursing.
const STRUCT_HASH: u64 = 0x5374_7275;

/// Arena of all types used by a module.
#[derive(Debug, Clone)]
pub struct TypeTable {
    /// Types indexed by TypeId.0.
    types: Vec<Type>,
    /// Hash-consing map for non-struct, non-typedef types.
    interned: HashMap<Type, TypeId>,
    /// Typedef lookup by name.
    names: HashMap<String, TypeId>,
}

impl TypeTable {
    /// Creates a table with the built-in scalar types pre-registered at the
    /// ids of the [`TypeId`] associated constants.
    pub fn new() -> Self {
        let mut table = TypeTable {
            types: Vec::new(),
            interned: HashMap::new(),
            names: HashMap::new(),
        };
        for ty in [
            Type::Void,
            Type::Bool,
            Type::Int { bits: 8, unsigned: false },
            Type::Int { bits: 16, unsigned: false },
            Type::Int { bits: 32, unsigned: false },
            Type::Int { bits: 64, unsigned: false },
            Type::Int { bits: 8, unsigned: true },
            Type::Int { bits: 16, unsigned: true },
            Type::Int { bits: 32, unsigned: true },
            Type::Int { bits: 64, unsigned: true },
            Type::Real { bits: 32 },
            Type::Real { bits: 64 },
            Type::Exception,
            Type::Bytes,
            Type::Opaque,
        ] {
            table.intern(ty);
        }
        table
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Interns a structural (non-struct, non-typedef) type, returning the
    /// existing id when the same shape was seen before.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        debug_assert!(
            !matches!(ty, Type::Struct { .. } | Type::Typedef { .. }),
            "structs and typedefs carry identity and are not interned"
        );
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = self.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    /// Looks up a type by id.
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize)
    }

    /// Returns the type behind an id. Ids handed out by this table are always
    /// valid, so this indexes directly.
    pub fn kind(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Integer type of the given width and signedness.
    pub fn int(&mut self, bits: u8, unsigned: bool) -> TypeId {
        self.intern(Type::Int { bits, unsigned })
    }

    /// Floating-point type of the given width.
    pub fn real(&mut self, bits: u8) -> TypeId {
        self.intern(Type::Real { bits })
    }

    /// Pointer to `base`.
    pub fn pointer(&mut self, base: TypeId) -> TypeId {
        self.intern(Type::Pointer { base })
    }

    /// Fixed-size array of `base`.
    pub fn array(&mut self, base: TypeId, count: u32) -> TypeId {
        self.intern(Type::Array { base, count })
    }

    /// Vector of `base`.
    pub fn vector(&mut self, base: TypeId, count: u32) -> TypeId {
        self.intern(Type::Vector { base, count })
    }

    /// Function signature type.
    pub fn function(&mut self, restype: TypeId, argtypes: Vec<TypeId>, varargs: bool) -> TypeId {
        self.intern(Type::Function { restype, argtypes, varargs })
    }

    /// Allocates a fresh, empty, mutable struct type.
    pub fn new_struct(&mut self) -> TypeId {
        self.push(Type::Struct { names: Vec::new(), types: Vec::new() })
    }

    /// Appends a field to a struct. Field names are unique within one struct.
    pub fn add_field(&mut self, id: TypeId, name: &str, ty: TypeId) -> Result<(), CoreError> {
        match &mut self.types[id.0 as usize] {
            Type::Struct { names, types } => {
                if names.iter().any(|n| n == name) {
                    return Err(CoreError::DuplicateField { name: name.to_string() });
                }
                names.push(name.to_string());
                types.push(ty);
                Ok(())
            }
            _ => Err(CoreError::NotAStruct { id }),
        }
    }

    /// Returns a struct's field names and types.
    pub fn struct_fields(&self, id: TypeId) -> Result<(&[String], &[TypeId]), CoreError> {
        match self.kind(id) {
            Type::Struct { names, types } => Ok((names, types)),
            _ => Err(CoreError::NotAStruct { id }),
        }
    }

    /// Registers a named typedef aliasing `target`.
    pub fn typedef(&mut self, name: &str, target: TypeId) -> Result<TypeId, CoreError> {
        if self.names.contains_key(name) {
            return Err(CoreError::DuplicateTypedef { name: name.to_string() });
        }
        let id = self.push(Type::Typedef { name: name.to_string(), target });
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a typedef id by name.
    pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// Registers the conventional C-flavoured aliases (Char, Short, Int,
    /// Long, LongLong and their unsigned counterparts).
    pub fn register_std_typedefs(&mut self) -> Result<(), CoreError> {
        for (name, target) in [
            ("Char", TypeId::INT8),
            ("Short", TypeId::INT16),
            ("Int", TypeId::INT32),
            ("Long", TypeId::INT32),
            ("LongLong", TypeId::INT32),
            ("UChar", TypeId::UINT8),
            ("UShort", TypeId::UINT16),
            ("UInt", TypeId::UINT32),
            ("ULong", TypeId::UINT32),
            ("ULongLong", TypeId::UINT32),
        ] {
            self.typedef(name, target)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Typedef resolution and variant predicates
    // -----------------------------------------------------------------------

    /// Follows typedef chains until a non-typedef is reached.
    pub fn resolve_typedef(&self, mut id: TypeId) -> TypeId {
        while let Type::Typedef { target, .. } = self.kind(id) {
            id = *target;
        }
        id
    }

    /// Raw typedef check; the only predicate that does not resolve aliases.
    pub fn is_typedef(&self, id: TypeId) -> bool {
        matches!(self.kind(id), Type::Typedef { .. })
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Void)
    }

    pub fn is_bool(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Bool)
    }

    pub fn is_int(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Int { .. })
    }

    pub fn is_real(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Real { .. })
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Array { .. })
    }

    pub fn is_vector(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Vector { .. })
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Pointer { .. })
    }

    pub fn is_function(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Function { .. })
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve_typedef(id)), Type::Struct { .. })
    }

    // -----------------------------------------------------------------------
    // Structural equality and hashing
    // -----------------------------------------------------------------------

    /// Structural, cycle-safe equality. Typedefs are transparent; struct field
    /// names must match in order and field types pairwise.
    pub fn equals(&self, a: TypeId, b: TypeId) -> bool {
        let mut seen = HashSet::new();
        self.eq_rec(a, b, &mut seen)
    }

    fn eq_rec(&self, a: TypeId, b: TypeId, seen: &mut HashSet<(TypeId, TypeId)>) -> bool {
        if a == b {
            return true;
        }
        // Reentry on a pair already under comparison means the cycle matched
        // so far.
        if !seen.insert((a, b)) {
            return true;
        }
        match (self.kind(a), self.kind(b)) {
            (Type::Typedef { target, .. }, _) => self.eq_rec(*target, b, seen),
            (_, Type::Typedef { target, .. }) => self.eq_rec(a, *target, seen),
            (
                Type::Struct { names: n1, types: t1 },
                Type::Struct { names: n2, types: t2 },
            ) => {
                n1 == n2
                    && t1.len() == t2.len()
                    && t1.iter().zip(t2).all(|(x, y)| self.eq_rec(*x, *y, seen))
            }
            (
                Type::Int { bits: b1, unsigned: u1 },
                Type::Int { bits: b2, unsigned: u2 },
            ) => b1 == b2 && u1 == u2,
            (Type::Real { bits: b1 }, Type::Real { bits: b2 }) => b1 == b2,
            (
                Type::Array { base: x, count: c1 },
                Type::Array { base: y, count: c2 },
            )
            | (
                Type::Vector { base: x, count: c1 },
                Type::Vector { base: y, count: c2 },
            ) => c1 == c2 && self.eq_rec(*x, *y, seen),
            (Type::Pointer { base: x }, Type::Pointer { base: y }) => self.eq_rec(*x, *y, seen),
            (
                Type::Function { restype: r1, argtypes: a1, varargs: v1 },
                Type::Function { restype: r2, argtypes: a2, varargs: v2 },
            ) => {
                v1 == v2
                    && a1.len() == a2.len()
                    && self.eq_rec(*r1, *r2, seen)
                    && a1.iter().zip(a2).all(|(x, y)| self.eq_rec(*x, *y, seen))
            }
            (Type::Void, Type::Void)
            | (Type::Bool, Type::Bool)
            | (Type::Exception, Type::Exception)
            | (Type::Bytes, Type::Bytes)
            | (Type::Opaque, Type::Opaque) => true,
            _ => false,
        }
    }

    /// Structural hash, consistent with [`equals`](Self::equals): typedefs
    /// resolve first and every struct hashes to the same fixed constant.
    pub fn type_hash(&self, id: TypeId) -> u64 {
        let mut h = DefaultHasher::new();
        self.hash_rec(id, &mut h);
        h.finish()
    }

    fn hash_rec(&self, id: TypeId, h: &mut DefaultHasher) {
        match self.kind(self.resolve_typedef(id)) {
            Type::Void => 0u8.hash(h),
            Type::Bool => 1u8.hash(h),
            Type::Int { bits, unsigned } => {
                2u8.hash(h);
                bits.hash(h);
                unsigned.hash(h);
            }
            Type::Real { bits } => {
                3u8.hash(h);
                bits.hash(h);
            }
            Type::Array { base, count } => {
                4u8.hash(h);
                count.hash(h);
                self.hash_rec(*base, h);
            }
            Type::Vector { base, count } => {
                5u8.hash(h);
                count.hash(h);
                self.hash_rec(*base, h);
            }
            Type::Pointer { base } => {
                6u8.hash(h);
                self.hash_rec(*base, h);
            }
            Type::Function { restype, argtypes, varargs } => {
                7u8.hash(h);
                varargs.hash(h);
                argtypes.len().hash(h);
                self.hash_rec(*restype, h);
                for arg in argtypes {
                    self.hash_rec(*arg, h);
                }
            }
            Type::Struct { .. } => STRUCT_HASH.hash(h),
            Type::Exception => 8u8.hash(h),
            Type::Bytes => 9u8.hash(h),
            Type::Opaque => 10u8.hash(h),
            Type::Typedef { .. } => unreachable!("typedefs resolve before hashing"),
        }
    }

    // -----------------------------------------------------------------------
    // Constant conversion
    // -----------------------------------------------------------------------

    /// Coerces a constant literal into the scalar category of `target`,
    /// resolving typedefs first. Vector targets broadcast to their element
    /// category. Integer results are wrapped to the target's bit width.
    pub fn convert_const(
        &self,
        value: &ConstValue,
        target: TypeId,
    ) -> Result<ConstValue, CoreError> {
        let mut rt = self.resolve_typedef(target);
        if let Type::Vector { base, .. } = self.kind(rt) {
            rt = self.resolve_typedef(*base);
        }
        let err = || CoreError::ConstConversion {
            target: self.display(target).to_string(),
        };
        match self.kind(rt) {
            Type::Int { bits, unsigned } => {
                let raw: i128 = match value {
                    ConstValue::Bool(b) => i128::from(*b),
                    ConstValue::Int(i) => *i as i128,
                    ConstValue::Real(r) if r.is_finite() => r.trunc() as i128,
                    _ => return Err(err()),
                };
                Ok(ConstValue::Int(wrap_int(raw, *bits, *unsigned)))
            }
            Type::Real { bits } => {
                let raw = match value {
                    ConstValue::Bool(b) => f64::from(u8::from(*b)),
                    ConstValue::Int(i) => *i as f64,
                    ConstValue::Real(r) => *r,
                    _ => return Err(err()),
                };
                let raw = if *bits == 32 { f64::from(raw as f32) } else { raw };
                Ok(ConstValue::Real(raw))
            }
            Type::Bool => {
                let b = match value {
                    ConstValue::Bool(b) => *b,
                    ConstValue::Int(i) => *i != 0,
                    ConstValue::Real(r) => *r != 0.0,
                    ConstValue::Bytes(b) => !b.is_empty(),
                    ConstValue::Exception(_) => return Err(err()),
                };
                Ok(ConstValue::Bool(b))
            }
            Type::Bytes => match value {
                ConstValue::Bytes(_) => Ok(value.clone()),
                _ => Err(err()),
            },
            Type::Exception => match value {
                ConstValue::Exception(_) => Ok(value.clone()),
                _ => Err(err()),
            },
            _ => Err(err()),
        }
    }

    // -----------------------------------------------------------------------
    // Formatting
    // -----------------------------------------------------------------------

    /// Returns a displayable view of a type. Recursive structs print `...`
    /// for direct self-embedding and `...*` for a pointer back to themselves.
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { table: self, id }
    }

    fn fmt_type(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: TypeId,
        open: &mut Vec<TypeId>,
        nested: bool,
    ) -> fmt::Result {
        match self.kind(id) {
            Type::Void => write!(f, "Void"),
            Type::Bool => write!(f, "Bool"),
            Type::Int { bits, unsigned } => {
                write!(f, "{}{}", if *unsigned { "UInt" } else { "Int" }, bits)
            }
            Type::Real { bits } => write!(f, "Float{bits}"),
            Type::Exception => write!(f, "Exception"),
            Type::Bytes => write!(f, "Bytes"),
            Type::Opaque => write!(f, "Opaque"),
            Type::Typedef { name, .. } => write!(f, "{name}"),
            Type::Pointer { base } => {
                self.fmt_type(f, *base, open, true)?;
                write!(f, "*")
            }
            Type::Array { base, count } => {
                self.fmt_type(f, *base, open, true)?;
                write!(f, "[{count}]")
            }
            Type::Vector { base, count } => {
                write!(f, "Vector<")?;
                self.fmt_type(f, *base, open, true)?;
                write!(f, ", {count}>")
            }
            Type::Function { restype, argtypes, varargs } => {
                // Grouping parens keep nested function types reparsable.
                if nested {
                    write!(f, "(")?;
                }
                write!(f, "(")?;
                for (i, arg) in argtypes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.fmt_type(f, *arg, open, true)?;
                }
                if *varargs {
                    if !argtypes.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ") -> ")?;
                self.fmt_type(f, *restype, open, true)?;
                if nested {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Type::Struct { names, types } => {
                if open.contains(&id) {
                    return write!(f, "...");
                }
                if names.is_empty() {
                    return write!(f, "{{}}");
                }
                open.push(id);
                write!(f, "{{ ")?;
                for (i, (name, ty)) in names.iter().zip(types).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}:")?;
                    self.fmt_type(f, *ty, open, true)?;
                }
                write!(f, " }}")?;
                open.pop();
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parses the textual type grammar produced by [`display`](Self::display):
    /// scalar names, `T*`, `T[n]`, `Vector<T, n>`, `{ name:T, ... }`,
    /// `(T1, T2) -> R` and registered typedef names.
    pub fn parse_type(&mut self, input: &str) -> Result<TypeId, CoreError> {
        let mut parser = TypeParser { table: self, src: input, pos: 0 };
        let id = parser.parse_full()?;
        Ok(id)
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Displayable view of a type inside a table.
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    id: TypeId,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut open = Vec::new();
        self.table.fmt_type(f, self.id, &mut open, false)
    }
}

// ---------------------------------------------------------------------------
// Recursive-descent parser over the printed grammar
// ---------------------------------------------------------------------------

struct TypeParser<'a> {
    table: &'a mut TypeTable,
    src: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, message: &str) -> CoreError {
        CoreError::TypeParse {
            input: self.src.to_string(),
            message: format!("{message} at offset {}", self.pos),
        }
    }

    fn skip_ws(&mut self) {
        while self.src[self.pos..].starts_with(|c: char| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), CoreError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        if !rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            return None;
        }
        let end = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    fn number(&mut self) -> Result<u32, CoreError> {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected a number"));
        }
        let n = rest[..end]
            .parse::<u32>()
            .map_err(|_| self.error("number out of range"))?;
        self.pos += end;
        Ok(n)
    }

    fn parse_full(&mut self) -> Result<TypeId, CoreError> {
        let id = self.parse_type()?;
        self.skip_ws();
        if self.pos != self.src.len() {
            return Err(self.error("trailing input"));
        }
        Ok(id)
    }

    fn parse_type(&mut self) -> Result<TypeId, CoreError> {
        let mut id = self.parse_base()?;
        loop {
            if self.eat("*") {
                id = self.table.pointer(id);
            } else if self.eat("[") {
                let count = self.number()?;
                self.expect("]")?;
                id = self.table.array(id, count);
            } else {
                return Ok(id);
            }
        }
    }

    fn parse_base(&mut self) -> Result<TypeId, CoreError> {
        match self.peek() {
            Some('(') => self.parse_function_or_group(),
            Some('{') => self.parse_struct(),
            _ => self.parse_named(),
        }
    }

    fn parse_function_or_group(&mut self) -> Result<TypeId, CoreError> {
        self.expect("(")?;
        let mut argtypes = Vec::new();
        let mut varargs = false;
        if !self.eat(")") {
            loop {
                if self.eat("...") {
                    varargs = true;
                    break;
                }
                argtypes.push(self.parse_type()?);
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
        }
        if self.eat("->") {
            let restype = self.parse_type()?;
            Ok(self.table.function(restype, argtypes, varargs))
        } else if argtypes.len() == 1 && !varargs {
            // Parenthesized group, used for nested function types.
            Ok(argtypes[0])
        } else {
            Err(self.error("expected '->' after argument list"))
        }
    }

    fn parse_struct(&mut self) -> Result<TypeId, CoreError> {
        self.expect("{")?;
        let id = self.table.new_struct();
        if self.eat("}") {
            return Ok(id);
        }
        loop {
            let name = self
                .ident()
                .map(str::to_string)
                .ok_or_else(|| self.error("expected a field name"))?;
            self.expect(":")?;
            let ty = self.parse_type()?;
            self.table.add_field(id, &name, ty)?;
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(id)
    }

    fn parse_named(&mut self) -> Result<TypeId, CoreError> {
        let name = self.ident().ok_or_else(|| self.error("expected a type name"))?;
        match name {
            "Void" => Ok(TypeId::VOID),
            "Bool" => Ok(TypeId::BOOL),
            "Bytes" => Ok(TypeId::BYTES),
            "Opaque" => Ok(TypeId::OPAQUE),
            "Exception" => Ok(TypeId::EXCEPTION),
            "Float32" => Ok(TypeId::FLOAT32),
            "Float64" => Ok(TypeId::FLOAT64),
            "Vector" => {
                self.expect("<")?;
                let base = self.parse_type()?;
                self.expect(",")?;
                let count = self.number()?;
                self.expect(">")?;
                Ok(self.table.vector(base, count))
            }
            _ => {
                if let Some(width) = name.strip_prefix("UInt") {
                    let bits = width
                        .parse::<u8>()
                        .map_err(|_| self.error("bad integer width"))?;
                    return Ok(self.table.int(bits, true));
                }
                if let Some(width) = name.strip_prefix("Int") {
                    let bits = width
                        .parse::<u8>()
                        .map_err(|_| self.error("bad integer width"))?;
                    return Ok(self.table.int(bits, false));
                }
                self.table
                    .lookup_name(name)
                    .ok_or_else(|| self.error(&format!("unknown type name '{name}'")))
            }
        }
    }
}
