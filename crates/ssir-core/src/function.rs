//! Function: arenas for ops, blocks and constants, plus the uses-map.
//!
//! A function owns everything below it. Ops, blocks and constants are arena
//! entries addressed by the newtype ids of [`crate::id`]; the ordered block
//! list starts with the entry block. Every argument-list mutation goes through
//! this type so the uses-map (value -> set of using ops) stays in sync.
//!
//! `unlink` removes an op from its block without invalidating references to
//! it; `delete` additionally removes it from the uses-map.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::id::{BlockId, ConstId, OpId};
use crate::instr::Op;
use crate::block::Block;
use crate::ops::Opcode;
use crate::type_table::TypeId;
use crate::types::ConstValue;
use crate::value::{collect_values, Const, Operand, Value};

/// A function definition: signature, blocks, ops, constants, uses.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    params: Vec<(String, TypeId)>,
    restype: TypeId,
    ops: Vec<Op>,
    blocks: Vec<Block>,
    consts: Vec<Const>,
    /// Ordered live blocks; the first entry is the start block.
    order: Vec<BlockId>,
    /// value -> ops whose args reference it.
    uses: HashMap<Value, IndexSet<OpId>>,
    next_temp: u32,
}

impl Function {
    /// Creates an empty function with the given signature.
    pub fn new(name: &str, params: Vec<(String, TypeId)>, restype: TypeId) -> Self {
        Function {
            name: name.to_string(),
            params,
            restype,
            ops: Vec::new(),
            blocks: Vec::new(),
            consts: Vec::new(),
            order: Vec::new(),
            uses: HashMap::new(),
            next_temp: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(String, TypeId)] {
        &self.params
    }

    pub fn restype(&self) -> TypeId {
        self.restype
    }

    /// Yields a name unique within this function.
    pub fn temp(&mut self, prefix: &str) -> String {
        let n = self.next_temp;
        self.next_temp += 1;
        format!("%{prefix}{n}")
    }

    // -----------------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------------

    /// Adds a typed constant and returns a value referencing it.
    pub fn new_const(&mut self, value: ConstValue, ty: TypeId) -> Value {
        let id = ConstId(self.consts.len() as u32);
        self.consts.push(Const { value, ty });
        Value::Const(id)
    }

    pub fn constant(&self, id: ConstId) -> &Const {
        &self.consts[id.0 as usize]
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Adds a block, placed after `after` in the block order (or last).
    /// The first block ever added becomes the start block.
    pub fn new_block(&mut self, name: &str, after: Option<BlockId>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new(name.to_string()));
        match after.and_then(|a| self.order.iter().position(|&b| b == a)) {
            Some(pos) => self.order.insert(pos + 1, id),
            None => self.order.push(id),
        }
        id
    }

    /// Removes a block and deletes all its ops.
    pub fn remove_block(&mut self, block: BlockId) {
        let ops = self.blocks[block.0 as usize].ops.clone();
        for op in ops {
            self.delete(op);
        }
        self.order.retain(|&b| b != block);
    }

    /// The ordered live blocks; the first is the start block.
    pub fn blocks(&self) -> &[BlockId] {
        &self.order
    }

    pub fn start_block(&self) -> Option<BlockId> {
        self.order.first().copied()
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    /// Whether a block is part of the live block order.
    pub fn is_live_block(&self, id: BlockId) -> bool {
        self.order.contains(&id)
    }

    /// Stores derived predecessor/successor lists (filled by control-flow
    /// analysis).
    pub fn set_edges(&mut self, block: BlockId, preds: Vec<BlockId>, succs: Vec<BlockId>) {
        let b = &mut self.blocks[block.0 as usize];
        b.preds = preds;
        b.succs = succs;
    }

    // -----------------------------------------------------------------------
    // Ops
    // -----------------------------------------------------------------------

    /// Creates an op in the arena, unlinked, with a fresh result name. The
    /// op's argument values are registered in the uses-map immediately.
    pub fn create_op(&mut self, opcode: Opcode, ty: TypeId, args: Vec<Operand>) -> OpId {
        let name = self.temp(opcode.as_str());
        let id = OpId(self.ops.len() as u32);
        for value in collect_values(&args) {
            self.uses.entry(value).or_default().insert(id);
        }
        self.ops.push(Op::new(opcode, ty, name, args));
        id
    }

    pub fn op(&self, id: OpId) -> &Op {
        &self.ops[id.0 as usize]
    }

    fn op_mut(&mut self, id: OpId) -> &mut Op {
        &mut self.ops[id.0 as usize]
    }

    /// Links an unlinked op into a block at the given position.
    pub fn insert_op(&mut self, block: BlockId, index: usize, op: OpId) {
        debug_assert!(self.ops[op.0 as usize].block.is_none(), "op already linked");
        self.op_mut(op).block = Some(block);
        self.blocks[block.0 as usize].ops.insert(index, op);
    }

    /// Links an unlinked op at the end of a block.
    pub fn push_op(&mut self, block: BlockId, op: OpId) {
        let index = self.blocks[block.0 as usize].ops.len();
        self.insert_op(block, index, op);
    }

    /// Appends already-created ops to a block, metadata and all.
    pub fn extend(&mut self, block: BlockId, ops: &[OpId]) {
        for &op in ops {
            self.push_op(block, op);
        }
    }

    /// Removes an op from its block without touching the uses-map;
    /// references to the op stay valid.
    pub fn unlink(&mut self, op: OpId) {
        if let Some(block) = self.ops[op.0 as usize].block.take() {
            self.blocks[block.0 as usize].ops.retain(|&o| o != op);
        }
    }

    /// Unlinks an op and removes it from the uses-map, both as a user and as
    /// a usable definition.
    pub fn delete(&mut self, op: OpId) {
        self.unlink(op);
        let values = collect_values(self.ops[op.0 as usize].args());
        for value in values {
            if let Some(users) = self.uses.get_mut(&value) {
                users.shift_remove(&op);
            }
        }
        self.uses.remove(&Value::Op(op));
    }

    /// Replaces an op's argument list, updating the uses-map.
    pub fn set_args(&mut self, op: OpId, args: Vec<Operand>) {
        let old = collect_values(self.ops[op.0 as usize].args());
        for value in old {
            if let Some(users) = self.uses.get_mut(&value) {
                users.shift_remove(&op);
            }
        }
        for value in collect_values(&args) {
            self.uses.entry(value).or_default().insert(op);
        }
        self.op_mut(op).args = args.into();
    }

    /// Rewrites an op's arguments through a substitution map.
    pub fn replace_args(&mut self, op: OpId, map: &HashMap<Value, Value>) {
        let new_args: Vec<Operand> = self.ops[op.0 as usize]
            .args()
            .iter()
            .map(|operand| {
                operand.map_values(&mut |v| map.get(v).cloned().unwrap_or_else(|| v.clone()))
            })
            .collect();
        self.set_args(op, new_args);
    }

    /// Rewrites every user of `from` to reference `to` instead.
    pub fn replace_all_uses(&mut self, from: &Value, to: &Value) {
        let users: Vec<OpId> = self.users(from).collect();
        let mut map = HashMap::new();
        map.insert(from.clone(), to.clone());
        for user in users {
            self.replace_args(user, &map);
        }
    }

    /// Attaches metadata to an op (well-known keys such as `exc.badval`).
    pub fn add_metadata(&mut self, op: OpId, key: &str, value: Value) {
        self.op_mut(op).metadata.insert(key.to_string(), value);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Ops whose argument lists reference `value`.
    pub fn users<'a>(&'a self, value: &Value) -> impl Iterator<Item = OpId> + 'a {
        self.uses.get(value).into_iter().flatten().copied()
    }

    pub fn has_users(&self, value: &Value) -> bool {
        self.uses.get(value).is_some_and(|set| !set.is_empty())
    }

    pub(crate) fn uses_map(&self) -> &HashMap<Value, IndexSet<OpId>> {
        &self.uses
    }

    /// All linked ops, in block order.
    pub fn ops_in_order(&self) -> impl Iterator<Item = OpId> + '_ {
        self.order
            .iter()
            .flat_map(|&b| self.blocks[b.0 as usize].ops.iter().copied())
    }

    pub fn op_count(&self) -> usize {
        self.ops_in_order().count()
    }

    /// The block's last op, when it is a terminator.
    pub fn terminator(&self, block: BlockId) -> Option<OpId> {
        let &last = self.blocks[block.0 as usize].ops.last()?;
        self.ops[last.0 as usize].opcode.is_terminator().then_some(last)
    }

    /// The leader phis of a block, in order.
    pub fn leaders(&self, block: BlockId) -> impl Iterator<Item = OpId> + '_ {
        self.blocks[block.0 as usize]
            .ops
            .iter()
            .copied()
            .take_while(|&op| self.ops[op.0 as usize].opcode.is_leader())
    }

    /// Where an op is linked: its block and position within it.
    pub fn position(&self, op: OpId) -> Option<(BlockId, usize)> {
        let block = self.ops[op.0 as usize].block?;
        let index = self.blocks[block.0 as usize]
            .ops
            .iter()
            .position(|&o| o == op)?;
        Some((block, index))
    }

    /// The type of a value, when it has one (globals are typed by the
    /// module, not the function).
    pub fn value_type(&self, value: &Value) -> Option<TypeId> {
        match value {
            Value::Op(op) => Some(self.ops[op.0 as usize].ty),
            Value::Const(c) => Some(self.consts[c.0 as usize].ty),
            Value::Arg(i) => self.params.get(*i as usize).map(|(_, ty)| *ty),
            Value::Global(_) | Value::Block(_) => None,
        }
    }
}
