//! SSA destruction: lower every phi to a stack slot.
//!
//! Each phi gets an `alloca` at the entry block's start; incoming values are
//! stored in the predecessor immediately before its terminator, and uses load
//! from the slot. Two subtleties make this more than a mechanical rewrite:
//!
//! 1. Phis execute in parallel. When a phi's incoming value is itself a phi,
//!    the old value must be read before any copy in that predecessor
//!    overwrites it (the swap problem). All slot loads are therefore emitted
//!    before any store, per predecessor.
//! 2. Critical edges (multi-successor predecessor to multi-predecessor
//!    successor) would make a predecessor copy visible on the wrong path, so
//!    every (multi-successor block -> phi-carrying successor) edge gets a
//!    fresh forwarding block first.
//!
//! The pass runs on the CFG without exceptional edges and must not run after
//! exception lowering has broken SSA form; it verifies the function up front
//! and aborts before mutating anything.

use std::collections::HashMap;

use indexmap::IndexMap;

use ssir_core::{
    phi_operands, verify, BlockId, Builder, Function, OpId, Operand, TypeTable, Value,
};

use crate::cfa;
use crate::error::PassError;

/// Lowers all phis of a function to entry-block stack slots.
pub fn run(func: &mut Function, types: &mut TypeTable) -> Result<(), PassError> {
    verify(func, types).map_err(|e| PassError::Precondition { reason: e.to_string() })?;

    cfa::run_mode(func, false);
    let phis = cfa::find_phis(func);
    if phis.values().all(Vec::is_empty) {
        return Ok(());
    }

    split_critical_edges(func, types, &phis)?;
    cfa::run_mode(func, false);

    // One stack slot per phi, allocated at the entry block's start.
    let entry = func.start_block().ok_or_else(|| PassError::Precondition {
        reason: "function has no blocks".to_string(),
    })?;
    let mut slots: IndexMap<OpId, OpId> = IndexMap::new();
    {
        let mut b = Builder::new(func, types);
        b.position_at_beginning(entry);
        for block_phis in phis.values() {
            for &phi in block_phis {
                let ty = b.func().op(phi).ty;
                slots.insert(phi, b.alloca(ty));
            }
        }
    }

    // First pass: incoming values that name a phi are read out of that phi's
    // slot in the predecessor. Emitting every such load before emitting any
    // store keeps parallel-phi semantics intact.
    for block_phis in phis.values() {
        for &phi in block_phis {
            let Some((preds, mut values)) = func.op(phi).phi_args() else {
                continue;
            };
            let mut changed = false;
            for i in 0..values.len() {
                let Value::Op(q) = values[i].clone() else { continue };
                let Some(&slot) = slots.get(&q) else { continue };
                let term = terminator_of(func, preds[i])?;
                let mut b = Builder::new(func, types);
                b.position_before(term).map_err(PassError::Core)?;
                let load = b.load(Value::Op(slot)).map_err(PassError::Core)?;
                values[i] = Value::Op(load);
                changed = true;
            }
            if changed {
                func.set_args(phi, phi_operands(&preds, &values));
            }
        }
    }

    // Second pass: copy each incoming value into the phi's slot on its edge.
    for block_phis in phis.values() {
        for &phi in block_phis {
            let Some(&slot) = slots.get(&phi) else { continue };
            let Some((preds, values)) = func.op(phi).phi_args() else {
                continue;
            };
            for (pred, value) in preds.iter().zip(values) {
                let term = terminator_of(func, *pred)?;
                let mut b = Builder::new(func, types);
                b.position_before(term).map_err(PassError::Core)?;
                b.store(value, Value::Op(slot));
            }
        }
    }

    // Use replacement: one load per use-block, placed before the earliest
    // use, then the phi disappears.
    for block_phis in phis.values() {
        for &phi in block_phis {
            let Some(&slot) = slots.get(&phi) else { continue };
            let users: Vec<OpId> = func.users(&Value::Op(phi)).collect();
            let mut by_block: IndexMap<BlockId, Vec<(usize, OpId)>> = IndexMap::new();
            for user in users {
                if user == phi {
                    continue;
                }
                if let Some((block, pos)) = func.position(user) {
                    by_block.entry(block).or_default().push((pos, user));
                }
            }
            for (_, mut uses) in by_block {
                uses.sort();
                let mut b = Builder::new(func, types);
                b.position_before(uses[0].1).map_err(PassError::Core)?;
                let load = b.load(Value::Op(slot)).map_err(PassError::Core)?;
                let mut map = HashMap::new();
                map.insert(Value::Op(phi), Value::Op(load));
                for (_, user) in uses {
                    func.replace_args(user, &map);
                }
            }
            func.delete(phi);
        }
    }

    cfa::run_mode(func, false);
    Ok(())
}

fn terminator_of(func: &Function, block: BlockId) -> Result<OpId, PassError> {
    func.terminator(block).ok_or_else(|| PassError::Precondition {
        reason: format!("block '{}' lacks a terminator", func.block(block).name()),
    })
}

/// Inserts a forwarding block on every edge from a multi-successor block to
/// a phi-carrying successor, re-pointing the terminator target and the phi
/// predecessor entry.
fn split_critical_edges(
    func: &mut Function,
    types: &mut TypeTable,
    phis: &IndexMap<BlockId, Vec<OpId>>,
) -> Result<(), PassError> {
    for b in func.blocks().to_vec() {
        if cfa::deduce_successors(func, b, false).len() <= 1 {
            continue;
        }
        let term = terminator_of(func, b)?;
        // Only `cbranch` has multiple targets; they sit at arg positions 1
        // and 2 and are patched one occurrence at a time.
        for index in [1usize, 2] {
            let Some(Value::Block(target)) = func.op(term).arg_value(index).cloned() else {
                continue;
            };
            if phis.get(&target).map_or(true, |v| v.is_empty()) {
                continue;
            }

            let name = func.temp("critedge");
            let split = func.new_block(&name, Some(b));
            {
                let mut builder = Builder::new(func, types);
                builder.position_at_end(split);
                builder.jump(target);
            }

            let mut args: Vec<Operand> = func.op(term).args().to_vec();
            args[index] = Value::Block(split).into();
            func.set_args(term, args);

            for &phi in &phis[&target] {
                let Some((mut preds, values)) = func.op(phi).phi_args() else {
                    continue;
                };
                if let Some(slot) = preds.iter().position(|&p| p == b) {
                    preds[slot] = split;
                    func.set_args(phi, phi_operands(&preds, &values));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssir_core::{ConstValue, Opcode, TypeId};

    /// Diamond with a critical edge: entry cbranches straight into the merge
    /// block as well as through a side block.
    fn diamond() -> (Function, TypeTable) {
        let mut func = Function::new("pick", vec![("c".into(), TypeId::BOOL)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c1 = func.new_const(ConstValue::Int(1), TypeId::INT32);
        let c2 = func.new_const(ConstValue::Int(2), TypeId::INT32);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let entry = b.current_block();
            let left = b.func_mut().new_block("left", None);
            let merge = b.func_mut().new_block("merge", None);
            b.position_at_end(entry);
            b.cbranch(Value::Arg(0), left, merge);
            b.position_at_end(left);
            b.jump(merge);
            b.position_at_end(merge);
            let p = b
                .phi(vec![entry, left], vec![c2.clone(), c1.clone()], TypeId::INT32)
                .unwrap();
            b.ret(Some(Value::Op(p)));
        }
        (func, types)
    }

    fn phi_count(func: &Function) -> usize {
        func.ops_in_order()
            .filter(|&op| func.op(op).opcode == Opcode::Phi)
            .count()
    }

    #[test]
    fn no_phis_remain_and_slots_live_in_entry() {
        let (mut func, mut types) = diamond();
        run(&mut func, &mut types).unwrap();
        verify(&func, &types).unwrap();

        assert_eq!(phi_count(&func), 0);

        let entry = func.start_block().unwrap();
        let entry_allocas: Vec<OpId> = func
            .block(entry)
            .ops()
            .iter()
            .copied()
            .take_while(|&op| func.op(op).opcode == Opcode::Alloca)
            .collect();
        assert_eq!(entry_allocas.len(), 1);

        // Every load and store goes through an entry-block alloca.
        for op in func.ops_in_order().collect::<Vec<_>>() {
            let data = func.op(op);
            let ptr = match data.opcode {
                Opcode::Load => data.arg_value(0),
                Opcode::Store => data.arg_value(1),
                _ => continue,
            };
            match ptr {
                Some(Value::Op(slot)) => {
                    assert_eq!(func.op(*slot).opcode, Opcode::Alloca);
                    assert_eq!(func.op(*slot).block(), Some(entry));
                }
                other => panic!("expected a slot pointer, got {other:?}"),
            }
        }
    }

    #[test]
    fn critical_edge_gets_a_forwarding_block() {
        let (mut func, mut types) = diamond();
        let before = func.blocks().len();
        run(&mut func, &mut types).unwrap();
        // The entry->merge edge was critical: one new block.
        assert_eq!(func.blocks().len(), before + 1);

        // The entry terminator no longer targets the merge block directly.
        let entry = func.start_block().unwrap();
        let term = func.terminator(entry).unwrap();
        assert_eq!(func.op(term).opcode, Opcode::Cbranch);
        let merge = *func.blocks().last().unwrap();
        assert_ne!(func.op(term).arg_value(2), Some(&Value::Block(merge)));
    }

    #[test]
    fn function_without_phis_is_untouched() {
        let mut func = Function::new("id", vec![("a".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        {
            let mut b = Builder::new(&mut func, &mut types);
            b.ret(Some(Value::Arg(0)));
        }
        let ops_before = func.op_count();
        run(&mut func, &mut types).unwrap();
        assert_eq!(func.op_count(), ops_before);
    }

    #[test]
    fn malformed_input_aborts_eagerly() {
        let mut func = Function::new("broken", vec![], TypeId::VOID);
        let mut types = TypeTable::new();
        // A block with no terminator violates the precondition.
        func.new_block("entry", None);
        let op = func.create_op(Opcode::Alloca, TypeId::OPAQUE, vec![]);
        let entry = func.start_block().unwrap();
        func.push_op(entry, op);

        let err = run(&mut func, &mut types);
        assert!(matches!(err, Err(PassError::Precondition { .. })));
        // Nothing was mutated.
        assert_eq!(func.op_count(), 1);
    }
}
