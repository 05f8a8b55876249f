//! Control-flow analysis: successor deduction, CFG construction, phi
//! location.
//!
//! Successors come from the block terminator (`jump`: one, `cbranch`: two in
//! true/false order, `ret`/`exc_throw`: none). When `exceptions` is enabled,
//! `exc_setup` ops contribute their handler targets; when disabled they are
//! treated as fall-through, which is the mode SSA destruction runs under.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use ssir_core::{BlockId, Function, OpId, Opcode, Value};

/// Targets of a block, deduced from its terminator (and `exc_setup` ops when
/// `exceptions` is set). Duplicates are removed, first occurrence wins.
pub fn deduce_successors(func: &Function, block: BlockId, exceptions: bool) -> Vec<BlockId> {
    let mut succs = Vec::new();
    let push = |b: BlockId, succs: &mut Vec<BlockId>| {
        if !succs.contains(&b) {
            succs.push(b);
        }
    };

    if let Some(term) = func.terminator(block) {
        let data = func.op(term);
        match data.opcode {
            Opcode::Jump => {
                if let Some(Value::Block(t)) = data.arg_value(0) {
                    push(*t, &mut succs);
                }
            }
            Opcode::Cbranch => {
                for index in [1, 2] {
                    if let Some(Value::Block(t)) = data.arg_value(index) {
                        push(*t, &mut succs);
                    }
                }
            }
            Opcode::Ret | Opcode::ExcThrow => {}
            _ => {}
        }
    }

    if exceptions {
        for &op in func.block(block).ops() {
            if func.op(op).opcode == Opcode::ExcSetup {
                for arg in func.op(op).args() {
                    arg.for_each_value(&mut |v| {
                        if let Value::Block(t) = v {
                            if !succs.contains(t) {
                                succs.push(*t);
                            }
                        }
                    });
                }
            }
        }
    }

    succs
}

/// Builds the directed control-flow graph over the function's live blocks.
pub fn cfg(func: &Function, exceptions: bool) -> DiGraph<BlockId, ()> {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<BlockId, NodeIndex> = HashMap::new();
    for &b in func.blocks() {
        nodes.insert(b, graph.add_node(b));
    }
    for &b in func.blocks() {
        for t in deduce_successors(func, b, exceptions) {
            if let (Some(&from), Some(&to)) = (nodes.get(&b), nodes.get(&t)) {
                graph.add_edge(from, to, ());
            }
        }
    }
    graph
}

/// Recomputes and stores ordered predecessor/successor lists on every block,
/// exceptional edges included.
pub fn run(func: &mut Function) {
    run_mode(func, true)
}

/// Like [`run`], with explicit exceptional-edge handling.
pub fn run_mode(func: &mut Function, exceptions: bool) {
    let blocks: Vec<BlockId> = func.blocks().to_vec();
    let mut preds: IndexMap<BlockId, Vec<BlockId>> = blocks.iter().map(|&b| (b, Vec::new())).collect();
    let mut succs: IndexMap<BlockId, Vec<BlockId>> = IndexMap::new();

    for &b in &blocks {
        let targets = deduce_successors(func, b, exceptions);
        for &t in &targets {
            if let Some(p) = preds.get_mut(&t) {
                if !p.contains(&b) {
                    p.push(b);
                }
            }
        }
        succs.insert(b, targets);
    }

    for &b in &blocks {
        let p = preds.get(&b).cloned().unwrap_or_default();
        let s = succs.get(&b).cloned().unwrap_or_default();
        func.set_edges(b, p, s);
    }
}

/// Maps every block to its leader phis, in order.
pub fn find_phis(func: &Function) -> IndexMap<BlockId, Vec<OpId>> {
    func.blocks()
        .iter()
        .map(|&b| (b, func.leaders(b).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssir_core::{Builder, Function, TypeId, TypeTable};

    #[test]
    fn successors_of_jump_and_cbranch() {
        let mut func = Function::new("f", vec![], TypeId::VOID);
        let mut types = TypeTable::new();
        let mut b = Builder::new(&mut func, &mut types);
        let entry = b.current_block();
        let left = b.func_mut().new_block("left", None);
        let right = b.func_mut().new_block("right", None);
        let cond = b.func_mut().new_const(ssir_core::ConstValue::Bool(true), TypeId::BOOL);
        b.cbranch(cond, left, right);
        b.position_at_end(left);
        b.jump(right);
        b.position_at_end(right);
        b.ret(None);

        assert_eq!(deduce_successors(&func, entry, true), vec![left, right]);
        assert_eq!(deduce_successors(&func, left, true), vec![right]);
        assert_eq!(deduce_successors(&func, right, true), Vec::<BlockId>::new());
    }

    #[test]
    fn exc_setup_edges_only_with_exceptions() {
        let mut func = Function::new("f", vec![], TypeId::VOID);
        let mut types = TypeTable::new();
        let mut b = Builder::new(&mut func, &mut types);
        let entry = b.current_block();
        let handler = b.func_mut().new_block("handler", None);
        let next = b.func_mut().new_block("next", None);
        b.exc_setup(vec![handler]);
        b.jump(next);
        b.position_at_end(handler);
        b.ret(None);
        b.position_at_end(next);
        b.ret(None);

        assert_eq!(deduce_successors(&func, entry, false), vec![next]);
        assert_eq!(deduce_successors(&func, entry, true), vec![next, handler]);
    }

    #[test]
    fn run_fills_ordered_preds_and_succs() {
        let mut func = Function::new("f", vec![], TypeId::VOID);
        let mut types = TypeTable::new();
        let mut b = Builder::new(&mut func, &mut types);
        let entry = b.current_block();
        let loop_ = b.func_mut().new_block("loop", None);
        b.jump(loop_);
        b.position_at_end(loop_);
        b.jump(loop_);

        run(&mut func);
        assert_eq!(func.block(loop_).preds(), &[entry, loop_]);
        assert_eq!(func.block(loop_).succs(), &[loop_]);
        assert_eq!(func.block(entry).preds(), &[] as &[BlockId]);
    }

    #[test]
    fn cfg_has_one_node_per_block() {
        let mut func = Function::new("f", vec![], TypeId::VOID);
        let mut types = TypeTable::new();
        let mut b = Builder::new(&mut func, &mut types);
        let loop_ = b.func_mut().new_block("loop", None);
        b.jump(loop_);
        b.position_at_end(loop_);
        b.jump(loop_);

        let graph = cfg(&func, true);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn find_phis_lists_leaders_in_order() {
        let mut func = Function::new("f", vec![("a".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let mut b = Builder::new(&mut func, &mut types);
        let entry = b.current_block();
        let merge = b.func_mut().new_block("merge", None);
        b.jump(merge);
        b.position_at_end(merge);
        let p1 = b.phi(vec![entry], vec![Value::Arg(0)], TypeId::INT32).unwrap();
        let p2 = b.phi(vec![entry], vec![Value::Arg(0)], TypeId::INT32).unwrap();
        b.ret(Some(Value::Op(p1)));

        let phis = find_phis(&func);
        assert_eq!(phis[&merge], vec![p1, p2]);
        assert!(phis[&entry].is_empty());
    }
}
