//! Sparse conditional constant propagation.
//!
//! The classic two-worklist fixpoint: every SSA value carries a lattice state
//! (Top, a known constant, or Bottom) and every CFG edge an executable flag.
//! Reachability and constancy are discovered together -- phis meet only over
//! executable incoming edges, and a `cbranch` whose condition is a known
//! constant marks only the taken edge.
//!
//! After the fixpoint, the rewrite phase replaces constant-valued ops with
//! their constants (deleting them when effect-free), turns constant-condition
//! `cbranch`es into `jump`s, prunes phi incomings from non-executable edges,
//! removes unreachable blocks, and finally cleans up the block graph by
//! threading away empty forwarding blocks and merging single-predecessor jump
//! chains. Self-loops are never threaded, so a constant-true loop collapses
//! to a minimal self-jump rather than disappearing.

use std::collections::{HashMap, HashSet, VecDeque};

use ssir_core::{
    fold, phi_operands, BlockId, ConstValue, Function, OpId, Opcode, TypeId, TypeTable, Value,
};

use crate::cfa;
use crate::error::PassError;

/// Per-value lattice state. Values only descend: Top, then a single constant,
/// then Bottom.
#[derive(Debug, Clone, PartialEq)]
enum Lattice {
    Top,
    Const(ConstValue),
    Bottom,
}

impl Lattice {
    fn meet(a: &Lattice, b: &Lattice) -> Lattice {
        match (a, b) {
            (Lattice::Top, x) | (x, Lattice::Top) => x.clone(),
            (Lattice::Bottom, _) | (_, Lattice::Bottom) => Lattice::Bottom,
            (Lattice::Const(c), Lattice::Const(d)) => {
                if c == d {
                    a.clone()
                } else {
                    Lattice::Bottom
                }
            }
        }
    }
}

struct Solver<'a> {
    func: &'a Function,
    types: &'a TypeTable,
    lattice: HashMap<OpId, Lattice>,
    exec: HashSet<(BlockId, BlockId)>,
    reachable: HashSet<BlockId>,
    edge_wl: VecDeque<(Option<BlockId>, BlockId)>,
    ssa_wl: VecDeque<OpId>,
}

impl<'a> Solver<'a> {
    fn new(func: &'a Function, types: &'a TypeTable) -> Self {
        Solver {
            func,
            types,
            lattice: HashMap::new(),
            exec: HashSet::new(),
            reachable: HashSet::new(),
            edge_wl: VecDeque::new(),
            ssa_wl: VecDeque::new(),
        }
    }

    fn value_lattice(&self, value: &Value) -> Lattice {
        match value {
            Value::Const(c) => Lattice::Const(self.func.constant(*c).value.clone()),
            Value::Op(op) => self.lattice.get(op).cloned().unwrap_or(Lattice::Top),
            // Arguments and globals are unknown at compile time.
            Value::Arg(_) | Value::Global(_) | Value::Block(_) => Lattice::Bottom,
        }
    }

    fn update(&mut self, op: OpId, computed: Lattice) {
        let old = self.lattice.get(&op).cloned().unwrap_or(Lattice::Top);
        let merged = Lattice::meet(&old, &computed);
        if merged != old {
            self.lattice.insert(op, merged);
            self.ssa_wl.push_back(op);
        }
    }

    fn mark_edge(&mut self, from: BlockId, to: BlockId) {
        self.edge_wl.push_back((Some(from), to));
    }

    fn solve(mut self, start: BlockId) -> Solution {
        self.edge_wl.push_back((None, start));

        loop {
            if let Some((pred, block)) = self.edge_wl.pop_front() {
                if let Some(p) = pred {
                    if !self.exec.insert((p, block)) {
                        continue;
                    }
                }
                let first_visit = self.reachable.insert(block);
                // A new incoming edge re-evaluates the phis.
                let leaders: Vec<OpId> = self.func.leaders(block).collect();
                for phi in leaders {
                    self.visit(phi);
                }
                if first_visit {
                    let ops: Vec<OpId> = self.func.block(block).ops().to_vec();
                    for op in ops {
                        if self.func.op(op).opcode != Opcode::Phi {
                            self.visit(op);
                        }
                    }
                }
                continue;
            }

            if let Some(op) = self.ssa_wl.pop_front() {
                let users: Vec<OpId> = self.func.users(&Value::Op(op)).collect();
                for user in users {
                    let in_reachable = self
                        .func
                        .op(user)
                        .block()
                        .is_some_and(|b| self.reachable.contains(&b));
                    if in_reachable {
                        self.visit(user);
                    }
                }
                continue;
            }

            break;
        }

        Solution {
            lattice: self.lattice,
            exec: self.exec,
            reachable: self.reachable,
        }
    }

    fn visit(&mut self, op: OpId) {
        let data = self.func.op(op);
        let block = match data.block() {
            Some(b) => b,
            None => return,
        };
        match data.opcode {
            Opcode::Phi => {
                let computed = match data.phi_args() {
                    Some((preds, values)) => {
                        let mut acc = Lattice::Top;
                        for (p, v) in preds.iter().zip(&values) {
                            if self.exec.contains(&(*p, block)) {
                                acc = Lattice::meet(&acc, &self.value_lattice(v));
                            }
                        }
                        acc
                    }
                    None => Lattice::Bottom,
                };
                self.update(op, computed);
            }
            Opcode::Jump => {
                if let Some(Value::Block(t)) = data.arg_value(0) {
                    self.mark_edge(block, *t);
                }
            }
            Opcode::Cbranch => {
                let cond = data
                    .arg_value(0)
                    .map(|v| self.value_lattice(v))
                    .unwrap_or(Lattice::Bottom);
                let on_true = data.arg_value(1).cloned();
                let on_false = data.arg_value(2).cloned();
                let mark = |solver: &mut Self, target: Option<Value>| {
                    if let Some(Value::Block(t)) = target {
                        solver.mark_edge(block, t);
                    }
                };
                match cond {
                    Lattice::Const(ConstValue::Bool(true)) => mark(self, on_true),
                    Lattice::Const(ConstValue::Bool(false)) => mark(self, on_false),
                    Lattice::Top => {}
                    _ => {
                        mark(self, on_true);
                        mark(self, on_false);
                    }
                }
            }
            Opcode::ExcSetup => {
                let mut targets = Vec::new();
                for arg in data.args() {
                    arg.for_each_value(&mut |v| {
                        if let Value::Block(t) = v {
                            targets.push(*t);
                        }
                    });
                }
                for t in targets {
                    self.mark_edge(block, t);
                }
            }
            Opcode::Ret | Opcode::Store | Opcode::ExcThrow | Opcode::CheckError => {}
            opcode if opcode.is_foldable() => {
                let computed = self.fold_op(op);
                self.update(op, computed);
            }
            // Everything else produces an unknown runtime value.
            _ => self.update(op, Lattice::Bottom),
        }
    }

    fn fold_op(&self, op: OpId) -> Lattice {
        let data = self.func.op(op);
        let arity = if data.opcode.is_unary_arith() || data.opcode == Opcode::Convert {
            1
        } else {
            2
        };
        let mut consts = Vec::with_capacity(arity);
        for index in 0..arity {
            let value = match data.arg_value(index) {
                Some(v) => v.clone(),
                None => return Lattice::Bottom,
            };
            match self.value_lattice(&value) {
                Lattice::Bottom => return Lattice::Bottom,
                Lattice::Top => return Lattice::Top,
                Lattice::Const(c) => consts.push((value, c)),
            }
        }

        let folded = if data.opcode.is_comparison() {
            let operand_ty = self
                .func
                .value_type(&consts[0].0)
                .unwrap_or(TypeId::OPAQUE);
            fold::compare(self.types, data.opcode, &consts[0].1, &consts[1].1, operand_ty)
        } else if data.opcode.is_binary_arith() {
            fold::binary(self.types, data.opcode, &consts[0].1, &consts[1].1, data.ty)
        } else if data.opcode == Opcode::Convert {
            fold::convert(self.types, &consts[0].1, data.ty)
        } else {
            fold::unary(self.types, data.opcode, &consts[0].1, data.ty)
        };
        folded.map_or(Lattice::Bottom, Lattice::Const)
    }
}

struct Solution {
    lattice: HashMap<OpId, Lattice>,
    exec: HashSet<(BlockId, BlockId)>,
    reachable: HashSet<BlockId>,
}

/// Runs SCCP over a function to fixpoint and rewrites it in place.
pub fn run(func: &mut Function, types: &TypeTable) -> Result<(), PassError> {
    let start = func.start_block().ok_or_else(|| PassError::Precondition {
        reason: "function has no blocks".to_string(),
    })?;
    cfa::run(func);
    let solution = Solver::new(func, types).solve(start);
    rewrite(func, solution);
    cfa::run(func);
    Ok(())
}

fn rewrite(func: &mut Function, solution: Solution) {
    let blocks: Vec<BlockId> = func.blocks().to_vec();

    // Constant-valued ops: uses replaced by the constant, effect-free
    // producers deleted.
    for &b in blocks.iter().filter(|b| solution.reachable.contains(b)) {
        let ops: Vec<OpId> = func.block(b).ops().to_vec();
        for op in ops {
            if func.op(op).ty == TypeId::VOID {
                continue;
            }
            if let Some(Lattice::Const(c)) = solution.lattice.get(&op) {
                let ty = func.op(op).ty;
                let konst = func.new_const(c.clone(), ty);
                func.replace_all_uses(&Value::Op(op), &konst);
                if func.op(op).opcode.is_effect_free() {
                    func.delete(op);
                }
            }
        }
    }

    // Constant-condition branches become jumps to the taken target.
    for &b in blocks.iter().filter(|b| solution.reachable.contains(b)) {
        let Some(term) = func.terminator(b) else { continue };
        if func.op(term).opcode != Opcode::Cbranch {
            continue;
        }
        let cond = func.op(term).arg_value(0).cloned();
        let taken = match cond {
            Some(Value::Const(c)) => match func.constant(c).value {
                ConstValue::Bool(k) => Some(k),
                _ => None,
            },
            Some(Value::Op(o)) => match solution.lattice.get(&o) {
                Some(Lattice::Const(ConstValue::Bool(k))) => Some(*k),
                _ => None,
            },
            _ => None,
        };
        if let Some(k) = taken {
            let index = if k { 1 } else { 2 };
            if let Some(Value::Block(target)) = func.op(term).arg_value(index).cloned() {
                func.delete(term);
                let jump = func.create_op(
                    Opcode::Jump,
                    TypeId::VOID,
                    vec![Value::Block(target).into()],
                );
                func.push_op(b, jump);
            }
        }
    }

    // Remaining phis drop incomings from non-executable edges and collapse
    // when a single entry is left.
    for &b in blocks.iter().filter(|b| solution.reachable.contains(b)) {
        let phis: Vec<OpId> = func.leaders(b).collect();
        for phi in phis {
            if func.op(phi).block().is_none() {
                continue;
            }
            let Some((preds, values)) = func.op(phi).phi_args() else { continue };
            let kept: Vec<(BlockId, Value)> = preds
                .iter()
                .zip(&values)
                .filter(|(p, _)| solution.exec.contains(&(**p, b)))
                .map(|(p, v)| (*p, v.clone()))
                .collect();
            if kept.len() == 1 {
                let (_, value) = kept.into_iter().next().unwrap_or((b, Value::Arg(0)));
                func.replace_all_uses(&Value::Op(phi), &value);
                func.delete(phi);
            } else if kept.len() != preds.len() {
                let (kept_preds, kept_values): (Vec<BlockId>, Vec<Value>) =
                    kept.into_iter().unzip();
                func.set_args(phi, phi_operands(&kept_preds, &kept_values));
            }
        }
    }

    // Unreachable blocks disappear entirely.
    for &b in &blocks {
        if !solution.reachable.contains(&b) {
            func.remove_block(b);
        }
    }

    cleanup(func);
}

/// Predecessors computed straight from terminator targets.
fn current_preds(func: &Function) -> HashMap<BlockId, Vec<BlockId>> {
    let mut preds: HashMap<BlockId, Vec<BlockId>> =
        func.blocks().iter().map(|&b| (b, Vec::new())).collect();
    for &b in func.blocks() {
        for t in cfa::deduce_successors(func, b, true) {
            if let Some(p) = preds.get_mut(&t) {
                if !p.contains(&b) {
                    p.push(b);
                }
            }
        }
    }
    preds
}

/// Threads away empty forwarding blocks and merges single-predecessor jump
/// chains, to fixpoint. Blocks whose target still carries phis are left
/// alone (re-pointing their predecessors could duplicate phi entries), the
/// start block is never removed, and self-loops are never threaded.
fn cleanup(func: &mut Function) {
    loop {
        let mut changed = false;
        let preds = current_preds(func);
        let start = match func.start_block() {
            Some(s) => s,
            None => return,
        };

        // Empty forwarding blocks: a non-start block holding only `jump(t)`.
        for &e in func.blocks().to_vec().iter().filter(|&&e| e != start) {
            let ops = func.block(e).ops().to_vec();
            if ops.len() != 1 || func.op(ops[0]).opcode != Opcode::Jump {
                continue;
            }
            let Some(Value::Block(t)) = func.op(ops[0]).arg_value(0).cloned() else {
                continue;
            };
            if t == e {
                continue;
            }
            if func.leaders(t).next().is_some() {
                continue;
            }
            let e_preds = preds.get(&e).cloned().unwrap_or_default();

            let mut map = HashMap::new();
            map.insert(Value::Block(e), Value::Block(t));
            for &p in &e_preds {
                if let Some(term) = func.terminator(p) {
                    func.replace_args(term, &map);
                }
            }
            func.remove_block(e);
            changed = true;
            break;
        }
        if changed {
            continue;
        }

        // Merge `b -> t` when `t` has no other predecessor and no phis.
        for &b in &func.blocks().to_vec() {
            let Some(term) = func.terminator(b) else { continue };
            if func.op(term).opcode != Opcode::Jump {
                continue;
            }
            let Some(Value::Block(t)) = func.op(term).arg_value(0).cloned() else {
                continue;
            };
            if t == b || t == start {
                continue;
            }
            if preds.get(&t).cloned().unwrap_or_default() != vec![b] {
                continue;
            }
            if func.leaders(t).next().is_some() {
                continue;
            }

            func.delete(term);
            let moved: Vec<OpId> = func.block(t).ops().to_vec();
            for &op in &moved {
                func.unlink(op);
            }
            func.extend(b, &moved);
            // Phis downstream that saw `t` as predecessor now see `b`.
            let users: Vec<OpId> = func.users(&Value::Block(t)).collect();
            let mut map = HashMap::new();
            map.insert(Value::Block(t), Value::Block(b));
            for user in users {
                if func.op(user).block().is_some() {
                    func.replace_args(user, &map);
                }
            }
            func.remove_block(t);
            changed = true;
            break;
        }

        if !changed {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssir_core::{verify, Builder, Function, TypeTable};

    fn int_const(func: &mut Function, v: i64) -> Value {
        func.new_const(ConstValue::Int(v), TypeId::INT32)
    }

    fn single_ret_const(func: &Function) -> ConstValue {
        let ops: Vec<OpId> = func.ops_in_order().collect();
        assert_eq!(ops.len(), 1, "expected a single remaining op");
        let ret = func.op(ops[0]);
        assert_eq!(ret.opcode, Opcode::Ret);
        match ret.arg_value(0) {
            Some(Value::Const(c)) => func.constant(*c).value.clone(),
            other => panic!("expected a constant return, got {other:?}"),
        }
    }

    /// `x=2; y=3; z=4; if (x<y) x=y else x=i; return x+z` -- folds to
    /// `ret 7`.
    #[test]
    fn straight_line_constant_fold() {
        let mut func = Function::new("f", vec![("i".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c2 = int_const(&mut func, 2);
        let c3 = int_const(&mut func, 3);
        let c4 = int_const(&mut func, 4);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let entry = b.current_block();
            let then_ = b.func_mut().new_block("then", None);
            let else_ = b.func_mut().new_block("else", None);
            let merge = b.func_mut().new_block("merge", None);

            b.position_at_end(entry);
            let cond = b.lt(c2.clone(), c3.clone());
            b.cbranch(Value::Op(cond), then_, else_);
            b.position_at_end(then_);
            b.jump(merge);
            b.position_at_end(else_);
            b.jump(merge);
            b.position_at_end(merge);
            let x = b
                .phi(vec![then_, else_], vec![c3.clone(), Value::Arg(0)], TypeId::INT32)
                .unwrap();
            let r = b.add(Value::Op(x), c4.clone()).unwrap();
            b.ret(Some(Value::Op(r)));
        }

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();
        assert_eq!(single_ret_const(&func), ConstValue::Int(7));
    }

    /// `while (x<y) { if (x<y) x=2; }` with x=2, y=3 -- the loop is constant
    /// true: two blocks remain, the second jumping to itself; the return is
    /// unreachable.
    #[test]
    fn endless_loop_collapses_to_self_jump() {
        let mut func = Function::new("f", vec![("i".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c2 = int_const(&mut func, 2);
        let c2b = int_const(&mut func, 2);
        let c3 = int_const(&mut func, 3);
        let c4 = int_const(&mut func, 4);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let entry = b.current_block();
            let cond = b.func_mut().new_block("cond", None);
            let body = b.func_mut().new_block("body", None);
            let ifthen = b.func_mut().new_block("ifthen", None);
            let ifexit = b.func_mut().new_block("ifexit", None);
            let exit = b.func_mut().new_block("exit", None);

            b.position_at_end(entry);
            b.jump(cond);

            b.position_at_end(cond);
            let x = b
                .phi(vec![entry, ifexit], vec![c2.clone(), c2.clone()], TypeId::INT32)
                .unwrap();
            let t = b.lt(Value::Op(x), c3.clone());
            b.cbranch(Value::Op(t), body, exit);

            b.position_at_end(body);
            let t2 = b.lt(Value::Op(x), c3.clone());
            b.cbranch(Value::Op(t2), ifthen, ifexit);

            b.position_at_end(ifthen);
            b.jump(ifexit);

            b.position_at_end(ifexit);
            let x2 = b
                .phi(vec![body, ifthen], vec![Value::Op(x), c2b.clone()], TypeId::INT32)
                .unwrap();
            b.jump(cond);

            b.position_at_end(exit);
            let r = b.add(Value::Op(x), c4.clone()).unwrap();
            b.ret(Some(Value::Op(r)));

            // The loop phi's second incoming is the inner merge phi.
            b.func_mut().set_args(
                x,
                phi_operands(&[entry, ifexit], &[c2.clone(), Value::Op(x2)]),
            );
        }

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();

        let blocks = func.blocks().to_vec();
        assert_eq!(blocks.len(), 2);
        let (first, loop_) = (blocks[0], blocks[1]);
        let first_term = func.terminator(first).unwrap();
        assert_eq!(func.op(first_term).opcode, Opcode::Jump);
        assert_eq!(func.op(first_term).arg_value(0), Some(&Value::Block(loop_)));
        let loop_term = func.terminator(loop_).unwrap();
        assert_eq!(func.op(loop_term).opcode, Opcode::Jump);
        assert_eq!(func.op(loop_term).arg_value(0), Some(&Value::Block(loop_)));
    }

    /// `while (y<x) { x=1; x=x+1; }` with x=2, y=3 -- the loop never runs:
    /// everything folds to `ret 6`.
    #[test]
    fn dead_loop_folds_away() {
        let mut func = Function::new("f", vec![("i".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c1 = int_const(&mut func, 1);
        let c2 = int_const(&mut func, 2);
        let c3 = int_const(&mut func, 3);
        let c4 = int_const(&mut func, 4);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let entry = b.current_block();
            let cond = b.func_mut().new_block("cond", None);
            let body = b.func_mut().new_block("body", None);
            let exit = b.func_mut().new_block("exit", None);

            b.position_at_end(entry);
            b.jump(cond);

            b.position_at_end(cond);
            let x = b
                .phi(vec![entry, body], vec![c2.clone(), c2.clone()], TypeId::INT32)
                .unwrap();
            let t = b.lt(c3.clone(), Value::Op(x));
            b.cbranch(Value::Op(t), body, exit);

            b.position_at_end(body);
            let x3 = b.add(c1.clone(), c1.clone()).unwrap();
            b.jump(cond);

            b.position_at_end(exit);
            let r = b.add(Value::Op(x), c4.clone()).unwrap();
            b.ret(Some(Value::Op(r)));

            b.func_mut()
                .set_args(x, phi_operands(&[entry, body], &[c2.clone(), Value::Op(x3)]));
        }

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();
        assert_eq!(single_ret_const(&func), ConstValue::Int(6));
    }

    /// Broadcast vector constants fold with element semantics:
    /// `Vector<UInt32,4> x=2, y=3; return x+y` becomes `ret 5`.
    #[test]
    fn vector_constants_fold_as_scalars() {
        let mut types = TypeTable::new();
        let vec4 = types.vector(TypeId::UINT32, 4);
        let mut func = Function::new("f", vec![], vec4);
        let x = func.new_const(ConstValue::Int(2), vec4);
        let y = func.new_const(ConstValue::Int(3), vec4);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let s = b.add(x.clone(), y.clone()).unwrap();
            b.ret(Some(Value::Op(s)));
        }

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();
        assert_eq!(single_ret_const(&func), ConstValue::Int(5));
    }

    /// Running SCCP twice yields the same IR shape as running it once.
    #[test]
    fn sccp_is_idempotent() {
        let mut func = Function::new("f", vec![("i".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c2 = int_const(&mut func, 2);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let entry = b.current_block();
            let exit = b.func_mut().new_block("exit", None);
            b.position_at_end(entry);
            // Condition depends on the argument: stays Bottom, branch stays.
            let t = b.lt(Value::Arg(0), c2.clone());
            b.cbranch(Value::Op(t), exit, exit);
            b.position_at_end(exit);
            let r = b.add(Value::Arg(0), c2.clone()).unwrap();
            b.ret(Some(Value::Op(r)));
        }

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();
        let shape_once: Vec<Opcode> =
            func.ops_in_order().map(|op| func.op(op).opcode).collect();
        let blocks_once = func.blocks().len();

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();
        let shape_twice: Vec<Opcode> =
            func.ops_in_order().map(|op| func.op(op).opcode).collect();
        assert_eq!(shape_once, shape_twice);
        assert_eq!(blocks_once, func.blocks().len());
    }

    /// A branch with an unknown condition keeps both edges executable and
    /// keeps the phi, pruning nothing.
    #[test]
    fn unknown_condition_keeps_phi() {
        let mut func = Function::new("f", vec![("i".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c1 = int_const(&mut func, 1);
        let c2 = int_const(&mut func, 2);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let entry = b.current_block();
            let then_ = b.func_mut().new_block("then", None);
            let else_ = b.func_mut().new_block("else", None);
            let merge = b.func_mut().new_block("merge", None);
            b.position_at_end(entry);
            let t = b.lt(Value::Arg(0), c1.clone());
            b.cbranch(Value::Op(t), then_, else_);
            b.position_at_end(then_);
            b.jump(merge);
            b.position_at_end(else_);
            b.jump(merge);
            b.position_at_end(merge);
            let x = b
                .phi(vec![then_, else_], vec![c1.clone(), c2.clone()], TypeId::INT32)
                .unwrap();
            b.ret(Some(Value::Op(x)));
        }

        run(&mut func, &types).unwrap();
        verify(&func, &types).unwrap();
        let phis: Vec<OpId> = func
            .ops_in_order()
            .filter(|&op| func.op(op).opcode == Opcode::Phi)
            .collect();
        assert_eq!(phis.len(), 1);
        let (preds, values) = func.op(phis[0]).phi_args().unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(values.len(), 2);
    }
}
