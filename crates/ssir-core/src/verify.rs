//! IR verifier: purely diagnostic, never mutates.
//!
//! Checks the invariants passes rely on: every block ends in exactly one
//! terminator, leaders (phis) form a prefix, result names are unique, no use
//! dangles, phi arities match the actual predecessors, the uses-map is
//! consistent with the argument lists, and a few type rules (`cbranch`
//! conditions are Bool, phi incomings match the phi's type).

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::function::Function;
use crate::id::BlockId;
use crate::ops::Opcode;
use crate::type_table::TypeTable;
use crate::value::{collect_values, Value};

fn malformed(func: &Function, reason: String) -> CoreError {
    CoreError::MalformedIr {
        function: func.name().to_string(),
        reason,
    }
}

/// Computes each live block's predecessors from terminator targets and
/// `exc_setup` handler lists.
fn actual_preds(func: &Function) -> HashMap<BlockId, Vec<BlockId>> {
    let mut preds: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
    for &b in func.blocks() {
        preds.entry(b).or_default();
    }
    for &b in func.blocks() {
        let mut targets = Vec::new();
        if let Some(term) = func.terminator(b) {
            for arg in func.op(term).args() {
                arg.for_each_value(&mut |v| {
                    if let Value::Block(t) = v {
                        targets.push(*t);
                    }
                });
            }
        }
        for &op in func.block(b).ops() {
            if func.op(op).opcode == Opcode::ExcSetup {
                for arg in func.op(op).args() {
                    arg.for_each_value(&mut |v| {
                        if let Value::Block(t) = v {
                            targets.push(*t);
                        }
                    });
                }
            }
        }
        let mut seen = HashSet::new();
        for t in targets {
            if seen.insert(t) {
                preds.entry(t).or_default().push(b);
            }
        }
    }
    preds
}

/// Verifies a function. Returns the first violation found.
pub fn verify(func: &Function, types: &TypeTable) -> Result<(), CoreError> {
    if func.blocks().is_empty() {
        return Err(malformed(func, "function has no blocks".to_string()));
    }

    let mut names: HashSet<&str> = HashSet::new();

    for &b in func.blocks() {
        let block = func.block(b);
        let ops = block.ops();
        if ops.is_empty() {
            return Err(malformed(func, format!("block '{}' is empty", block.name())));
        }
        let last = ops[ops.len() - 1];
        if !func.op(last).opcode.is_terminator() {
            return Err(malformed(
                func,
                format!("block '{}' lacks a terminator", block.name()),
            ));
        }
        let mut in_leaders = true;
        for (i, &op) in ops.iter().enumerate() {
            let data = func.op(op);
            if data.block() != Some(b) {
                return Err(malformed(
                    func,
                    format!("op '{}' does not know its block", data.name),
                ));
            }
            if data.opcode.is_terminator() && i + 1 != ops.len() {
                return Err(malformed(
                    func,
                    format!("terminator '{}' in the middle of block '{}'", data.name, block.name()),
                ));
            }
            if data.opcode.is_leader() {
                if !in_leaders {
                    return Err(malformed(
                        func,
                        format!("phi '{}' after non-phi ops in block '{}'", data.name, block.name()),
                    ));
                }
            } else {
                in_leaders = false;
            }
            if !names.insert(data.name.as_str()) {
                return Err(malformed(
                    func,
                    format!("result name '{}' assigned more than once", data.name),
                ));
            }
        }
    }

    let preds = actual_preds(func);

    for op in func.ops_in_order().collect::<Vec<_>>() {
        let data = func.op(op);
        for value in collect_values(data.args()) {
            match value {
                Value::Op(target) => {
                    if func.op(target).block().is_none() {
                        return Err(malformed(
                            func,
                            format!("op '{}' uses the unlinked op {target}", data.name),
                        ));
                    }
                }
                Value::Block(target) => {
                    if !func.is_live_block(target) {
                        return Err(malformed(
                            func,
                            format!("op '{}' references the dead block {target}", data.name),
                        ));
                    }
                }
                Value::Arg(i) => {
                    if i as usize >= func.params().len() {
                        return Err(malformed(
                            func,
                            format!("op '{}' references argument {i} out of range", data.name),
                        ));
                    }
                }
                Value::Const(_) | Value::Global(_) => {}
            }
        }

        if data.opcode == Opcode::Phi {
            let block = data.block().unwrap_or(BlockId(0));
            let (phi_preds, phi_values) = data.phi_args().ok_or_else(|| {
                malformed(
                    func,
                    format!("phi '{}' args are not [preds, values] lists", data.name),
                )
            })?;
            if phi_preds.len() != phi_values.len() {
                return Err(CoreError::PhiArityMismatch {
                    preds: phi_preds.len(),
                    values: phi_values.len(),
                });
            }
            let actual: HashSet<BlockId> = preds
                .get(&block)
                .map(|p| p.iter().copied().collect())
                .unwrap_or_default();
            let listed: HashSet<BlockId> = phi_preds.iter().copied().collect();
            if listed != actual || phi_preds.len() != actual.len() {
                return Err(malformed(
                    func,
                    format!(
                        "phi '{}' lists {} predecessors, block has {}",
                        data.name,
                        phi_preds.len(),
                        actual.len()
                    ),
                ));
            }
            for value in &phi_values {
                if let Some(ty) = func.value_type(value) {
                    if !types.equals(ty, data.ty) {
                        return Err(CoreError::TypeMismatch {
                            context: format!("phi '{}'", data.name),
                            reason: format!(
                                "incoming value of type {} does not match phi type {}",
                                types.display(ty),
                                types.display(data.ty)
                            ),
                        });
                    }
                }
            }
        }

        if data.opcode == Opcode::Cbranch {
            let cond = data.arg_value(0).cloned().ok_or_else(|| {
                malformed(func, format!("cbranch '{}' lacks a condition", data.name))
            })?;
            if let Some(ty) = func.value_type(&cond) {
                if !types.is_bool(ty) {
                    return Err(CoreError::TypeMismatch {
                        context: format!("cbranch '{}'", data.name),
                        reason: format!("condition has type {}", types.display(ty)),
                    });
                }
            }
        }
    }

    // Uses-map consistency, both directions (unlinked users are tolerated;
    // `unlink` deliberately leaves them in place).
    for op in func.ops_in_order().collect::<Vec<_>>() {
        for value in collect_values(func.op(op).args()) {
            if !func.users(&value).any(|u| u == op) {
                return Err(malformed(
                    func,
                    format!("uses-map is missing user '{}'", func.op(op).name),
                ));
            }
        }
    }
    for (value, users) in func.uses_map() {
        for &user in users {
            if func.op(user).block().is_none() {
                continue;
            }
            if !collect_values(func.op(user).args()).contains(value) {
                return Err(malformed(
                    func,
                    format!("uses-map lists a stale user '{}'", func.op(user).name),
                ));
            }
        }
    }

    Ok(())
}
