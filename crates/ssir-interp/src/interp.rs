//! A tracing interpreter over ssir modules.
//!
//! Executes one function at a time: a block walk with parallel phi
//! evaluation on block entry, the shared constant-evaluation kernel for
//! arithmetic, `alloca`/`load`/`store` cells for lowered stack slots, and
//! recursive `call` dispatch through the module. Every step is reported to a
//! [`TraceSink`]; exceptions surface as [`ExecError::Exception`] after an
//! `Exc` trace item.
//!
//! `exc_setup` is accepted but handlers are not modeled: a throw always
//! unwinds to the calling host.

use std::collections::HashMap;

use ssir_core::{fold, ConstValue, Function, Module, OpId, Opcode, Operand, Value};

use crate::error::ExecError;
use crate::trace::{TraceItem, TraceSink, TraceValue};

const MAX_CALL_DEPTH: usize = 200;

/// Runs a named function of a module with the given argument values.
pub fn run_function(
    module: &Module,
    name: &str,
    args: Vec<ConstValue>,
    sink: &mut dyn TraceSink,
) -> Result<Option<ConstValue>, ExecError> {
    let func = module
        .get_function(name)
        .ok_or_else(|| ExecError::UnknownFunction { name: name.to_string() })?;
    eval_function(module, func, args, sink, 0)
}

struct Frame {
    env: HashMap<OpId, ConstValue>,
    cells: HashMap<OpId, Option<ConstValue>>,
}

fn malformed(reason: impl Into<String>) -> ExecError {
    ExecError::Malformed { reason: reason.into() }
}

fn eval_function(
    module: &Module,
    func: &Function,
    args: Vec<ConstValue>,
    sink: &mut dyn TraceSink,
    depth: usize,
) -> Result<Option<ConstValue>, ExecError> {
    if depth >= MAX_CALL_DEPTH {
        return Err(ExecError::CallDepthExceeded);
    }
    if args.len() != func.params().len() {
        return Err(ExecError::ArityMismatch {
            name: func.name().to_string(),
            expected: func.params().len(),
            got: args.len(),
        });
    }

    sink.trace(TraceItem::Call {
        function: func.name().to_string(),
        args: args.iter().cloned().map(TraceValue::Const).collect(),
    });

    let mut frame = Frame { env: HashMap::new(), cells: HashMap::new() };
    let mut block = func
        .start_block()
        .ok_or_else(|| malformed("function has no blocks"))?;
    let mut prev = None;

    loop {
        let ops = func.block(block).ops().to_vec();
        let leaders: Vec<OpId> = func.leaders(block).collect();

        // Phis read their incoming values in parallel: every value is
        // evaluated against the pre-entry state before any phi is assigned.
        if !leaders.is_empty() {
            let pred = prev.ok_or_else(|| malformed("phi in the entry block"))?;
            let mut staged = Vec::new();
            for &phi in &leaders {
                let (preds, values) = func
                    .op(phi)
                    .phi_args()
                    .ok_or_else(|| malformed("phi args are not [preds, values]"))?;
                let index = preds
                    .iter()
                    .position(|&p| p == pred)
                    .ok_or_else(|| malformed("phi has no incoming for the taken edge"))?;
                staged.push((phi, eval_value(func, &frame, &args, &values[index])?));
            }
            for (phi, value) in staged {
                sink.trace(TraceItem::Res {
                    name: func.op(phi).name.clone(),
                    opcode: Opcode::Phi,
                    args: vec![],
                    result: value.clone(),
                });
                frame.env.insert(phi, value);
            }
        }

        let mut next = None;
        for &op in &ops[leaders.len()..] {
            let data = func.op(op);
            let opcode = data.opcode;
            sink.trace(TraceItem::Op {
                name: data.name.clone(),
                opcode,
                args: data
                    .args()
                    .iter()
                    .map(|o| trace_operand(func, &frame, &args, o))
                    .collect(),
            });

            match opcode {
                Opcode::Jump => {
                    let Some(Value::Block(t)) = data.arg_value(0) else {
                        return Err(malformed("jump without a block target"));
                    };
                    prev = Some(block);
                    next = Some(*t);
                    break;
                }
                Opcode::Cbranch => {
                    let cond = eval_arg(func, &frame, &args, op, 0)?;
                    let taken = match cond {
                        ConstValue::Bool(k) => k,
                        _ => return Err(ExecError::EvalFailed { opcode: "cbranch".into() }),
                    };
                    let index = if taken { 1 } else { 2 };
                    let Some(Value::Block(t)) = data.arg_value(index) else {
                        return Err(malformed("cbranch without block targets"));
                    };
                    prev = Some(block);
                    next = Some(*t);
                    break;
                }
                Opcode::Ret => {
                    let result = match data.arg_value(0) {
                        Some(v) => Some(eval_value(func, &frame, &args, v)?),
                        None => None,
                    };
                    sink.trace(TraceItem::Ret { result: result.clone() });
                    return Ok(result);
                }
                Opcode::ExcThrow => {
                    let kind = match eval_arg(func, &frame, &args, op, 0)? {
                        ConstValue::Exception(kind) => kind,
                        _ => return Err(ExecError::EvalFailed { opcode: "exc_throw".into() }),
                    };
                    sink.trace(TraceItem::Exc { kind: kind.clone() });
                    return Err(ExecError::Exception { kind });
                }
                Opcode::Alloca => {
                    frame.cells.insert(op, None);
                }
                Opcode::Load => {
                    let Some(Value::Op(slot)) = data.arg_value(0) else {
                        return Err(ExecError::UnsupportedOp { opcode: "load".into() });
                    };
                    let value = match frame.cells.get(slot) {
                        Some(Some(v)) => v.clone(),
                        Some(None) => return Err(ExecError::UninitializedLoad),
                        None => {
                            return Err(ExecError::UnsupportedOp { opcode: "load".into() })
                        }
                    };
                    trace_res(sink, func, op, &value);
                    frame.env.insert(op, value);
                }
                Opcode::Store => {
                    let value = eval_arg(func, &frame, &args, op, 0)?;
                    let Some(Value::Op(slot)) = data.arg_value(1) else {
                        return Err(ExecError::UnsupportedOp { opcode: "store".into() });
                    };
                    match frame.cells.get_mut(slot) {
                        Some(cell) => *cell = Some(value),
                        None => {
                            return Err(ExecError::UnsupportedOp { opcode: "store".into() })
                        }
                    }
                }
                Opcode::Call => {
                    let Some(Value::Global(callee)) = data.arg_value(0) else {
                        return Err(ExecError::UnsupportedOp { opcode: "call".into() });
                    };
                    let target = module
                        .get_function(callee)
                        .ok_or_else(|| ExecError::UnknownFunction { name: callee.clone() })?;
                    let call_args = match data.args().get(1) {
                        Some(Operand::List(items)) => {
                            let mut vals = Vec::with_capacity(items.len());
                            for item in items {
                                let v = item
                                    .as_value()
                                    .ok_or_else(|| malformed("nested call argument list"))?;
                                vals.push(eval_value(func, &frame, &args, v)?);
                            }
                            vals
                        }
                        _ => Vec::new(),
                    };
                    let result = eval_function(module, target, call_args, sink, depth + 1)?;
                    if let Some(value) = result {
                        trace_res(sink, func, op, &value);
                        frame.env.insert(op, value);
                    }
                }
                Opcode::CheckError => {
                    let value = eval_arg(func, &frame, &args, op, 0)?;
                    let badval = eval_arg(func, &frame, &args, op, 1)?;
                    if value == badval {
                        let kind = "check_error".to_string();
                        sink.trace(TraceItem::Exc { kind: kind.clone() });
                        return Err(ExecError::Exception { kind });
                    }
                }
                Opcode::NewExc => {
                    let value = eval_arg(func, &frame, &args, op, 0)?;
                    match value {
                        ConstValue::Exception(_) => {
                            trace_res(sink, func, op, &value);
                            frame.env.insert(op, value);
                        }
                        _ => return Err(ExecError::EvalFailed { opcode: "new_exc".into() }),
                    }
                }
                // Handlers are not modeled; a throw unwinds to the caller.
                Opcode::ExcSetup => {}
                _ if opcode.is_foldable() => {
                    let value = eval_foldable(module, func, &frame, &args, op)?;
                    trace_res(sink, func, op, &value);
                    frame.env.insert(op, value);
                }
                _ => {
                    return Err(ExecError::UnsupportedOp {
                        opcode: opcode.as_str().to_string(),
                    })
                }
            }
        }

        match next {
            Some(t) => block = t,
            None => return Err(malformed("block fell through without a terminator")),
        }
    }
}

fn eval_foldable(
    module: &Module,
    func: &Function,
    frame: &Frame,
    args: &[ConstValue],
    op: OpId,
) -> Result<ConstValue, ExecError> {
    let data = func.op(op);
    let opcode = data.opcode;
    let fail = || ExecError::EvalFailed { opcode: opcode.as_str().to_string() };

    let a = eval_arg(func, frame, args, op, 0)?;
    let folded = if opcode.is_comparison() {
        let b = eval_arg(func, frame, args, op, 1)?;
        let operand = data
            .arg_value(0)
            .and_then(|v| func.value_type(v))
            .ok_or_else(fail)?;
        fold::compare(&module.types, opcode, &a, &b, operand)
    } else if opcode.is_binary_arith() {
        let b = eval_arg(func, frame, args, op, 1)?;
        fold::binary(&module.types, opcode, &a, &b, data.ty)
    } else if opcode == Opcode::Convert {
        fold::convert(&module.types, &a, data.ty)
    } else {
        fold::unary(&module.types, opcode, &a, data.ty)
    };
    folded.ok_or_else(fail)
}

fn eval_arg(
    func: &Function,
    frame: &Frame,
    args: &[ConstValue],
    op: OpId,
    index: usize,
) -> Result<ConstValue, ExecError> {
    let value = func
        .op(op)
        .arg_value(index)
        .ok_or_else(|| malformed(format!("op '{}' lacks argument {index}", func.op(op).name)))?;
    eval_value(func, frame, args, value)
}

fn eval_value(
    func: &Function,
    frame: &Frame,
    args: &[ConstValue],
    value: &Value,
) -> Result<ConstValue, ExecError> {
    match value {
        Value::Const(c) => Ok(func.constant(*c).value.clone()),
        Value::Op(o) => frame
            .env
            .get(o)
            .cloned()
            .ok_or_else(|| malformed(format!("use of '{}' before definition", func.op(*o).name))),
        Value::Arg(i) => args
            .get(*i as usize)
            .cloned()
            .ok_or_else(|| malformed(format!("argument {i} out of range"))),
        Value::Global(name) => Err(malformed(format!("global '{name}' has no runtime value"))),
        Value::Block(_) => Err(malformed("block label used as a value")),
    }
}

fn trace_res(sink: &mut dyn TraceSink, func: &Function, op: OpId, value: &ConstValue) {
    sink.trace(TraceItem::Res {
        name: func.op(op).name.clone(),
        opcode: func.op(op).opcode,
        args: vec![],
        result: value.clone(),
    });
}

fn trace_operand(
    func: &Function,
    frame: &Frame,
    args: &[ConstValue],
    operand: &Operand,
) -> TraceValue {
    match operand {
        Operand::Value(v) => trace_value(func, frame, args, v),
        Operand::List(items) => TraceValue::List(
            items
                .iter()
                .map(|item| trace_operand(func, frame, args, item))
                .collect(),
        ),
    }
}

fn trace_value(func: &Function, frame: &Frame, args: &[ConstValue], value: &Value) -> TraceValue {
    match value {
        Value::Const(c) => TraceValue::Const(func.constant(*c).value.clone()),
        Value::Op(o) => match frame.env.get(o) {
            Some(v) => TraceValue::Const(v.clone()),
            None => TraceValue::Name(func.op(*o).name.clone()),
        },
        Value::Arg(i) => match args.get(*i as usize) {
            Some(v) => TraceValue::Const(v.clone()),
            None => TraceValue::Name(format!("%arg{i}")),
        },
        Value::Global(name) => TraceValue::Name(format!("@{name}")),
        Value::Block(b) => TraceValue::Name(func.block(*b).name().to_string()),
    }
}
