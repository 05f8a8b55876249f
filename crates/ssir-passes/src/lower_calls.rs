//! Call-error lowering, driven by op metadata.
//!
//! A `call` tagged with `exc.badval` signals an error through its return
//! value. Without `exc.raise` the call gets a `check_error` op right after
//! it; with `exc.raise` the block is split and an explicit compare-and-throw
//! sequence is built: the call result is converted to the badval's type
//! (when the types differ), compared, and a fresh error block raises the
//! configured exception kind.

use ssir_core::{Builder, Function, OpId, Opcode, TypeTable, Value};

use crate::error::PassError;

/// Expands `exc.badval` / `exc.raise` metadata on calls into explicit
/// error-checking control flow.
pub fn run(func: &mut Function, types: &mut TypeTable) -> Result<(), PassError> {
    let calls: Vec<OpId> = func
        .ops_in_order()
        .filter(|&op| {
            func.op(op).opcode == Opcode::Call
                && func.op(op).metadata().contains_key("exc.badval")
        })
        .collect();

    for call in calls {
        let Some(badval) = func.op(call).metadata().get("exc.badval").cloned() else {
            continue;
        };
        let raise = func.op(call).metadata().get("exc.raise").cloned();

        match raise {
            None => {
                let mut b = Builder::new(func, types);
                b.position_after(call).map_err(PassError::Core)?;
                b.check_error(Value::Op(call), badval);
            }
            Some(kind) => {
                let (block, pos) = func.position(call).ok_or_else(|| PassError::Precondition {
                    reason: "call is not linked into a block".to_string(),
                })?;
                let next = func
                    .block(block)
                    .ops()
                    .get(pos + 1)
                    .copied()
                    .ok_or_else(|| PassError::Precondition {
                        reason: "call has no trailing ops to split off".to_string(),
                    })?;

                let err_name = func.temp("error");
                let mut b = Builder::new(func, types);
                let cont = b.splitblock(block, next, None, false).map_err(PassError::Core)?;
                let err = b.func_mut().new_block(&err_name, Some(block));

                let call_ty = b.func().op(call).ty;
                let bad_ty = b.func().value_type(&badval);
                b.position_at_end(block);
                let checked = match bad_ty {
                    Some(ty) if !b.types().equals(call_ty, ty) => {
                        Value::Op(b.convert(Value::Op(call), ty))
                    }
                    _ => Value::Op(call),
                };
                let is_bad = b.eq(checked, badval);
                b.cbranch(Value::Op(is_bad), err, cont);

                b.position_at_end(err);
                let exc = b.new_exc(kind);
                b.exc_throw(Value::Op(exc));
            }
        }
    }
    Ok(())
}
