//! Dead-code elimination: the trivial sweep.
//!
//! Deletes effect-free ops whose result has no users. One pass over the
//! function; no branch pruning, no dead-loop removal (constant propagation
//! handles those).

use ssir_core::{Function, OpId, Value};

/// Removes unused effect-free ops.
pub fn run(func: &mut Function) {
    let ops: Vec<OpId> = func.ops_in_order().collect();
    for op in ops {
        if func.op(op).opcode.is_effect_free() && !func.has_users(&Value::Op(op)) {
            func.delete(op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssir_core::{Builder, ConstValue, Function, Opcode, TypeId, TypeTable};

    #[test]
    fn unused_pure_ops_are_swept() {
        let mut func = Function::new("f", vec![("a".into(), TypeId::INT32)], TypeId::INT32);
        let mut types = TypeTable::new();
        let c = func.new_const(ConstValue::Int(1), TypeId::INT32);
        {
            let mut b = Builder::new(&mut func, &mut types);
            let dead = b.add(Value::Arg(0), c.clone()).unwrap();
            let live = b.add(Value::Arg(0), c.clone()).unwrap();
            let _ = dead;
            b.ret(Some(Value::Op(live)));
        }
        assert_eq!(func.op_count(), 3);
        run(&mut func);
        assert_eq!(func.op_count(), 2);
        let opcodes: Vec<Opcode> = func.ops_in_order().map(|op| func.op(op).opcode).collect();
        assert_eq!(opcodes, vec![Opcode::Add, Opcode::Ret]);
    }

    #[test]
    fn effectful_ops_survive() {
        let mut func = Function::new("f", vec![("a".into(), TypeId::INT32)], TypeId::VOID);
        let mut types = TypeTable::new();
        {
            let mut b = Builder::new(&mut func, &mut types);
            let slot = b.alloca(TypeId::INT32);
            // The store keeps the alloca alive; the store itself is
            // effectful and never swept.
            b.store(Value::Arg(0), Value::Op(slot));
            b.ret(None);
        }
        run(&mut func);
        let opcodes: Vec<Opcode> = func.ops_in_order().map(|op| func.op(op).opcode).collect();
        assert_eq!(opcodes, vec![Opcode::Alloca, Opcode::Store, Opcode::Ret]);
    }
}
