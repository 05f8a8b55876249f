//! End-to-end pass tests: transformed functions are executed through the
//! interpreter and must behave exactly like their SSA originals.

use proptest::prelude::*;
use ssir_core::{
    phi_operands, verify, ConstValue, Function, Module, Opcode, TypeId, Value,
};
use ssir_interp::{run_function, DummyTracer};
use ssir_passes::{cfa, lower_calls, reg2mem, sccp};

/// `swap(a, b, n)`: swaps `a` and `b` `n` times through a pair of loop-header
/// phis referencing each other -- the classic parallel-phi swap cycle.
fn swap_module() -> Module {
    let mut module = Module::new();
    let func = Function::new(
        "swap",
        vec![
            ("a".into(), TypeId::INT32),
            ("b".into(), TypeId::INT32),
            ("n".into(), TypeId::INT32),
        ],
        TypeId::INT32,
    );
    module.add_function(func).unwrap();
    let f = module.get_function_mut("swap").unwrap();
    let c0 = f.new_const(ConstValue::Int(0), TypeId::INT32);
    let c1 = f.new_const(ConstValue::Int(1), TypeId::INT32);
    {
        let mut b = module.builder("swap").unwrap();
        let entry = b.current_block();
        let head = b.func_mut().new_block("head", None);
        let body = b.func_mut().new_block("body", None);
        let exit = b.func_mut().new_block("exit", None);

        b.position_at_end(entry);
        b.jump(head);

        b.position_at_end(head);
        let i = b
            .phi(vec![entry, body], vec![c0.clone(), c0.clone()], TypeId::INT32)
            .unwrap();
        let x = b
            .phi(vec![entry, body], vec![Value::Arg(0), Value::Arg(0)], TypeId::INT32)
            .unwrap();
        let y = b
            .phi(vec![entry, body], vec![Value::Arg(1), Value::Arg(1)], TypeId::INT32)
            .unwrap();
        let c = b.lt(Value::Op(i), Value::Arg(2));
        b.cbranch(Value::Op(c), body, exit);

        b.position_at_end(body);
        let i2 = b.add(Value::Op(i), c1.clone()).unwrap();
        b.jump(head);

        b.position_at_end(exit);
        b.ret(Some(Value::Op(x)));

        // Wire the loop-carried values: x and y swap through each other.
        b.func_mut()
            .set_args(i, phi_operands(&[entry, body], &[c0.clone(), Value::Op(i2)]));
        b.func_mut()
            .set_args(x, phi_operands(&[entry, body], &[Value::Arg(0), Value::Op(y)]));
        b.func_mut()
            .set_args(y, phi_operands(&[entry, body], &[Value::Arg(1), Value::Op(x)]));
    }
    module
}

fn run_swap(module: &Module, a: i64, b: i64, n: i64) -> ConstValue {
    run_function(
        module,
        "swap",
        vec![ConstValue::Int(a), ConstValue::Int(b), ConstValue::Int(n)],
        &mut DummyTracer,
    )
    .unwrap()
    .expect("swap returns a value")
}

#[test]
fn reg2mem_preserves_swap_semantics() {
    let mut module = swap_module();

    let before: Vec<ConstValue> = (0..4).map(|n| run_swap(&module, 10, 20, n)).collect();
    assert_eq!(before[0], ConstValue::Int(10));
    assert_eq!(before[1], ConstValue::Int(20));
    assert_eq!(before[2], ConstValue::Int(10));

    let mut types = std::mem::take(&mut module.types);
    let func = module.get_function_mut("swap").unwrap();
    reg2mem::run(func, &mut types).unwrap();
    verify(func, &types).unwrap();
    assert_eq!(
        func.ops_in_order()
            .filter(|&op| func.op(op).opcode == Opcode::Phi)
            .count(),
        0
    );
    module.types = types;

    let after: Vec<ConstValue> = (0..4).map(|n| run_swap(&module, 10, 20, n)).collect();
    assert_eq!(before, after);
}

#[test]
fn verify_holds_after_each_pass() {
    let mut module = swap_module();
    let mut types = std::mem::take(&mut module.types);
    let func = module.get_function_mut("swap").unwrap();

    cfa::run(func);
    verify(func, &types).unwrap();

    sccp::run(func, &types).unwrap();
    verify(func, &types).unwrap();

    reg2mem::run(func, &mut types).unwrap();
    verify(func, &types).unwrap();
}

#[test]
fn sccp_then_reg2mem_still_executes() {
    let mut module = swap_module();
    let mut types = std::mem::take(&mut module.types);
    {
        let func = module.get_function_mut("swap").unwrap();
        sccp::run(func, &types).unwrap();
        reg2mem::run(func, &mut types).unwrap();
    }
    module.types = types;
    assert_eq!(run_swap(&module, 3, 4, 1), ConstValue::Int(4));
    assert_eq!(run_swap(&module, 3, 4, 2), ConstValue::Int(3));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The lowered function computes the same result as the SSA original for
    /// arbitrary inputs and iteration counts.
    #[test]
    fn reg2mem_preserves_swap_for_random_inputs(
        a in -100i64..100,
        b in -100i64..100,
        n in 0i64..6,
    ) {
        let mut module = swap_module();
        let before = run_swap(&module, a, b, n);
        prop_assert_eq!(
            &before,
            &ConstValue::Int(if n % 2 == 0 { a } else { b })
        );

        let mut types = std::mem::take(&mut module.types);
        reg2mem::run(module.get_function_mut("swap").unwrap(), &mut types).unwrap();
        module.types = types;

        let after = run_swap(&module, a, b, n);
        prop_assert_eq!(before, after);
    }
}

#[test]
fn lowered_call_errors_trap_at_runtime() {
    let mut module = Module::new();

    // external(x) = x
    let external = Function::new("external", vec![("x".into(), TypeId::INT32)], TypeId::INT32);
    module.add_function(external).unwrap();
    {
        let mut b = module.builder("external").unwrap();
        b.ret(Some(Value::Arg(0)));
    }

    // testfunc(a) = call external(a), trapping when the result is 0.
    let testfunc = Function::new("testfunc", vec![("a".into(), TypeId::INT32)], TypeId::INT32);
    module.add_function(testfunc).unwrap();
    let call;
    {
        let mut b = module.builder("testfunc").unwrap();
        call = b.call(Value::Global("external".into()), vec![Value::Arg(0)], TypeId::INT32);
        b.ret(Some(Value::Op(call)));
    }
    let badval = module
        .get_function_mut("testfunc")
        .unwrap()
        .new_const(ConstValue::Int(0), TypeId::INT32);
    module
        .get_function_mut("testfunc")
        .unwrap()
        .add_metadata(call, "exc.badval", badval);

    let mut types = std::mem::take(&mut module.types);
    lower_calls::run(module.get_function_mut("testfunc").unwrap(), &mut types).unwrap();
    module.types = types;

    let ok = run_function(&module, "testfunc", vec![ConstValue::Int(7)], &mut DummyTracer);
    assert_eq!(ok.unwrap(), Some(ConstValue::Int(7)));

    let err = run_function(&module, "testfunc", vec![ConstValue::Int(0)], &mut DummyTracer);
    assert!(err.is_err());
}
