//! Builder: a positional cursor that emits ops.
//!
//! The builder borrows a function together with its module's type table, so
//! emission methods can compute result types from operand types (and mint new
//! types, e.g. the pointer type of an `alloca`). Emitted ops are inserted at
//! the cursor, which then advances past them.

use crate::error::CoreError;
use crate::function::Function;
use crate::id::{BlockId, OpId};
use crate::ops::Opcode;
use crate::type_table::{TypeId, TypeTable};
use crate::value::{Operand, Value};

/// A positional op emitter for one function.
pub struct Builder<'f> {
    func: &'f mut Function,
    types: &'f mut TypeTable,
    block: BlockId,
    pos: usize,
}

impl<'f> Builder<'f> {
    /// Creates a builder positioned at the end of the function's start block,
    /// creating an `entry` block when the function has none yet.
    pub fn new(func: &'f mut Function, types: &'f mut TypeTable) -> Self {
        let block = match func.start_block() {
            Some(b) => b,
            None => func.new_block("entry", None),
        };
        let pos = func.block(block).ops().len();
        Builder { func, types, block, pos }
    }

    /// The function under construction.
    pub fn func(&self) -> &Function {
        self.func
    }

    /// Mutable access to the function, for model-level edits between
    /// emissions. The cursor is not adjusted; reposition afterwards if the
    /// edit touched the cursor's block.
    pub fn func_mut(&mut self) -> &mut Function {
        self.func
    }

    /// The type table the builder mints result types from.
    pub fn types_mut(&mut self) -> &mut TypeTable {
        self.types
    }

    pub fn types(&self) -> &TypeTable {
        self.types
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    pub fn position_at_beginning(&mut self, block: BlockId) {
        self.block = block;
        self.pos = 0;
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.block = block;
        self.pos = self.func.block(block).ops().len();
    }

    pub fn position_before(&mut self, op: OpId) -> Result<(), CoreError> {
        let (block, pos) = self.func.position(op).ok_or(CoreError::UnlinkedOp { op })?;
        self.block = block;
        self.pos = pos;
        Ok(())
    }

    pub fn position_after(&mut self, op: OpId) -> Result<(), CoreError> {
        let (block, pos) = self.func.position(op).ok_or(CoreError::UnlinkedOp { op })?;
        self.block = block;
        self.pos = pos + 1;
        Ok(())
    }

    /// The block the cursor currently points into.
    pub fn current_block(&self) -> BlockId {
        self.block
    }

    // -----------------------------------------------------------------------
    // Emission
    // -----------------------------------------------------------------------

    /// Creates an op with the given opcode, result type and args, inserts it
    /// at the cursor and advances past it.
    pub fn emit(&mut self, opcode: Opcode, ty: TypeId, args: Vec<Operand>) -> OpId {
        let op = self.func.create_op(opcode, ty, args);
        self.func.insert_op(self.block, self.pos, op);
        self.pos += 1;
        op
    }

    fn value_type(&self, value: &Value, context: &str) -> Result<TypeId, CoreError> {
        self.func
            .value_type(value)
            .ok_or_else(|| CoreError::TypeMismatch {
                context: context.to_string(),
                reason: "operand has no function-local type".to_string(),
            })
    }

    /// Binary arithmetic; the result takes the left operand's type.
    pub fn binary(&mut self, opcode: Opcode, a: Value, b: Value) -> Result<OpId, CoreError> {
        let ty = self.value_type(&a, opcode.as_str())?;
        Ok(self.emit(opcode, ty, vec![a.into(), b.into()]))
    }

    pub fn add(&mut self, a: Value, b: Value) -> Result<OpId, CoreError> {
        self.binary(Opcode::Add, a, b)
    }

    pub fn sub(&mut self, a: Value, b: Value) -> Result<OpId, CoreError> {
        self.binary(Opcode::Sub, a, b)
    }

    pub fn mul(&mut self, a: Value, b: Value) -> Result<OpId, CoreError> {
        self.binary(Opcode::Mul, a, b)
    }

    pub fn div(&mut self, a: Value, b: Value) -> Result<OpId, CoreError> {
        self.binary(Opcode::Div, a, b)
    }

    /// Unary arithmetic; `not` produces Bool, the rest keep the operand type.
    pub fn unary(&mut self, opcode: Opcode, a: Value) -> Result<OpId, CoreError> {
        let ty = match opcode {
            Opcode::Not => TypeId::BOOL,
            _ => self.value_type(&a, opcode.as_str())?,
        };
        Ok(self.emit(opcode, ty, vec![a.into()]))
    }

    /// Comparison; always Bool.
    pub fn compare(&mut self, opcode: Opcode, a: Value, b: Value) -> OpId {
        self.emit(opcode, TypeId::BOOL, vec![a.into(), b.into()])
    }

    pub fn eq(&mut self, a: Value, b: Value) -> OpId {
        self.compare(Opcode::Eq, a, b)
    }

    pub fn lt(&mut self, a: Value, b: Value) -> OpId {
        self.compare(Opcode::Lt, a, b)
    }

    pub fn convert(&mut self, value: Value, ty: TypeId) -> OpId {
        self.emit(Opcode::Convert, ty, vec![value.into()])
    }

    /// Stack slot; the result is a pointer to `ty`.
    pub fn alloca(&mut self, ty: TypeId) -> OpId {
        let ptr = self.types.pointer(ty);
        self.emit(Opcode::Alloca, ptr, vec![])
    }

    /// Load through a pointer; the result is the pointee type.
    pub fn load(&mut self, ptr: Value) -> Result<OpId, CoreError> {
        let ptr_ty = self.value_type(&ptr, "load")?;
        let resolved = self.types.resolve_typedef(ptr_ty);
        let pointee = match self.types.kind(resolved) {
            crate::types::Type::Pointer { base } => *base,
            _ => {
                return Err(CoreError::TypeMismatch {
                    context: "load".to_string(),
                    reason: format!(
                        "expected a pointer operand, got {}",
                        self.types.display(ptr_ty)
                    ),
                })
            }
        };
        Ok(self.emit(Opcode::Load, pointee, vec![ptr.into()]))
    }

    pub fn store(&mut self, value: Value, ptr: Value) -> OpId {
        self.emit(Opcode::Store, TypeId::VOID, vec![value.into(), ptr.into()])
    }

    pub fn jump(&mut self, target: BlockId) -> OpId {
        self.emit(Opcode::Jump, TypeId::VOID, vec![Value::Block(target).into()])
    }

    pub fn cbranch(&mut self, cond: Value, on_true: BlockId, on_false: BlockId) -> OpId {
        self.emit(
            Opcode::Cbranch,
            TypeId::VOID,
            vec![
                cond.into(),
                Value::Block(on_true).into(),
                Value::Block(on_false).into(),
            ],
        )
    }

    pub fn ret(&mut self, value: Option<Value>) -> OpId {
        let args = value.map(|v| vec![v.into()]).unwrap_or_default();
        self.emit(Opcode::Ret, TypeId::VOID, args)
    }

    /// Phi node over parallel predecessor and value lists. Arities must
    /// agree.
    pub fn phi(
        &mut self,
        preds: Vec<BlockId>,
        values: Vec<Value>,
        ty: TypeId,
    ) -> Result<OpId, CoreError> {
        if preds.len() != values.len() {
            return Err(CoreError::PhiArityMismatch {
                preds: preds.len(),
                values: values.len(),
            });
        }
        Ok(self.emit(Opcode::Phi, ty, phi_operands(&preds, &values)))
    }

    pub fn call(&mut self, callee: Value, args: Vec<Value>, restype: TypeId) -> OpId {
        self.emit(
            Opcode::Call,
            restype,
            vec![
                callee.into(),
                Operand::List(args.into_iter().map(Operand::from).collect()),
            ],
        )
    }

    pub fn check_error(&mut self, result: Value, badval: Value) -> OpId {
        self.emit(
            Opcode::CheckError,
            TypeId::VOID,
            vec![result.into(), badval.into()],
        )
    }

    pub fn new_exc(&mut self, kind: Value) -> OpId {
        self.emit(Opcode::NewExc, TypeId::EXCEPTION, vec![kind.into()])
    }

    pub fn exc_throw(&mut self, exc: Value) -> OpId {
        self.emit(Opcode::ExcThrow, TypeId::VOID, vec![exc.into()])
    }

    pub fn exc_setup(&mut self, handlers: Vec<BlockId>) -> OpId {
        self.emit(
            Opcode::ExcSetup,
            TypeId::VOID,
            vec![Operand::List(
                handlers.into_iter().map(|b| Value::Block(b).into()).collect(),
            )],
        )
    }

    // -----------------------------------------------------------------------
    // Block surgery
    // -----------------------------------------------------------------------

    /// Splits `block` at the boundary before `first_trailing`: a fresh block
    /// is created right after `block`, the trailing ops move into it, and
    /// phis in the successors are patched so predecessor references change
    /// from the old block to the new one. When `terminate` is set the
    /// original block is jump-terminated to the new block.
    pub fn splitblock(
        &mut self,
        block: BlockId,
        first_trailing: OpId,
        name: Option<&str>,
        terminate: bool,
    ) -> Result<BlockId, CoreError> {
        let (owner, pos) = self
            .func
            .position(first_trailing)
            .ok_or(CoreError::UnlinkedOp { op: first_trailing })?;
        if owner != block {
            return Err(CoreError::MalformedIr {
                function: self.func.name().to_string(),
                reason: format!("op {first_trailing} is not in the block being split"),
            });
        }

        let name = match name {
            Some(n) => n.to_string(),
            None => self.func.temp("block"),
        };
        let new = self.func.new_block(&name, Some(block));

        let trailing: Vec<OpId> = self.func.block(block).ops()[pos..].to_vec();
        for &op in &trailing {
            self.func.unlink(op);
        }
        self.func.extend(new, &trailing);

        // The moved terminator's targets now reach their phis from `new`.
        if let Some(term) = self.func.terminator(new) {
            let mut targets = Vec::new();
            for arg in self.func.op(term).args() {
                arg.for_each_value(&mut |v| {
                    if let Value::Block(b) = v {
                        targets.push(*b);
                    }
                });
            }
            let mut map = std::collections::HashMap::new();
            map.insert(Value::Block(block), Value::Block(new));
            for target in targets {
                let phis: Vec<OpId> = self.func.leaders(target).collect();
                for phi in phis {
                    self.func.replace_args(phi, &map);
                }
            }
        }

        if terminate {
            self.position_at_end(block);
            self.jump(new);
        }
        Ok(new)
    }
}

/// Builds the `[preds, values]` operand shape of a phi.
pub fn phi_operands(preds: &[BlockId], values: &[Value]) -> Vec<Operand> {
    vec![
        Operand::List(preds.iter().map(|&b| Value::Block(b).into()).collect()),
        Operand::List(values.iter().cloned().map(Operand::from).collect()),
    ]
}
