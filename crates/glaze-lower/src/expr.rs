//! Expression lowering.
//!
//! Each routine returns the operand holding its result directly; value
//! instructions are additionally appended to the current code node.

use glaze_ast as ast;
use glaze_ir as ir;
use glaze_ir::{Handle, Value, ValueKind};

use crate::lower::Lowerer;
use crate::LowerError;

/// Whether an expression is lowered as something to read or as a store
/// destination. Propagated outer-to-inner through index, member, and
/// swizzle bases.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// Maps a plain (non-assigning) AST operator to its IR instruction.
fn binary_op(op: ast::BinaryOp) -> Option<ir::BinaryOp> {
    Some(match op {
        ast::BinaryOp::Add => ir::BinaryOp::Add,
        ast::BinaryOp::Sub => ir::BinaryOp::Sub,
        ast::BinaryOp::Mul => ir::BinaryOp::Mul,
        ast::BinaryOp::Div => ir::BinaryOp::Div,
        ast::BinaryOp::Mod => ir::BinaryOp::Mod,
        ast::BinaryOp::And => ir::BinaryOp::And,
        ast::BinaryOp::Or => ir::BinaryOp::Or,
        ast::BinaryOp::BitAnd => ir::BinaryOp::BitAnd,
        ast::BinaryOp::BitOr => ir::BinaryOp::BitOr,
        ast::BinaryOp::BitXor => ir::BinaryOp::BitXor,
        ast::BinaryOp::Shl => ir::BinaryOp::Shl,
        ast::BinaryOp::Shr => ir::BinaryOp::Shr,
        ast::BinaryOp::Eq => ir::BinaryOp::CmpEq,
        ast::BinaryOp::Neq => ir::BinaryOp::CmpNeq,
        ast::BinaryOp::Gt => ir::BinaryOp::CmpGt,
        ast::BinaryOp::Ge => ir::BinaryOp::CmpGe,
        ast::BinaryOp::Lt => ir::BinaryOp::CmpLt,
        ast::BinaryOp::Le => ir::BinaryOp::CmpLe,
        _ => return None,
    })
}

impl Lowerer<'_> {
    /// Lowers one expression, returning its result operand.
    pub(crate) fn lower_expr(
        &mut self,
        expr: &ast::Expr,
        access: Access,
    ) -> Result<Handle<Value>, LowerError> {
        match &expr.kind {
            ast::ExprKind::Literal(lit) => Ok(self.lower_literal(*lit)),
            ast::ExprKind::Var { name } => self.lower_var_ref(name),
            ast::ExprKind::Index { base, index } => {
                let base = self.lower_expr(base, access)?;
                let index = self.lower_expr(index, Access::Read)?;
                let ty = self.translate(&expr.ty)?;
                Ok(self.member_access(base, index, ty))
            }
            ast::ExprKind::Member { base, member } => {
                let base_value = self.lower_expr(base, access)?;
                let agg = self.aggregate_of(&base.ty).ok_or_else(|| {
                    LowerError::NotImplemented("member access on a non-struct value".into())
                })?;
                let index = agg.field_index(member).ok_or_else(|| {
                    LowerError::InvalidProgram(format!(
                        "no field `{member}` on `{}`",
                        agg.name()
                    ))
                })?;
                let index = self.const_int(index as i32);
                let ty = self.translate(&expr.ty)?;
                Ok(self.member_access(base_value, index, ty))
            }
            ast::ExprKind::Swizzle { base, count } => {
                let base = self.lower_expr(base, access)?;
                let pattern: String = ['x', 'y', 'z', 'w']
                    .iter()
                    .take(usize::from(*count))
                    .collect();
                let ty = self.translate(&expr.ty)?;
                Ok(self.emit(Value::new(ty, ValueKind::Swizzle { base, pattern })))
            }
            ast::ExprKind::Select {
                condition,
                accept,
                reject,
            } => {
                let condition = self.lower_expr(condition, Access::Read)?;
                let accept = self.lower_expr(accept, Access::Read)?;
                let reject = self.lower_expr(reject, Access::Read)?;
                let ty = self.translate(&expr.ty)?;
                Ok(self.emit(Value::new(
                    ty,
                    ValueKind::Select {
                        condition,
                        accept,
                        reject,
                    },
                )))
            }
            ast::ExprKind::Call { callee, args } => self.lower_call(expr, callee, args),
            ast::ExprKind::Unary { op, operand } => self.lower_unary(expr, *op, operand),
            ast::ExprKind::Binary { op, left, right } => {
                self.lower_binary(expr, *op, left, right)
            }
        }
    }

    fn lower_literal(&mut self, lit: ast::Literal) -> Handle<Value> {
        let (value, ty) = match lit {
            ast::Literal::Bool(v) => (ir::ConstValue::Bool(v), self.bool_ty),
            ast::Literal::Int(v) => (ir::ConstValue::Int(v), self.int_ty),
            ast::Literal::Uint(v) => (ir::ConstValue::Uint(v), self.uint_ty),
            ast::Literal::Float(v) => (ir::ConstValue::Float(v), self.float_ty),
        };
        self.program.intern_const(value, ty)
    }

    /// Resolves a name against the scope chain, falling back to a
    /// field of the implicit receiver in member bodies.
    fn lower_var_ref(&mut self, name: &str) -> Result<Handle<Value>, LowerError> {
        if let Some(value) = self.scopes.lookup(name) {
            return Ok(value);
        }
        if let Some((this_arg, index, field_ty)) = self.receiver_field(name) {
            let ty = self.translate(&field_ty)?;
            let index = self.const_int(index as i32);
            return Ok(self.member_access(this_arg, index, ty));
        }
        Err(LowerError::UnresolvedIdentifier(name.to_string()))
    }

    /// Lowers a call: arguments in textual order, then the callee
    /// resolution: constructor, member invocation with the base as
    /// implicit first argument, or plain name with the active receiver
    /// prepended when the callee is a member of its aggregate.
    fn lower_call(
        &mut self,
        expr: &ast::Expr,
        callee: &ast::Expr,
        args: &[ast::Expr],
    ) -> Result<Handle<Value>, LowerError> {
        let mut arguments = Vec::with_capacity(args.len() + 1);
        for arg in args {
            arguments.push(self.lower_expr(arg, Access::Read)?);
        }

        let func_ty = match &callee.ty {
            ast::AstType::Func(f) => f,
            _ => {
                return Err(LowerError::InvalidProgram(
                    "call target does not have a function type".into(),
                ))
            }
        };

        let (function, kind, result) = match func_ty.callee {
            ast::CalleeKind::Constructor => (
                "__init".to_string(),
                ir::CallKind::Constructor,
                self.translate(&expr.ty)?,
            ),
            ast::CalleeKind::Function => {
                let entry = self.function_entry(func_ty.decl);
                match &callee.kind {
                    ast::ExprKind::Member { base, member } => {
                        let this_value = self.lower_expr(base, Access::Read)?;
                        arguments.insert(0, this_value);
                        match entry {
                            Some((internal, _)) => (
                                internal,
                                ir::CallKind::User,
                                self.translate(&func_ty.result)?,
                            ),
                            None => (
                                member.clone(),
                                ir::CallKind::Intrinsic,
                                self.translate(&expr.ty)?,
                            ),
                        }
                    }
                    ast::ExprKind::Var { name } => {
                        if let Some((_, true)) = &entry {
                            if let Some(receiver) = &self.receiver {
                                arguments.insert(0, receiver.this_arg);
                            }
                        }
                        match entry {
                            Some((internal, _)) => (
                                internal,
                                ir::CallKind::User,
                                self.translate(&func_ty.result)?,
                            ),
                            None => (
                                name.clone(),
                                ir::CallKind::Intrinsic,
                                self.translate(&expr.ty)?,
                            ),
                        }
                    }
                    _ => {
                        return Err(LowerError::InvalidProgram(
                            "unsupported callee expression".into(),
                        ))
                    }
                }
            }
        };

        Ok(self.emit(
            Value::new(
                result,
                ValueKind::Call {
                    function,
                    kind,
                    arguments,
                },
            )
            .at(expr.span),
        ))
    }

    /// Coerces an operand to boolean by comparing against zero when
    /// its source type is not already `bool`.
    fn ensure_bool(&mut self, operand: Handle<Value>, ty: &ast::AstType) -> Handle<Value> {
        if *ty == ast::AstType::Basic(ast::BaseType::Bool) {
            return operand;
        }
        let zero = self.const_int(0);
        let int_ty = self.int_ty;
        self.emit(Value::new(
            int_ty,
            ValueKind::Binary {
                op: ir::BinaryOp::CmpNeq,
                left: operand,
                right: zero,
            },
        ))
    }

    fn lower_unary(
        &mut self,
        expr: &ast::Expr,
        op: ast::UnaryOp,
        operand: &ast::Expr,
    ) -> Result<Handle<Value>, LowerError> {
        match op {
            ast::UnaryOp::PreInc
            | ast::UnaryOp::PreDec
            | ast::UnaryOp::PostInc
            | ast::UnaryOp::PostDec => self.lower_incdec(expr, op, operand),
            ast::UnaryOp::Not | ast::UnaryOp::Neg | ast::UnaryOp::BitNot => {
                let mut input = self.lower_expr(operand, Access::Read)?;
                let ir_op = match op {
                    ast::UnaryOp::Not => {
                        input = self.ensure_bool(input, &operand.ty);
                        ir::UnaryOp::Not
                    }
                    ast::UnaryOp::Neg => ir::UnaryOp::Neg,
                    ast::UnaryOp::BitNot => ir::UnaryOp::BitNot,
                    _ => unreachable!(),
                };
                let ty = self.program.values[input].ty;
                Ok(self.emit(Value::new(
                    ty,
                    ValueKind::Unary {
                        op: ir_op,
                        operand: input,
                    },
                )))
            }
        }
    }

    /// Lowers the four increment/decrement forms: read the target,
    /// add or subtract one, store back. Postfix forms produce the
    /// pre-value; prefix forms produce the post-value.
    fn lower_incdec(
        &mut self,
        expr: &ast::Expr,
        op: ast::UnaryOp,
        target: &ast::Expr,
    ) -> Result<Handle<Value>, LowerError> {
        let pre = self.lower_expr(target, Access::Read)?;
        let one = if expr.ty == ast::AstType::Basic(ast::BaseType::Float) {
            self.const_float(1.0)
        } else {
            self.const_int(1)
        };
        let ir_op = match op {
            ast::UnaryOp::PreInc | ast::UnaryOp::PostInc => ir::BinaryOp::Add,
            _ => ir::BinaryOp::Sub,
        };
        let ty = self.translate(&expr.ty)?;
        let post = self.emit(Value::new(
            ty,
            ValueKind::Binary {
                op: ir_op,
                left: pre,
                right: one,
            },
        ));
        let dest = self.lower_expr(target, Access::Write)?;
        let void_ty = self.void_ty;
        self.emit(Value::new(void_ty, ValueKind::Store { dest, value: post }));
        Ok(match op {
            ast::UnaryOp::PostInc | ast::UnaryOp::PostDec => pre,
            _ => post,
        })
    }

    /// Lowers assignment, compound assignment, and the plain binary
    /// operator set. Operands evaluate right first, then left.
    fn lower_binary(
        &mut self,
        expr: &ast::Expr,
        op: ast::BinaryOp,
        left: &ast::Expr,
        right: &ast::Expr,
    ) -> Result<Handle<Value>, LowerError> {
        let right_value = self.lower_expr(right, Access::Read)?;

        if op == ast::BinaryOp::Assign {
            let dest = self.lower_expr(left, Access::Write)?;
            let void_ty = self.void_ty;
            self.emit(Value::new(
                void_ty,
                ValueKind::Store {
                    dest,
                    value: right_value,
                },
            ));
            return Ok(dest);
        }

        if let Some(base) = op.compound_base() {
            let ir_op = binary_op(base).expect("compound base is a plain operator");
            let left_value = self.lower_expr(left, Access::Read)?;
            let ty = self.translate(&expr.ty)?;
            let result = self.emit(Value::new(
                ty,
                ValueKind::Binary {
                    op: ir_op,
                    left: left_value,
                    right: right_value,
                },
            ));
            let dest = self.lower_expr(left, Access::Write)?;
            let void_ty = self.void_ty;
            self.emit(Value::new(
                void_ty,
                ValueKind::Store {
                    dest,
                    value: result,
                },
            ));
            return Ok(result);
        }

        let ir_op = binary_op(op).ok_or_else(|| {
            LowerError::NotImplemented(format!("no lowering for operator {op:?}"))
        })?;
        let left_value = self.lower_expr(left, Access::Read)?;
        let ty = self.translate(&expr.ty)?;
        Ok(self.emit(Value::new(
            ty,
            ValueKind::Binary {
                op: ir_op,
                left: left_value,
                right: right_value,
            },
        )))
    }
}
