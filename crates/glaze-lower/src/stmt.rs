//! Statement lowering.
//!
//! Control-flow statements open a lexical scope around their predicate
//! and body, so declarations inside a condition do not leak, and build
//! their nested code regions through the writer.

use glaze_ast as ast;
use glaze_ir::{Block, Value, ValueKind};

use crate::expr::Access;
use crate::lower::{escape_code_name, Lowerer};
use crate::LowerError;

impl Lowerer<'_> {
    /// Lowers one statement into the current code node.
    pub(crate) fn lower_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), LowerError> {
        match stmt {
            ast::Stmt::Block(stmts) => self.in_scope(|l| {
                for s in stmts {
                    l.lower_stmt(s)?;
                }
                Ok(())
            }),
            ast::Stmt::Var(decl) => self.lower_var_decl(decl),
            ast::Stmt::Expr(expr) => {
                self.lower_expr(expr, Access::Read)?;
                Ok(())
            }
            ast::Stmt::If {
                condition,
                accept,
                reject,
            } => self.in_scope(|l| {
                let condition = l.lower_expr(condition, Access::Read)?;
                let accept = l.in_node(|l| l.lower_stmt(accept))?;
                let reject = match reject {
                    Some(stmt) => l.in_node(|l| l.lower_stmt(stmt))?,
                    None => Block::new(),
                };
                let void_ty = l.void_ty;
                l.emit(Value::new(
                    void_ty,
                    ValueKind::If {
                        condition,
                        accept,
                        reject,
                    },
                ));
                Ok(())
            }),
            ast::Stmt::While { condition, body } => self.in_scope(|l| {
                let condition = l.lower_condition_node(condition)?;
                let body = l.in_node(|l| l.lower_stmt(body))?;
                let void_ty = l.void_ty;
                l.emit(Value::new(void_ty, ValueKind::While { condition, body }));
                Ok(())
            }),
            ast::Stmt::DoWhile { condition, body } => self.in_scope(|l| {
                let condition = l.lower_condition_node(condition)?;
                let body = l.in_node(|l| l.lower_stmt(body))?;
                let void_ty = l.void_ty;
                l.emit(Value::new(void_ty, ValueKind::DoWhile { condition, body }));
                Ok(())
            }),
            ast::Stmt::For {
                init,
                condition,
                step,
                body,
            } => self.in_scope(|l| {
                // The init statement runs in the surrounding node; its
                // declarations stay visible through the loop scope.
                if let Some(init) = init {
                    l.lower_stmt(init)?;
                }
                let condition = match condition {
                    Some(expr) => l.in_node(|l| l.lower_expr(expr, Access::Read).map(|_| ()))?,
                    None => Block::new(),
                };
                let step = match step {
                    Some(expr) => l.in_node(|l| l.lower_expr(expr, Access::Read).map(|_| ()))?,
                    None => Block::new(),
                };
                let body = l.in_node(|l| l.lower_stmt(body))?;
                let void_ty = l.void_ty;
                l.emit(Value::new(
                    void_ty,
                    ValueKind::For {
                        condition,
                        step,
                        body,
                    },
                ));
                Ok(())
            }),
            ast::Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.lower_expr(expr, Access::Read)?),
                    None => None,
                };
                let void_ty = self.void_ty;
                self.emit(Value::new(void_ty, ValueKind::Return { value }));
                Ok(())
            }
            ast::Stmt::Break => {
                let void_ty = self.void_ty;
                self.emit(Value::new(void_ty, ValueKind::Break));
                Ok(())
            }
            ast::Stmt::Continue => {
                let void_ty = self.void_ty;
                self.emit(Value::new(void_ty, ValueKind::Continue));
                Ok(())
            }
            ast::Stmt::Discard => {
                let void_ty = self.void_ty;
                self.emit(Value::new(void_ty, ValueKind::Discard));
                Ok(())
            }
        }
    }

    /// Lowers a loop predicate into its own node, terminated by a
    /// `Yield` of the predicate value.
    fn lower_condition_node(&mut self, condition: &ast::Expr) -> Result<Block, LowerError> {
        self.in_node(|l| {
            let value = l.lower_expr(condition, Access::Read)?;
            let void_ty = l.void_ty;
            l.emit(Value::new(void_ty, ValueKind::Yield { value }));
            Ok(())
        })
    }

    /// Lowers a variable declaration. Inside a function this allocates
    /// a local; at the program top level (no open code node) it
    /// creates a global instead.
    pub(crate) fn lower_var_decl(&mut self, decl: &ast::VarDecl) -> Result<(), LowerError> {
        let display_name = escape_code_name(&decl.name);
        let ty = self.translate(&decl.ty)?;
        let var = if self.writer.has_current() {
            self.emit(
                Value::new(ty, ValueKind::AllocVar)
                    .named(display_name)
                    .at(decl.span),
            )
        } else {
            let gvar = self.program.values.append(
                Value::new(ty, ValueKind::GlobalVar { binding: None })
                    .named(display_name)
                    .at(decl.span),
            );
            self.program.globals.insert(decl.name.clone(), gvar);
            gvar
        };
        self.scopes.insert(&decl.name, var);
        if let Some(init) = &decl.init {
            let value = self.lower_expr(init, Access::Read)?;
            let void_ty = self.void_ty;
            self.emit(Value::new(void_ty, ValueKind::Store { dest: var, value }));
        }
        Ok(())
    }
}
