//! Checked syntax tree for the Glaze shading language.
//!
//! This crate is the input contract of the lowering pass: a program
//! tree as produced by semantic analysis, where every expression
//! carries its resolved type, every declaration reference is resolved
//! to a [`DeclId`], and modifiers are attached to the nodes they
//! qualify. Nothing here parses or checks; the frontend is a separate
//! collaborator.

mod decl;
mod expr;
mod stmt;
mod types;

pub use decl::{
    Aggregate, ClassDecl, Decl, DeclId, FieldDecl, FunctionDecl, Modifiers, ParamDecl,
    ParamDirection, Program, StructDecl, VarDecl,
};
pub use expr::{BinaryOp, Expr, ExprKind, Literal, UnaryOp};
pub use stmt::Stmt;
pub use types::{AstType, BaseType, CalleeKind, FuncType, IntVal, TextureShape};

pub use glaze_ir::Span;
