//! Checked statements.

use crate::decl::VarDecl;
use crate::expr::Expr;

/// A statement in a function body.
#[derive(Clone, Debug)]
pub enum Stmt {
    /// A braced statement list, introducing a lexical scope.
    Block(Vec<Stmt>),
    /// A local (or, at the top level, global) variable declaration.
    Var(VarDecl),
    /// An expression evaluated for its effects.
    Expr(Expr),
    /// A conditional.
    If {
        condition: Expr,
        accept: Box<Stmt>,
        reject: Option<Box<Stmt>>,
    },
    /// A pre-test loop.
    While { condition: Expr, body: Box<Stmt> },
    /// A post-test loop.
    DoWhile { condition: Expr, body: Box<Stmt> },
    /// A counted loop; all three header slots are optional.
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    /// Return, with an optional value.
    Return(Option<Expr>),
    /// Break out of the innermost loop.
    Break,
    /// Continue with the next iteration of the innermost loop.
    Continue,
    /// Discard the current fragment.
    Discard,
}
