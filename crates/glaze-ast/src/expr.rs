//! Checked expressions.

use glaze_ir::Span;

use crate::types::AstType;

/// A literal constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Float(f32),
}

/// A unary operator, including the four increment/decrement forms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

/// A binary operator, including assignment and the compound-assignment
/// forms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Neq,
    Gt,
    Ge,
    Lt,
    Le,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl BinaryOp {
    /// For a compound assignment, the underlying arithmetic operator.
    pub fn compound_base(self) -> Option<BinaryOp> {
        Some(match self {
            Self::AddAssign => Self::Add,
            Self::SubAssign => Self::Sub,
            Self::MulAssign => Self::Mul,
            Self::DivAssign => Self::Div,
            Self::ModAssign => Self::Mod,
            Self::AndAssign => Self::BitAnd,
            Self::OrAssign => Self::BitOr,
            Self::XorAssign => Self::BitXor,
            Self::ShlAssign => Self::Shl,
            Self::ShrAssign => Self::Shr,
            _ => return None,
        })
    }
}

/// A checked expression: a kind plus its resolved type.
#[derive(Clone, Debug)]
pub struct Expr {
    pub ty: AstType,
    pub span: Option<Span>,
    pub kind: ExprKind,
}

impl Expr {
    /// Creates an expression with no source position.
    pub fn new(kind: ExprKind, ty: AstType) -> Self {
        Self {
            ty,
            span: None,
            kind,
        }
    }
}

/// The shape of an expression.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// A literal constant.
    Literal(Literal),
    /// A name reference, resolved against the scope chain at lowering
    /// time (and against the implicit receiver's fields as a fallback).
    Var { name: String },
    /// `base[index]`.
    Index { base: Box<Expr>, index: Box<Expr> },
    /// `base.member` on a struct or class value.
    Member { base: Box<Expr>, member: String },
    /// A prefix swizzle of `count` components (`.x`, `.xy`, ...).
    Swizzle { base: Box<Expr>, count: u8 },
    /// `condition ? accept : reject`.
    Select {
        condition: Box<Expr>,
        accept: Box<Expr>,
        reject: Box<Expr>,
    },
    /// A call; `callee.ty` must be [`AstType::Func`].
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// A unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A binary operation, assignment included.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_base_mapping() {
        assert_eq!(BinaryOp::AddAssign.compound_base(), Some(BinaryOp::Add));
        assert_eq!(BinaryOp::ShrAssign.compound_base(), Some(BinaryOp::Shr));
        assert_eq!(
            BinaryOp::XorAssign.compound_base(),
            Some(BinaryOp::BitXor)
        );
        assert_eq!(BinaryOp::Add.compound_base(), None);
        assert_eq!(BinaryOp::Assign.compound_base(), None);
    }
}
