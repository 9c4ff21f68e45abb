//! Declarations and the top-level program node.

use glaze_ir::Span;

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::AstType;

/// Stable identity of a declaration, assigned by the checker.
///
/// Equality of two `DeclId`s means "same declaration"; the lowerer keys
/// its struct cache and function table on it.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct DeclId(u32);

impl DeclId {
    /// Creates an id from its raw value.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// Modifiers attached to a declaration by the checker.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Modifiers {
    /// Compiler-provided; skipped by lowering.
    pub intrinsic: bool,
    /// Pulled in from the standard library; skipped by lowering.
    pub from_stdlib: bool,
}

impl Modifiers {
    /// Returns `true` if lowering should skip this declaration.
    pub fn is_implicit(&self) -> bool {
        self.intrinsic || self.from_stdlib
    }
}

/// Direction qualifier of a function parameter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParamDirection {
    #[default]
    In,
    Out,
    InOut,
}

/// A field of a struct or class.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub ty: AstType,
}

/// A plain-data struct declaration.
#[derive(Clone, Debug)]
pub struct StructDecl {
    pub id: DeclId,
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub modifiers: Modifiers,
}

/// A class declaration: fields plus member functions.
#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub id: DeclId,
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    pub modifiers: Modifiers,
}

/// A function parameter.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub name: String,
    pub ty: AstType,
    pub direction: ParamDirection,
}

/// A free or member function declaration.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub name: String,
    pub result: AstType,
    pub params: Vec<ParamDecl>,
    pub body: Stmt,
    pub modifiers: Modifiers,
}

/// A top-level or local variable declaration.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: String,
    pub ty: AstType,
    pub init: Option<Expr>,
    pub modifiers: Modifiers,
    pub span: Option<Span>,
}

impl VarDecl {
    /// Creates an unmodified variable declaration.
    pub fn new(name: impl Into<String>, ty: AstType, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            ty,
            init,
            modifiers: Modifiers::default(),
            span: None,
        }
    }
}

/// A top-level declaration.
#[derive(Clone, Debug)]
pub enum Decl {
    Struct(StructDecl),
    Class(ClassDecl),
    Function(FunctionDecl),
    Var(VarDecl),
}

/// A borrowed view of either kind of aggregate declaration.
#[derive(Clone, Copy, Debug)]
pub enum Aggregate<'a> {
    Struct(&'a StructDecl),
    Class(&'a ClassDecl),
}

impl<'a> Aggregate<'a> {
    /// The declaration's identity.
    pub fn id(self) -> DeclId {
        match self {
            Self::Struct(s) => s.id,
            Self::Class(c) => c.id,
        }
    }

    /// The declared name.
    pub fn name(self) -> &'a str {
        match self {
            Self::Struct(s) => &s.name,
            Self::Class(c) => &c.name,
        }
    }

    /// The fields, in declaration order.
    pub fn fields(self) -> &'a [FieldDecl] {
        match self {
            Self::Struct(s) => &s.fields,
            Self::Class(c) => &c.fields,
        }
    }

    /// The index of the field called `name`, if any.
    pub fn field_index(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    /// Returns `true` for class declarations.
    pub fn is_class(self) -> bool {
        matches!(self, Self::Class(_))
    }
}

/// The checked top-level program node.
#[derive(Clone, Debug, Default)]
pub struct Program {
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level struct declarations, in source order.
    pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Class declarations, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Class(c) => Some(c),
            _ => None,
        })
    }

    /// Free functions, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Top-level variables, in source order.
    pub fn variables(&self) -> impl Iterator<Item = &VarDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Var(v) => Some(v),
            _ => None,
        })
    }

    /// All aggregate declarations (structs and classes), in source order.
    pub fn aggregates(&self) -> impl Iterator<Item = Aggregate<'_>> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Struct(s) => Some(Aggregate::Struct(s)),
            Decl::Class(c) => Some(Aggregate::Class(c)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaseType;

    fn sample_struct() -> StructDecl {
        StructDecl {
            id: DeclId::new(1),
            name: "Light".into(),
            fields: vec![
                FieldDecl {
                    name: "position".into(),
                    ty: AstType::vector(BaseType::Float, 3),
                },
                FieldDecl {
                    name: "intensity".into(),
                    ty: AstType::basic(BaseType::Float),
                },
            ],
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn field_index_by_name() {
        let s = sample_struct();
        let agg = Aggregate::Struct(&s);
        assert_eq!(agg.field_index("position"), Some(0));
        assert_eq!(agg.field_index("intensity"), Some(1));
        assert_eq!(agg.field_index("missing"), None);
        assert!(!agg.is_class());
    }

    #[test]
    fn program_filters_by_kind() {
        let mut program = Program::new();
        program.decls.push(Decl::Struct(sample_struct()));
        program.decls.push(Decl::Var(VarDecl::new(
            "g",
            AstType::basic(BaseType::Int),
            None,
        )));
        assert_eq!(program.structs().count(), 1);
        assert_eq!(program.variables().count(), 1);
        assert_eq!(program.classes().count(), 0);
        assert_eq!(program.aggregates().count(), 1);
    }

    #[test]
    fn implicit_modifiers() {
        let mut m = Modifiers::default();
        assert!(!m.is_implicit());
        m.intrinsic = true;
        assert!(m.is_implicit());
        let stdlib = Modifiers {
            intrinsic: false,
            from_stdlib: true,
        };
        assert!(stdlib.is_implicit());
    }
}
