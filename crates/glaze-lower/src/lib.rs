//! AST-to-IR lowering for the Glaze shading language.
//!
//! Consumes a type-checked [`glaze_ast::Program`] and produces a
//! [`glaze_ir::Program`]: struct type descriptors, a constant pool,
//! global variables (explicit and synthesized bindable resources), and
//! named functions whose bodies are trees of typed instructions.
//!
//! The pass runs a fixed phase order over the top-level program node:
//! struct registration, member-function headers, the `__main_init`
//! global initializer, free-function headers, member bodies, and
//! finally free bodies. Headers go first so forward and mutually
//! recursive calls resolve regardless of textual order.

mod diag;
mod expr;
mod lower;
mod scope;
mod stmt;
mod writer;

use glaze_ast as ast;
use glaze_ir as ir;

pub use diag::{codes, Diagnostic, DiagnosticLevel, DiagnosticSink};

/// Name of the synthesized global-initializer function.
pub const INIT_FUNCTION: &str = "__main_init";

/// Errors that abort lowering.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    /// An AST shape the lowerer does not cover.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// A name that is neither in scope nor a field of the receiver.
    #[error("unresolved identifier `{0}`")]
    UnresolvedIdentifier(String),
    /// A malformed input that a checker should have rejected.
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    /// A size expression that is not a constant integer.
    #[error("array, vector, or matrix size is not a constant integer")]
    NonConstantSize,
}

impl LowerError {
    fn code(&self) -> u32 {
        match self {
            Self::NotImplemented(_) => codes::NOT_IMPLEMENTED,
            Self::UnresolvedIdentifier(_) => codes::UNRESOLVED_IDENTIFIER,
            Self::InvalidProgram(_) => codes::INVALID_PROGRAM,
            Self::NonConstantSize => codes::NON_CONSTANT_SIZE,
        }
    }
}

/// A shader stage an entry point belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

/// An entry-point descriptor from the compile configuration.
///
/// Only `name` is consumed by lowering: functions with a matching name
/// receive a call to [`INIT_FUNCTION`] at the head of their body.
#[derive(Clone, Debug)]
pub struct EntryPointDesc {
    pub name: String,
    pub stage: ShaderStage,
}

impl EntryPointDesc {
    /// Creates a descriptor for the named function.
    pub fn new(name: impl Into<String>, stage: ShaderStage) -> Self {
        Self {
            name: name.into(),
            stage,
        }
    }
}

/// How synthesized bindable-resource globals get binding slots.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BindingPolicy {
    /// Leave binding assignment to a later pass.
    #[default]
    None,
    /// Assign consecutive indices in synthesis order within one group.
    Sequential { group: u32, first: u32 },
}

/// Configuration consumed by [`lower`].
#[derive(Clone, Debug, Default)]
pub struct LowerOptions {
    /// Entry points, in configuration order.
    pub entry_points: Vec<EntryPointDesc>,
    /// Binding assignment for synthesized resource globals.
    pub binding_policy: BindingPolicy,
}

/// Lowers a checked program to IR.
///
/// Runs to completion or fails terminally; on failure no partial IR is
/// returned and a diagnostic describing the error is pushed to `sink`.
pub fn lower(
    program: &ast::Program,
    options: &LowerOptions,
    sink: &mut DiagnosticSink,
) -> Result<ir::Program, LowerError> {
    let mut lowerer = lower::Lowerer::new(program, options, sink);
    match lowerer.run() {
        Ok(()) => Ok(lowerer.into_program()),
        Err(error) => {
            let diagnostic = Diagnostic::error(error.code(), error.to_string(), None);
            lowerer.report(diagnostic);
            Err(error)
        }
    }
}
