//! Structured diagnostics reported to the caller.

use std::fmt;

use glaze_ir::Span;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Diagnostic codes emitted by the lowering pass.
pub mod codes {
    pub const NOT_IMPLEMENTED: u32 = 30001;
    pub const UNRESOLVED_IDENTIFIER: u32 = 30002;
    pub const INVALID_PROGRAM: u32 = 30003;
    pub const NON_CONSTANT_SIZE: u32 = 30004;
}

/// A structured message: position, severity, code, text.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: u32,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Creates an error-level diagnostic.
    pub fn error(code: u32, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.level, self.code, self.message)
    }
}

/// Collects diagnostics on behalf of the driver.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Iterates over recorded diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_collects_in_order() {
        let mut sink = DiagnosticSink::new();
        assert!(sink.is_empty());
        sink.push(Diagnostic::error(codes::INVALID_PROGRAM, "first", None));
        sink.push(Diagnostic {
            level: DiagnosticLevel::Warning,
            code: 0,
            message: "second".into(),
            span: None,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.error_count(), 1);
        let messages: Vec<_> = sink.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn display_format() {
        let d = Diagnostic::error(codes::UNRESOLVED_IDENTIFIER, "unknown `x`", None);
        assert_eq!(d.to_string(), "error [30002]: unknown `x`");
    }
}
