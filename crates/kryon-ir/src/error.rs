use kryon_ast::SourceLocation;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// The closed set of IR-stage error kinds (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IrErrorKind {
    #[error("include cycle")]
    IncludeCycle,
    #[error("unresolved symbol")]
    UnresolvedSymbol,
    #[error("style cycle")]
    StyleCycle,
    #[error("duplicate definition")]
    DuplicateDefinition,
    #[error("category violation")]
    CategoryViolation,
    #[error("compile-time evaluation failure")]
    CompileTimeEvaluationFailure,
}

/// A single build-time diagnostic, rendered the way §7 specifies
/// (`file:line:col: error: message`).
#[derive(Debug, Clone, PartialEq)]
pub struct IrDiagnostic {
    pub location: SourceLocation,
    pub severity: Severity,
    pub kind: IrErrorKind,
    pub message: String,
    pub hint: Option<String>,
}

impl IrDiagnostic {
    pub fn new(
        location: SourceLocation,
        severity: Severity,
        kind: IrErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self { location, severity, kind, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for IrDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {:?}: {}",
            self.location.file, self.location.line, self.location.column, self.severity, self.message
        )?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  = hint: {hint}")?;
        }
        Ok(())
    }
}
