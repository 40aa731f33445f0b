use thiserror::Error;

/// The closed set of semantic-validation error kinds (§4.5/§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidateErrorKind {
    #[error("unresolved symbol")]
    UnresolvedSymbol,
    #[error("type mismatch")]
    TypeMismatch,
    #[error("style cycle")]
    StyleCycle,
    #[error("category violation")]
    CategoryViolation,
    #[error("duplicate definition")]
    DuplicateDefinition,
    #[error("invalid handler")]
    InvalidHandler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A validator finding. Unlike the builder's [`kryon_ir::IrDiagnostic`], the
/// IR carries no source locations (§9's arena+indices design drops them), so
/// findings are anchored to a `node_id` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDiagnostic {
    pub node_id: Option<u32>,
    pub severity: Severity,
    pub kind: ValidateErrorKind,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationDiagnostic {
    pub fn new(node_id: Option<u32>, severity: Severity, kind: ValidateErrorKind, message: impl Into<String>) -> Self {
        Self { node_id, severity, kind, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.node_id {
            Some(id) => write!(f, "node #{id}: {:?}: {}", self.severity, self.message)?,
            None => write!(f, "{:?}: {}", self.severity, self.message)?,
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  = hint: {hint}")?;
        }
        Ok(())
    }
}
