use crate::location::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single parse-time diagnostic. Parsers never abort on the first error:
/// they record a diagnostic, synchronize at the next top-level boundary, and
/// keep going (§4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub severity: Severity,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self { location, severity: Severity::Error, message: message.into(), hint: None }
    }

    pub fn warning(location: SourceLocation, message: impl Into<String>) -> Self {
        Self { location, severity: Severity::Warning, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
