//! Semantic validation over a built [`kryon_ir::Ir`] (§4.5): unresolved
//! symbols, type mismatches, style cycles, category violations, duplicate
//! element ids, and dangling event handlers.

mod error;
mod recovery;
mod validator;

pub use error::{Severity, ValidateErrorKind, ValidationDiagnostic};
pub use recovery::RecoveryMode;
pub use validator::validate;
