use thiserror::Error;

/// Composed failure surface for the whole pipeline (§7). Each stage keeps
/// its own closed error type; this only adds the glue to carry one out of
/// `compile`/`decompile`/`reprint` without the caller needing to know which
/// stage produced it.
#[derive(Debug, Error)]
pub enum KryonError {
    #[error("lexical error(s): {0:?}")]
    Lexical(Vec<kryon_lexer::LexicalError>),
    #[error("{} error-severity diagnostic(s) remained after ir build: {0:?}", .0.len())]
    Build(Vec<kryon_ir::IrDiagnostic>),
    #[error("{} error-severity diagnostic(s) remained after validation: {0:?}", .0.len())]
    Validate(Vec<kryon_validator::ValidationDiagnostic>),
    #[error(transparent)]
    Bytecode(#[from] kryon_bytecode::BytecodeError),
    #[error(transparent)]
    Binary(#[from] kryon_binary::BinaryError),
    #[error(transparent)]
    Kir(#[from] kryon_kir::KirError),
    #[error(transparent)]
    Printer(#[from] kryon_printer::PrinterError),
}
