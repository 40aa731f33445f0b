use thiserror::Error;

/// Failure produced while scanning a single lexical error; the lexer keeps
/// going after one of these so a single pass can surface every error in the
/// file rather than stopping at the first.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{line}:{column}: {message}")]
pub struct LexicalError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl LexicalError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self { line, column, message: message.into() }
    }
}
