use thiserror::Error;

/// A reading or writing failure, anchored to the byte offset where it was
/// detected so a caller can point a human at the exact bad spot in the file.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("KRB error at offset {offset}: {reason}")]
pub struct BinaryError {
    pub offset: usize,
    pub reason: String,
}

impl BinaryError {
    pub fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self { offset, reason: reason.into() }
    }
}
