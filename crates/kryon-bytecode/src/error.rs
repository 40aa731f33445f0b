use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BytecodeError {
    #[error("function {0} has no handler source to lower")]
    MissingHandlerSource(u32),
    #[error("function {0} is not embedded-bytecode-backed and cannot be lowered")]
    NotBytecodeBacked(u32),
    #[error("function {0} not found in the IR's function table")]
    UnknownFunction(u32),
    #[error("assignment targets unknown state cell (string index {0})")]
    UnknownState(u32),
    #[error("call to unknown function or host function (string index {0})")]
    UnknownCallee(u32),
    #[error("unsupported expression form: {0}")]
    UnsupportedExpression(String),
}
