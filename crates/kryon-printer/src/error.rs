use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrinterError {
    #[error("bytecode decompiler underflowed its symbolic stack for function {0}")]
    StackUnderflow(u32),
    #[error("function {0} references unknown state id {1}")]
    UnknownState(u32, u16),
    #[error("function {0} calls unknown function id {1}")]
    UnknownFunction(u32, u32),
}
