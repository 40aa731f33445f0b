use thiserror::Error;

/// Why a function's execution stopped without reaching a normal `Halt`
/// (§4.11, §4.12's `Trapped{reason}` state).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("operand stack overflow (capacity {0})")]
    StackOverflow(usize),
    #[error("operand stack underflow")]
    StackUnderflow,
    #[error("division by zero")]
    DivByZero,
    #[error("required host function `{0}` is not registered")]
    HostMissing(String),
    #[error("instruction budget of {0} exceeded")]
    InstructionBudgetExceeded(u64),
    #[error("jump target out of bounds (pc {0})")]
    InvalidJump(i64),
    #[error("call to unknown function id {0}")]
    UnknownFunction(u32),
    #[error("call to unregistered host function id {0}")]
    UnknownHost(u32),
    #[error("unknown state cell id {0}")]
    UnknownState(u16),
    #[error("call stack exceeded depth {0}")]
    CallStackOverflow(usize),
}
