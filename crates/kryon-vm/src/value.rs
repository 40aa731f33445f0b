use kryon_ir::{StringIndex, StringTable};

use crate::error::VmError;

/// A value that can live on the VM's operand stack or in a local slot.
/// Deliberately scalar-only: colors, arrays, and objects are element
/// property values, never handler-local runtime data (§4.6, §4.11).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(StringIndex),
    Null,
}

impl RuntimeValue {
    pub fn truthy(&self) -> bool {
        match self {
            RuntimeValue::Bool(b) => *b,
            RuntimeValue::Int(i) => *i != 0,
            RuntimeValue::Float(f) => *f != 0.0,
            RuntimeValue::Null => false,
            RuntimeValue::Str(_) => true,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            RuntimeValue::Int(i) => Some(*i as f64),
            RuntimeValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Widens mixed `Int`/`Float` operands to `Float`; `Int` op `Int` wraps on
/// overflow rather than panicking (§4.11, §8 boundary behavior).
pub fn add(lhs: RuntimeValue, rhs: RuntimeValue) -> Result<RuntimeValue, VmError> {
    Ok(match (lhs, rhs) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => RuntimeValue::Int(a.wrapping_add(b)),
        (a, b) => RuntimeValue::Float(numeric(a)? + numeric(b)?),
    })
}

pub fn sub(lhs: RuntimeValue, rhs: RuntimeValue) -> Result<RuntimeValue, VmError> {
    Ok(match (lhs, rhs) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => RuntimeValue::Int(a.wrapping_sub(b)),
        (a, b) => RuntimeValue::Float(numeric(a)? - numeric(b)?),
    })
}

pub fn mul(lhs: RuntimeValue, rhs: RuntimeValue) -> Result<RuntimeValue, VmError> {
    Ok(match (lhs, rhs) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => RuntimeValue::Int(a.wrapping_mul(b)),
        (a, b) => RuntimeValue::Float(numeric(a)? * numeric(b)?),
    })
}

/// Integer division by zero traps; float division follows IEEE754 (yields
/// `inf`/`NaN` rather than trapping).
pub fn div(lhs: RuntimeValue, rhs: RuntimeValue) -> Result<RuntimeValue, VmError> {
    match (lhs, rhs) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => {
            if b == 0 {
                Err(VmError::DivByZero)
            } else {
                Ok(RuntimeValue::Int(a.wrapping_div(b)))
            }
        }
        (a, b) => Ok(RuntimeValue::Float(numeric(a)? / numeric(b)?)),
    }
}

pub fn modulo(lhs: RuntimeValue, rhs: RuntimeValue) -> Result<RuntimeValue, VmError> {
    match (lhs, rhs) {
        (RuntimeValue::Int(a), RuntimeValue::Int(b)) => {
            if b == 0 {
                Err(VmError::DivByZero)
            } else {
                Ok(RuntimeValue::Int(a.wrapping_rem(b)))
            }
        }
        (a, b) => Ok(RuntimeValue::Float(numeric(a)? % numeric(b)?)),
    }
}

/// Non-numeric operands reaching arithmetic shouldn't happen post-validation
/// (§4.5 type checking); default to 0.0 rather than trap, since the VM has
/// no dedicated "type error" trap kind (§4.11 only lists the traps above).
fn numeric(v: RuntimeValue) -> Result<f64, VmError> {
    Ok(v.as_f64().unwrap_or(0.0))
}

/// Orders `lhs`/`rhs` (§4.6 "comparisons work on any two values of the same
/// kind"): numeric operands compare by value, `Str` operands compare
/// lexicographically by their interned text, and anything else (mismatched
/// kinds, `Bool`/`Null`) has no ordering and is treated as incomparable.
fn ordering(lhs: &RuntimeValue, rhs: &RuntimeValue, strings: &StringTable) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (RuntimeValue::Str(a), RuntimeValue::Str(b)) => strings.get(*a).partial_cmp(&strings.get(*b)),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

pub fn compare_lt(lhs: &RuntimeValue, rhs: &RuntimeValue, strings: &StringTable) -> bool {
    ordering(lhs, rhs, strings) == Some(std::cmp::Ordering::Less)
}

pub fn compare_gt(lhs: &RuntimeValue, rhs: &RuntimeValue, strings: &StringTable) -> bool {
    ordering(lhs, rhs, strings) == Some(std::cmp::Ordering::Greater)
}

pub fn compare_le(lhs: &RuntimeValue, rhs: &RuntimeValue, strings: &StringTable) -> bool {
    matches!(ordering(lhs, rhs, strings), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal))
}

pub fn compare_ge(lhs: &RuntimeValue, rhs: &RuntimeValue, strings: &StringTable) -> bool {
    matches!(ordering(lhs, rhs, strings), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal))
}
