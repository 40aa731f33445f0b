use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::string_table::StringIndex;

pub use kryon_lexer::Unit;

/// The closed set of runtime-representable values (§3 DATA MODEL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(StringIndex),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Color(u8, u8, u8, u8),
    Unit(f64, Unit),
    Array(Vec<Value>),
    Object(IndexMap<StringIndex, Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
    Null,
    Color,
    Unit,
    Array,
    Object,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
            Value::Color(..) => ValueKind::Color,
            Value::Unit(..) => ValueKind::Unit,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_numeric_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Unit(v, _) => Some(*v),
            _ => None,
        }
    }
}

/// Parses a `#RRGGBB` or `#RRGGBBAA` literal (without the leading `#`) into
/// its component bytes. Used both by the IR builder (literal folding) and
/// the printer (round-trip formatting).
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8, u8)> {
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255)),
        8 => Some((byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, byte(&hex[6..8])?)),
        _ => None,
    }
}
