use serde::{Deserialize, Serialize};

use crate::string_table::StringIndex;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateType {
    Int,
    Float,
    String,
    Bool,
}

impl StateType {
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (StateType::Int, Value::Int(_))
                | (StateType::Float, Value::Float(_))
                | (StateType::String, Value::String(_))
                | (StateType::Bool, Value::Bool(_))
        )
    }
}

/// A reactive state cell (§3). `state_id` is unique per compilation and is
/// how bytecode addresses the cell via `GetState`/`SetState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCell {
    pub state_id: u16,
    pub name_index: StringIndex,
    pub value_type: StateType,
    pub initial: Value,
}
