use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::expression::Expression;
use crate::state::StateCell;
use crate::string_table::StringIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentParameter {
    pub name_index: StringIndex,
    pub default: Option<Expression>,
}

/// A component definition, preserved verbatim in the IR for documentation
/// and round-trip even though no instance of it survives expansion (§3,
/// §4.3 stage 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub name_index: StringIndex,
    pub parameters: Vec<ComponentParameter>,
    pub parent_name_index: Option<StringIndex>,
    pub state_vars: Vec<StateCell>,
    pub function_ids: Vec<u32>,
    pub body: Vec<Element>,
}
