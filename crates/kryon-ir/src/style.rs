use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::string_table::StringIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub name_index: StringIndex,
    pub parent_name_index: Option<StringIndex>,
    pub properties: IndexMap<StringIndex, Expression>,
}

impl Style {
    pub fn new(name_index: StringIndex, parent_name_index: Option<StringIndex>) -> Self {
        Self { name_index, parent_name_index, properties: IndexMap::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThemeValueType {
    Int,
    Float,
    String,
    Bool,
    Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeVariable {
    pub group_index: StringIndex,
    pub name_index: StringIndex,
    pub value_type: ThemeValueType,
    pub initial: Expression,
}
