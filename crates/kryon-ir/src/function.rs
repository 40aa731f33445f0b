use serde::{Deserialize, Serialize};

use crate::instruction::Instruction;
use crate::string_table::StringIndex;

/// The embedded-bytecode language tag: a function whose `language_tag`
/// interns to this string carries real `instructions`; any other tag means
/// `code_index` points at verbatim source for a host shell (§4.6).
pub const EMBEDDED_BYTECODE_LANGUAGE: &str = "";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub function_id: u32,
    pub name_index: StringIndex,
    pub language_tag_index: StringIndex,
    pub param_indices: Vec<u16>,
    pub code_index: u32,
    pub instructions: Vec<Instruction>,
}

impl Function {
    pub fn is_embedded_bytecode(&self, language_tag: &str) -> bool {
        language_tag == EMBEDDED_BYTECODE_LANGUAGE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFunctionDecl {
    pub id: u32,
    pub name_index: StringIndex,
    pub signature_index: StringIndex,
    pub required: bool,
}
