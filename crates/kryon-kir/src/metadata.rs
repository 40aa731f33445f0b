use serde::{Deserialize, Serialize};

/// Per-compilation facts about how a `.kir` document came to be, carried
/// alongside the IR data itself rather than inferred from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub compiler: String,
    #[serde(default)]
    pub compiler_version: String,
    /// RFC 3339 timestamp, supplied by the caller — this crate never reads
    /// the clock itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Free-form notes about what compile-time expansion happened
    /// (`const_for` unrolled N times, M components inlined, ...), for
    /// tooling and debugging rather than semantic use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expansion_info: Vec<String>,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub element_count: u32,
    pub function_count: u32,
    pub state_count: u32,
    pub style_count: u32,
}
