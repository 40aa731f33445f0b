use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use kryon_ast::EventKind;

use crate::expression::Expression;
use crate::string_table::StringIndex;

pub type NodeId = u32;

/// Metadata attached to a subtree produced by compile-time expansion, so the
/// source printer and tooling can tell generated nodes from authored ones
/// (§4.3 stage 2, §4.3 stage 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpansionInfo {
    ConstFor { iteration: u32 },
    ConstIf,
    Include { path: StringIndex },
    ComponentInstance { name: StringIndex, instance_parameters: IndexMap<StringIndex, Expression> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBinding {
    pub event_kind: EventKind,
    pub function_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub node_id: NodeId,
    pub element_type_index: StringIndex,
    pub id_string_index: Option<StringIndex>,
    pub style_ref_index: Option<StringIndex>,
    pub properties: IndexMap<StringIndex, Expression>,
    pub events: IndexMap<EventKind, EventBinding>,
    pub children: Vec<Element>,
    pub expansion: Option<ExpansionInfo>,
}

impl Element {
    pub fn new(node_id: NodeId, element_type_index: StringIndex) -> Self {
        Self {
            node_id,
            element_type_index,
            id_string_index: None,
            style_ref_index: None,
            properties: IndexMap::new(),
            events: IndexMap::new(),
            children: Vec::new(),
            expansion: None,
        }
    }

    /// Depth-first iterator over this element and every descendant, parent
    /// first. Elements don't store parent back-pointers (§3), so any
    /// "visit the whole tree" operation goes through here rather than
    /// walking pointers.
    pub fn dfs(&self) -> impl Iterator<Item = &Element> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            for child in node.children.iter().rev() {
                stack.push(child);
            }
            Some(node)
        })
    }
}
