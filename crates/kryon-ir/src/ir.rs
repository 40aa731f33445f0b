use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::component::ComponentDef;
use crate::element::Element;
use crate::function::{Function, HostFunctionDecl};
use crate::handler::IrStmt;
use crate::state::StateCell;
use crate::string_table::{StringIndex, StringTable};
use crate::style::{Style, ThemeVariable};

/// Binds a state cell to a function that fires whenever that cell changes
/// (`@watch`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchBinding {
    pub state_name_index: StringIndex,
    pub function_id: u32,
}

/// The durable artifact of a compilation: a canonical, post-expansion tree
/// of elements with resolved styles, themes, states, and bytecode (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ir {
    pub strings: StringTable,
    pub root: Vec<Element>,
    /// Keyed by style name index so the builder and validator can resolve
    /// `extends` chains without a linear scan.
    pub styles: IndexMap<StringIndex, Style>,
    pub themes: Vec<ThemeVariable>,
    pub components: IndexMap<StringIndex, ComponentDef>,
    pub functions: Vec<Function>,
    pub states: Vec<StateCell>,
    pub host_functions: Vec<HostFunctionDecl>,
    /// Interned external-asset paths (images, fonts) that `ImageSource`-style
    /// properties can reference by index instead of embedding the path
    /// inline. Additive to the wire format; empty unless an embedder
    /// registers resources directly onto the `Ir`.
    pub resources: Vec<StringIndex>,
    pub root_on_mount: Vec<u32>,
    pub root_on_unmount: Vec<u32>,
    pub watchers: Vec<WatchBinding>,
    /// Resolved statement bodies for bytecode-backed functions, keyed by
    /// `function_id`. Consumed by the bytecode compiler stage (§4.6); not
    /// part of the binary/KIR wire shape.
    pub handler_sources: IndexMap<u32, Vec<IrStmt>>,
    next_node_id: NodeIdCounter,
    next_component_id: NodeIdCounter,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct NodeIdCounter(u32);

impl NodeIdCounter {
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

impl Ir {
    pub fn empty() -> Self {
        Self {
            strings: StringTable::new(),
            root: Vec::new(),
            styles: IndexMap::new(),
            themes: Vec::new(),
            components: IndexMap::new(),
            functions: Vec::new(),
            states: Vec::new(),
            host_functions: Vec::new(),
            resources: Vec::new(),
            root_on_mount: Vec::new(),
            root_on_unmount: Vec::new(),
            watchers: Vec::new(),
            handler_sources: IndexMap::new(),
            next_node_id: NodeIdCounter::default(),
            next_component_id: NodeIdCounter::default(),
        }
    }

    pub fn next_node_id(&mut self) -> u32 {
        self.next_node_id.next()
    }

    pub fn next_component_id(&mut self) -> u32 {
        self.next_component_id.next()
    }

    pub fn element_count(&self) -> usize {
        self.root.iter().map(|e| e.dfs().count()).sum()
    }

    /// Resolves a style's full inherited property set by walking `extends`.
    /// Returns `None` if the chain is cyclic or references an unknown name.
    pub fn resolve_style(&self, name: StringIndex) -> Option<IndexMap<StringIndex, crate::expression::Expression>> {
        let mut chain = Vec::new();
        let mut current = Some(name);
        let mut seen = std::collections::HashSet::new();
        while let Some(name) = current {
            if !seen.insert(name) {
                return None;
            }
            let style = self.styles.get(&name)?;
            chain.push(style);
            current = style.parent_name_index;
        }
        let mut resolved = IndexMap::new();
        for style in chain.into_iter().rev() {
            for (k, v) in &style.properties {
                resolved.insert(*k, v.clone());
            }
        }
        Some(resolved)
    }
}

impl Default for Ir {
    fn default() -> Self {
        Self::empty()
    }
}
