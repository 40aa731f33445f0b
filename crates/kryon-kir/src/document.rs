use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use kryon_ir::{
    ComponentDef, Element, Function, HostFunctionDecl, Ir, StateCell, StringIndex, StringTable, Style, ThemeVariable,
    WatchBinding,
};

use crate::error::KirError;
use crate::metadata::{Metadata, Statistics};

pub const FORMAT_TAG: &str = "kir-json";
pub const CURRENT_MAJOR: u32 = 1;
pub const CURRENT_MINOR: u32 = 1;

/// The synthetic root wrapper every `.kir` document's element tree sits
/// under, so a document always has exactly one top-level node to point
/// tooling at regardless of how many siblings the compiled tree actually has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub children: Vec<Element>,
}

/// The canonical, on-disk JSON shape of an [`Ir`] (§4.9). Mirrors `Ir`
/// field-for-field except `handler_sources`, which is a build-time-only
/// bridge retired by the bytecode compiler and never reaches this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KirDocument {
    pub version: String,
    pub format: String,
    pub metadata: Metadata,
    pub root: RootNode,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub states: Vec<StateCell>,
    #[serde(default)]
    pub host_functions: Vec<HostFunctionDecl>,
    #[serde(default)]
    pub resources: Vec<StringIndex>,
    #[serde(default)]
    pub styles: IndexMap<StringIndex, Style>,
    #[serde(default)]
    pub themes: Vec<ThemeVariable>,
    #[serde(default)]
    pub components: IndexMap<StringIndex, ComponentDef>,
    #[serde(default)]
    pub watchers: Vec<WatchBinding>,
    #[serde(default)]
    pub root_on_mount: Vec<u32>,
    #[serde(default)]
    pub root_on_unmount: Vec<u32>,
    pub strings: StringTable,
}

/// Builds the document an IR should be written as. `metadata` is the
/// caller's business (it names the source file, compiler version, and any
/// timestamp — this crate has no clock of its own).
pub fn to_document(ir: &Ir, mut metadata: Metadata) -> KirDocument {
    metadata.statistics = Statistics {
        element_count: ir.element_count() as u32,
        function_count: ir.functions.len() as u32,
        state_count: ir.states.len() as u32,
        style_count: ir.styles.len() as u32,
    };
    KirDocument {
        version: format!("{CURRENT_MAJOR}.{CURRENT_MINOR}"),
        format: FORMAT_TAG.to_string(),
        metadata,
        root: RootNode { node_type: "ROOT".to_string(), children: ir.root.clone() },
        functions: ir.functions.clone(),
        states: ir.states.clone(),
        host_functions: ir.host_functions.clone(),
        resources: ir.resources.clone(),
        styles: ir.styles.clone(),
        themes: ir.themes.clone(),
        components: ir.components.clone(),
        watchers: ir.watchers.clone(),
        root_on_mount: ir.root_on_mount.clone(),
        root_on_unmount: ir.root_on_unmount.clone(),
        strings: ir.strings.clone(),
    }
}

/// Parses the document's `version` field into (major, minor).
fn parse_version(version: &str) -> Result<(u32, u32), KirError> {
    let (major, minor) = version.split_once('.').ok_or_else(|| KirError::MalformedVersion(version.to_string()))?;
    let major: u32 = major.parse().map_err(|_| KirError::MalformedVersion(version.to_string()))?;
    let minor: u32 = minor.parse().map_err(|_| KirError::MalformedVersion(version.to_string()))?;
    Ok((major, minor))
}

/// Reconstructs an [`Ir`] from a parsed document, checking the version
/// gate first. A mismatched minor version is tolerated (forward/backward
/// compatible within a major version) and merely logged; a mismatched
/// major version is rejected outright.
pub fn from_document(doc: KirDocument) -> Result<Ir, KirError> {
    if doc.format != FORMAT_TAG {
        return Err(KirError::WrongFormat(doc.format));
    }
    let (major, minor) = parse_version(&doc.version)?;
    if major != CURRENT_MAJOR {
        return Err(KirError::UnsupportedMajorVersion { found: major, supported: CURRENT_MAJOR });
    }
    if minor != CURRENT_MINOR {
        tracing::warn!(found_minor = minor, supported_minor = CURRENT_MINOR, "reading a .kir document from a different minor version");
    }

    let mut ir = Ir::empty();
    ir.strings = doc.strings;
    ir.root = doc.root.children;
    ir.styles = doc.styles;
    ir.themes = doc.themes;
    ir.components = doc.components;
    ir.functions = doc.functions;
    ir.states = doc.states;
    ir.host_functions = doc.host_functions;
    ir.resources = doc.resources;
    ir.root_on_mount = doc.root_on_mount;
    ir.root_on_unmount = doc.root_on_unmount;
    ir.watchers = doc.watchers;
    rebuild_id_counters(&mut ir);
    Ok(ir)
}

/// `Ir`'s node/component id counters are private book-keeping, not wire
/// data — reconstruct them from the highest id actually present so that
/// any further `next_node_id()`/`next_component_id()` call (e.g. from a
/// tool that edits a loaded document) never collides with an existing id.
fn rebuild_id_counters(ir: &mut Ir) {
    let max_node_id = ir.root.iter().flat_map(|e| e.dfs()).map(|e| e.node_id).max();
    if let Some(max) = max_node_id {
        for _ in 0..=max {
            ir.next_node_id();
        }
    }
    let max_component_id = ir.components.len() as u32;
    for _ in 0..max_component_id {
        ir.next_component_id();
    }
}
