/// File magic for a KRB container: ASCII `KRBY`.
pub const MAGIC: [u8; 4] = *b"KRBY";
/// Magic for the script section: ASCII `SCPT`.
pub const SCRIPT_MAGIC: [u8; 4] = *b"SCPT";
/// Per-function framing magic inside the script section: ASCII `FUNC`.
pub const FUNC_MAGIC: [u8; 4] = *b"FUNC";

/// Major.minor version written into the header. The reader enforces major
/// equality and tolerates a lower or higher minor (DESIGN.md: KRB version
/// byte decision).
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 1;

/// Sentinel string-table index meaning "absent" wherever a field is an
/// `Option<StringIndex>` (e.g. `Element::id_string_index`).
pub const NO_INDEX: u32 = u32::MAX;

/// Closed table of built-in element type names, each assigned a stable
/// single-byte code. A type name outside this table is still representable:
/// it's written as [`CUSTOM_ELEMENT_TYPE_CODE`] followed by its string-table
/// index, so an unanticipated or user-defined element type never breaks the
/// format.
pub const ELEMENT_TYPES: &[&str] = &[
    "App",
    "Window",
    "Container",
    "Column",
    "Row",
    "Panel",
    "Text",
    "Button",
    "Image",
    "Input",
    "Label",
    "Checkbox",
    "Radio",
    "Toggle",
    "Slider",
    "ProgressBar",
    "ScrollView",
    "List",
    "Grid",
    "Link",
];

/// Escape code meaning "look up the real element type name in the string
/// table via the following u32 index" rather than in [`ELEMENT_TYPES`].
pub const CUSTOM_ELEMENT_TYPE_CODE: u8 = 0xFF;

pub fn element_type_code(name: &str) -> Option<u8> {
    ELEMENT_TYPES.iter().position(|t| *t == name).map(|i| i as u8)
}

pub fn element_type_name(code: u8) -> Option<&'static str> {
    ELEMENT_TYPES.get(code as usize).copied()
}
