use kryon_ir::{Element, Ir};

use crate::codec::{encode_expression, encode_instruction, encode_value, event_kind_code, state_type_code, theme_value_type_code};
use crate::consts::{element_type_code, CUSTOM_ELEMENT_TYPE_CODE, FUNC_MAGIC, MAGIC, NO_INDEX, SCRIPT_MAGIC, VERSION_MAJOR, VERSION_MINOR};
use crate::cursor::Writer;

const HEADER_SIZE: usize = 64;

/// Serializes a built [`Ir`] into a KRB byte buffer (§4.7/§4.8). Compile-time
/// provenance that the IR otherwise carries — `ComponentDef` templates and
/// each element's `ExpansionInfo` — is intentionally not part of the wire
/// format; a KRB is the fully expanded, runtime-facing artifact, and
/// decompiling one recovers only the flattened tree (see DESIGN.md).
pub fn write(ir: &Ir) -> Vec<u8> {
    let mut w = Writer::new();

    // Header placeholder, patched once every section's offset is known.
    for _ in 0..HEADER_SIZE {
        w.u8(0);
    }

    let string_table_offset = w.position() as u32;
    write_string_table(&mut w, ir);

    let style_table_offset = w.position() as u32;
    write_style_table(&mut w, ir);

    let theme_table_offset = w.position() as u32;
    write_theme_table(&mut w, ir);

    let state_table_offset = w.position() as u32;
    write_state_table(&mut w, ir);

    let host_function_table_offset = w.position() as u32;
    write_host_function_table(&mut w, ir);

    let resource_table_offset = w.position() as u32;
    write_resource_table(&mut w, ir);

    let element_tree_offset = w.position() as u32;
    write_element_tree(&mut w, ir);

    let script_section_offset = w.position() as u32;
    write_script_section(&mut w, ir);

    let lifecycle_section_offset = w.position() as u32;
    write_lifecycle_section(&mut w, ir);

    let total_size = w.position() as u32;

    let mut bytes = w.into_bytes();
    let crc = crc32fast::hash(&bytes[HEADER_SIZE..]);

    let mut header = Writer::new();
    header.bytes(&MAGIC);
    header.u8(VERSION_MAJOR);
    header.u8(VERSION_MINOR);
    header.u16(0); // reserved
    header.u32(0); // flags, none defined yet
    header.u32(ir.element_count() as u32);
    header.u32(ir.functions.len() as u32);
    header.u32(string_table_offset);
    header.u32(style_table_offset);
    header.u32(theme_table_offset);
    header.u32(state_table_offset);
    header.u32(host_function_table_offset);
    header.u32(resource_table_offset);
    header.u32(element_tree_offset);
    header.u32(script_section_offset);
    header.u32(lifecycle_section_offset);
    header.u32(total_size);
    header.u32(crc);
    let header_bytes = header.into_bytes();
    debug_assert_eq!(header_bytes.len(), HEADER_SIZE);
    bytes[..HEADER_SIZE].copy_from_slice(&header_bytes);

    bytes
}

fn write_string_table(w: &mut Writer, ir: &Ir) {
    w.u32(ir.strings.len() as u32);
    for s in ir.strings.iter() {
        w.string(s);
    }
}

fn write_style_table(w: &mut Writer, ir: &Ir) {
    w.u32(ir.styles.len() as u32);
    for style in ir.styles.values() {
        w.u32(style.name_index);
        w.u32(style.parent_name_index.unwrap_or(NO_INDEX));
        w.u16(style.properties.len() as u16);
        for (name, value) in &style.properties {
            w.u32(*name);
            encode_expression(w, value);
        }
    }
}

fn write_theme_table(w: &mut Writer, ir: &Ir) {
    w.u32(ir.themes.len() as u32);
    for theme in &ir.themes {
        w.u32(theme.group_index);
        w.u32(theme.name_index);
        w.u8(theme_value_type_code(&theme.value_type));
        encode_expression(w, &theme.initial);
    }
}

fn write_state_table(w: &mut Writer, ir: &Ir) {
    w.u32(ir.states.len() as u32);
    for state in &ir.states {
        w.u16(state.state_id);
        w.u32(state.name_index);
        w.u8(state_type_code(state.value_type));
        encode_value(w, &state.initial);
    }
}

fn write_host_function_table(w: &mut Writer, ir: &Ir) {
    w.u32(ir.host_functions.len() as u32);
    for decl in &ir.host_functions {
        w.u32(decl.id);
        w.u32(decl.name_index);
        w.u32(decl.signature_index);
        w.bool(decl.required);
    }
}

/// Resource table (§4.7 supplemented section): a list of string-table
/// indices for interned external-asset paths. Additive — absent from any
/// invariant the rest of the format relies on, empty unless an embedder
/// populated `Ir::resources` directly.
fn write_resource_table(w: &mut Writer, ir: &Ir) {
    w.u32(ir.resources.len() as u32);
    for index in &ir.resources {
        w.u32(*index);
    }
}

fn write_element_tree(w: &mut Writer, ir: &Ir) {
    w.u32(ir.root.len() as u32);
    for element in &ir.root {
        write_element(w, ir, element);
    }
}

fn write_element(w: &mut Writer, ir: &Ir, element: &Element) {
    let type_name = ir.strings.get(element.element_type_index).unwrap_or("");
    match element_type_code(type_name) {
        Some(code) => w.u8(code),
        None => {
            w.u8(CUSTOM_ELEMENT_TYPE_CODE);
            w.u32(element.element_type_index);
        }
    }
    w.u32(element.node_id);
    w.u32(element.id_string_index.unwrap_or(NO_INDEX));
    w.u32(element.style_ref_index.unwrap_or(NO_INDEX));

    w.u16(element.properties.len() as u16);
    for (name, value) in &element.properties {
        w.u32(*name);
        encode_expression(w, value);
    }

    w.u16(element.events.len() as u16);
    for binding in element.events.values() {
        w.u8(event_kind_code(binding.event_kind));
        w.u32(binding.function_id);
    }

    w.u32(element.children.len() as u32);
    for child in &element.children {
        write_element(w, ir, child);
    }
}

fn write_script_section(w: &mut Writer, ir: &Ir) {
    w.bytes(&SCRIPT_MAGIC);
    let size_patch_pos = w.position();
    w.u32(0); // patched below
    let body_start = w.position();

    w.u32(ir.functions.len() as u32);
    for function in &ir.functions {
        w.bytes(&FUNC_MAGIC);
        w.u32(function.function_id);
        w.u32(function.name_index);
        w.u32(function.language_tag_index);
        w.u16(function.param_indices.len() as u16);
        for slot in &function.param_indices {
            w.u16(*slot);
        }
        w.u32(function.code_index);
        // Index 0 is always the interned empty string, the embedded-bytecode
        // language tag's sentinel value.
        let embedded = function.language_tag_index == 0;
        w.bool(embedded);
        if embedded {
            w.u32(function.instructions.len() as u32);
            for instr in &function.instructions {
                encode_instruction(w, instr);
            }
        } else {
            w.u32(0);
        }
    }

    let body_len = (w.position() - body_start) as u32;
    w.patch_u32(size_patch_pos, body_len);
}

fn write_lifecycle_section(w: &mut Writer, ir: &Ir) {
    w.u32(ir.root_on_mount.len() as u32);
    for id in &ir.root_on_mount {
        w.u32(*id);
    }
    w.u32(ir.root_on_unmount.len() as u32);
    for id in &ir.root_on_unmount {
        w.u32(*id);
    }
    w.u32(ir.watchers.len() as u32);
    for watch in &ir.watchers {
        w.u32(watch.state_name_index);
        w.u32(watch.function_id);
    }
}
