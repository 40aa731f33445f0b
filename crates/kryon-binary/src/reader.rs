use kryon_ir::{
    Element, EventBinding, Function, HostFunctionDecl, Ir, StateCell, Style, ThemeVariable, WatchBinding,
};

use crate::codec::{
    decode_expression, decode_instruction, decode_value, event_kind_from_code, state_type_from_code, theme_value_type_from_code,
};
use crate::consts::{element_type_name, CUSTOM_ELEMENT_TYPE_CODE, FUNC_MAGIC, MAGIC, NO_INDEX, SCRIPT_MAGIC, VERSION_MAJOR};
use crate::cursor::Reader;
use crate::error::BinaryError;

const HEADER_SIZE: usize = 64;

/// Deserializes a KRB byte buffer back into an [`Ir`] (§4.7/§4.8). The CRC32
/// over the body is checked before any section is parsed, so a corrupted
/// file is rejected up front rather than partway through a malformed read.
pub fn read(bytes: &[u8]) -> Result<Ir, BinaryError> {
    if bytes.len() < HEADER_SIZE {
        return Err(BinaryError::new(0, "file shorter than the KRB header"));
    }

    let mut r = Reader::new(bytes);
    r.magic(MAGIC)?;
    let major = r.u8()?;
    let _minor = r.u8()?;
    let _reserved = r.u16()?;
    if major != VERSION_MAJOR {
        return Err(BinaryError::new(4, format!("unsupported major version {major}, expected {VERSION_MAJOR}")));
    }
    let _flags = r.u32()?;
    let _element_count = r.u32()?;
    let _function_count = r.u32()?;
    let string_table_offset = r.u32()? as usize;
    let style_table_offset = r.u32()? as usize;
    let theme_table_offset = r.u32()? as usize;
    let state_table_offset = r.u32()? as usize;
    let host_function_table_offset = r.u32()? as usize;
    let resource_table_offset = r.u32()? as usize;
    let element_tree_offset = r.u32()? as usize;
    let script_section_offset = r.u32()? as usize;
    let lifecycle_section_offset = r.u32()? as usize;
    let total_size = r.u32()? as usize;
    let crc = r.u32()?;

    if total_size > bytes.len() {
        return Err(BinaryError::new(HEADER_SIZE, "declared total_size exceeds actual file length"));
    }
    let body = &bytes[HEADER_SIZE..total_size];
    let actual_crc = crc32fast::hash(body);
    if actual_crc != crc {
        return Err(BinaryError::new(HEADER_SIZE, format!("CRC32 mismatch: header says {crc:#010x}, body hashes to {actual_crc:#010x}")));
    }

    let mut ir = Ir::empty();

    r.seek(string_table_offset)?;
    read_string_table(&mut r, &mut ir)?;

    r.seek(style_table_offset)?;
    read_style_table(&mut r, &mut ir)?;

    r.seek(theme_table_offset)?;
    read_theme_table(&mut r, &mut ir)?;

    r.seek(state_table_offset)?;
    read_state_table(&mut r, &mut ir)?;

    r.seek(host_function_table_offset)?;
    read_host_function_table(&mut r, &mut ir)?;

    r.seek(resource_table_offset)?;
    read_resource_table(&mut r, &mut ir)?;

    r.seek(element_tree_offset)?;
    read_element_tree(&mut r, &mut ir)?;

    r.seek(script_section_offset)?;
    read_script_section(&mut r, &mut ir)?;

    r.seek(lifecycle_section_offset)?;
    read_lifecycle_section(&mut r, &mut ir)?;

    Ok(ir)
}

fn read_string_table(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    // Index 0 (the empty string) already exists in a fresh `Ir::empty()`'s
    // table; re-interning it here is a harmless no-op that keeps indices
    // aligned with what the writer emitted.
    for _ in 0..count {
        let s = r.string()?;
        ir.strings.intern(&s);
    }
    Ok(())
}

fn read_style_table(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    for _ in 0..count {
        let name_index = r.u32()?;
        let parent_raw = r.u32()?;
        let parent_name_index = if parent_raw == NO_INDEX { None } else { Some(parent_raw) };
        let mut style = Style::new(name_index, parent_name_index);
        let prop_count = r.u16()?;
        for _ in 0..prop_count {
            let name = r.u32()?;
            let value = decode_expression(r)?;
            style.properties.insert(name, value);
        }
        ir.styles.insert(name_index, style);
    }
    Ok(())
}

fn read_theme_table(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    for _ in 0..count {
        let group_index = r.u32()?;
        let name_index = r.u32()?;
        let value_type = theme_value_type_from_code(r.u8()?)?;
        let initial = decode_expression(r)?;
        ir.themes.push(ThemeVariable { group_index, name_index, value_type, initial });
    }
    Ok(())
}

fn read_state_table(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    for _ in 0..count {
        let state_id = r.u16()?;
        let name_index = r.u32()?;
        let value_type = state_type_from_code(r.u8()?)?;
        let initial = decode_value(r)?;
        ir.states.push(StateCell { state_id, name_index, value_type, initial });
    }
    Ok(())
}

fn read_host_function_table(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    for _ in 0..count {
        let id = r.u32()?;
        let name_index = r.u32()?;
        let signature_index = r.u32()?;
        let required = r.bool()?;
        ir.host_functions.push(HostFunctionDecl { id, name_index, signature_index, required });
    }
    Ok(())
}

fn read_resource_table(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    let mut resources = Vec::with_capacity(count as usize);
    for _ in 0..count {
        resources.push(r.u32()?);
    }
    ir.resources = resources;
    Ok(())
}

fn read_element_tree(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let count = r.u32()?;
    let mut root = Vec::with_capacity(count as usize);
    for _ in 0..count {
        root.push(read_element(r, ir)?);
    }
    ir.root = root;
    Ok(())
}

fn read_element(r: &mut Reader, ir: &mut Ir) -> Result<Element, BinaryError> {
    let type_code = r.u8()?;
    let element_type_index = if type_code == CUSTOM_ELEMENT_TYPE_CODE {
        r.u32()?
    } else {
        let name = element_type_name(type_code)
            .ok_or_else(|| BinaryError::new(r.position() - 1, format!("unknown element type code {type_code}")))?;
        ir.strings.intern(name)
    };

    let node_id = r.u32()?;
    let id_raw = r.u32()?;
    let style_raw = r.u32()?;

    let mut element = Element::new(node_id, element_type_index);
    element.id_string_index = if id_raw == NO_INDEX { None } else { Some(id_raw) };
    element.style_ref_index = if style_raw == NO_INDEX { None } else { Some(style_raw) };

    let prop_count = r.u16()?;
    for _ in 0..prop_count {
        let name = r.u32()?;
        let value = decode_expression(r)?;
        element.properties.insert(name, value);
    }

    let event_count = r.u16()?;
    for _ in 0..event_count {
        let event_kind = event_kind_from_code(r.u8()?)?;
        let function_id = r.u32()?;
        element.events.insert(event_kind, EventBinding { event_kind, function_id });
    }

    let child_count = r.u32()?;
    for _ in 0..child_count {
        element.children.push(read_element(r, ir)?);
    }

    Ok(element)
}

fn read_script_section(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    r.magic(SCRIPT_MAGIC)?;
    let _body_len = r.u32()?;
    let function_count = r.u32()?;
    let mut functions = Vec::with_capacity(function_count as usize);
    for _ in 0..function_count {
        r.magic(FUNC_MAGIC)?;
        let function_id = r.u32()?;
        let name_index = r.u32()?;
        let language_tag_index = r.u32()?;
        let param_count = r.u16()?;
        let mut param_indices = Vec::with_capacity(param_count as usize);
        for _ in 0..param_count {
            param_indices.push(r.u16()?);
        }
        let code_index = r.u32()?;
        let embedded = r.bool()?;
        let instruction_count = r.u32()?;
        let mut instructions = Vec::with_capacity(instruction_count as usize);
        if embedded {
            for _ in 0..instruction_count {
                instructions.push(decode_instruction(r)?);
            }
        } else {
            debug_assert_eq!(instruction_count, 0);
        }
        functions.push(Function { function_id, name_index, language_tag_index, param_indices, code_index, instructions });
    }
    ir.functions = functions;
    Ok(())
}

fn read_lifecycle_section(r: &mut Reader, ir: &mut Ir) -> Result<(), BinaryError> {
    let mount_count = r.u32()?;
    let mut root_on_mount = Vec::with_capacity(mount_count as usize);
    for _ in 0..mount_count {
        root_on_mount.push(r.u32()?);
    }
    ir.root_on_mount = root_on_mount;

    let unmount_count = r.u32()?;
    let mut root_on_unmount = Vec::with_capacity(unmount_count as usize);
    for _ in 0..unmount_count {
        root_on_unmount.push(r.u32()?);
    }
    ir.root_on_unmount = root_on_unmount;

    let watcher_count = r.u32()?;
    let mut watchers = Vec::with_capacity(watcher_count as usize);
    for _ in 0..watcher_count {
        let state_name_index = r.u32()?;
        let function_id = r.u32()?;
        watchers.push(WatchBinding { state_name_index, function_id });
    }
    ir.watchers = watchers;

    Ok(())
}
