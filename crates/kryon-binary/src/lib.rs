//! The binary KRB container format (§4.7/§4.8): a little-endian, CRC32-
//! checked serialization of a built [`kryon_ir::Ir`], and its inverse.

mod codec;
mod consts;
mod cursor;
mod error;
mod reader;
mod writer;

pub use consts::{VERSION_MAJOR, VERSION_MINOR};
pub use error::BinaryError;
pub use reader::read;
pub use writer::write;

#[cfg(test)]
mod tests {
    use kryon_ir::{
        Element, EventBinding, EventKind, Function, HostFunctionDecl, Instruction, Ir, StateCell, StateType, Style,
        ThemeValueType, ThemeVariable, Value, WatchBinding,
    };

    use super::*;

    fn sample_ir() -> Ir {
        let mut ir = Ir::empty();
        let button = ir.strings.intern("Button");
        let label = ir.strings.intern("label");
        let click_fn = ir.strings.intern("onClick");
        let count = ir.strings.intern("count");
        let btn_id = ir.strings.intern("incrementButton");
        let base_style = ir.strings.intern("baseStyle");
        let theme_group = ir.strings.intern("colors");
        let theme_name = ir.strings.intern("primary");
        let host_name = ir.strings.intern("logEvent");

        ir.states.push(StateCell { state_id: 0, name_index: count, value_type: StateType::Int, initial: Value::Int(0) });

        ir.functions.push(Function {
            function_id: 0,
            name_index: click_fn,
            language_tag_index: 0,
            param_indices: vec![],
            code_index: 0,
            instructions: vec![
                Instruction::GetState(0),
                Instruction::PushInt(1),
                Instruction::Add,
                Instruction::SetState(0),
                Instruction::Halt,
            ],
        });

        ir.host_functions.push(HostFunctionDecl { id: 7, name_index: host_name, signature_index: 0, required: false });

        let mut style = Style::new(base_style, None);
        style.properties.insert(label, kryon_ir::Expression::Literal(Value::Bool(true)));
        ir.styles.insert(base_style, style);

        ir.themes.push(ThemeVariable {
            group_index: theme_group,
            name_index: theme_name,
            value_type: ThemeValueType::Color,
            initial: kryon_ir::Expression::Literal(Value::Color(10, 20, 30, 255)),
        });

        ir.watchers.push(WatchBinding { state_name_index: count, function_id: 0 });
        ir.root_on_mount.push(0);

        let mut button_el = Element::new(ir.next_node_id(), button);
        button_el.id_string_index = Some(btn_id);
        button_el.style_ref_index = Some(base_style);
        button_el.properties.insert(label, kryon_ir::Expression::Literal(Value::String(ir.strings.intern("Increment"))));
        button_el.events.insert(EventKind::Click, EventBinding { event_kind: EventKind::Click, function_id: 0 });
        ir.root.push(button_el);

        ir
    }

    #[test]
    fn round_trips_a_representative_ir() {
        let ir = sample_ir();
        let bytes = write(&ir);
        let decoded = read(&bytes).expect("valid KRB");

        assert_eq!(decoded.root.len(), 1);
        assert_eq!(decoded.strings.get(decoded.root[0].element_type_index), Some("Button"));
        assert_eq!(decoded.functions.len(), 1);
        assert_eq!(decoded.functions[0].instructions, ir.functions[0].instructions);
        assert_eq!(decoded.states.len(), 1);
        assert_eq!(decoded.states[0].initial, Value::Int(0));
        assert_eq!(decoded.styles.len(), 1);
        assert_eq!(decoded.themes.len(), 1);
        assert_eq!(decoded.watchers, ir.watchers);
        assert_eq!(decoded.root_on_mount, ir.root_on_mount);
        assert_eq!(decoded.host_functions.len(), 1);
    }

    #[test]
    fn empty_ir_produces_the_smallest_valid_file() {
        let ir = Ir::empty();
        let bytes = write(&ir);
        let decoded = read(&bytes).expect("valid KRB");
        assert!(decoded.root.is_empty());
        assert!(decoded.functions.is_empty());
    }

    #[test]
    fn truncated_file_is_reported_not_panicked() {
        let ir = sample_ir();
        let mut bytes = write(&ir);
        bytes.truncate(bytes.len() / 2);
        assert!(read(&bytes).is_err());
    }

    #[test]
    fn corrupted_byte_fails_crc_check() {
        let ir = sample_ir();
        let mut bytes = write(&ir);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let err = read(&bytes).unwrap_err();
        assert!(err.reason.contains("CRC32"));
    }

    #[test]
    fn resource_table_round_trips() {
        let mut ir = sample_ir();
        let icon = ir.strings.intern("assets/icon.png");
        let font = ir.strings.intern("assets/body.ttf");
        ir.resources.push(icon);
        ir.resources.push(font);

        let bytes = write(&ir);
        let decoded = read(&bytes).expect("valid KRB");
        assert_eq!(decoded.resources.len(), 2);
        assert_eq!(decoded.strings.get(decoded.resources[0]), Some("assets/icon.png"));
        assert_eq!(decoded.strings.get(decoded.resources[1]), Some("assets/body.ttf"));
    }

    #[test]
    fn custom_element_type_round_trips_via_escape_code() {
        let mut ir = Ir::empty();
        let custom = ir.strings.intern("MyWidget");
        ir.root.push(Element::new(ir.next_node_id(), custom));
        let bytes = write(&ir);
        let decoded = read(&bytes).unwrap();
        assert_eq!(decoded.strings.get(decoded.root[0].element_type_index), Some("MyWidget"));
    }
}
