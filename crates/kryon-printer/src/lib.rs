//! Turns a built [`kryon_ir::Ir`] back into Kryon source text (§4.10) — the
//! inverse of lexing/parsing/IR-building, used by the decompile pipeline to
//! turn a `.krb` (via `kryon-binary`) or `.kir` (via `kryon-kir`) back into
//! something a person can read and re-compile.

mod curly;
mod decompile;
mod error;
mod expr_print;
mod sexpr;
mod value_print;

pub use curly::print_curly;
pub use error::PrinterError;
pub use sexpr::print_sexpr;

/// Which concrete-syntax dialect to print. Both converge on the same
/// [`kryon_ir::Ir`]; this only picks the surface notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Curly,
    Sexpr,
}

/// Prints `ir` in the requested dialect.
pub fn print(ir: &kryon_ir::Ir, flavor: Flavor) -> Result<String, PrinterError> {
    match flavor {
        Flavor::Curly => print_curly(ir),
        Flavor::Sexpr => print_sexpr(ir),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use kryon_ir::{
        Element, EventBinding, EventKind, Function, HostFunctionDecl, Instruction, Ir, StateCell, StateType, Style, Value,
    };

    use super::*;

    fn sample_ir() -> Ir {
        let mut ir = Ir::empty();
        let count_name = ir.strings.intern("count");
        let increment_name = ir.strings.intern("increment");
        let button_type = ir.strings.intern("Button");
        let label_prop = ir.strings.intern("label");
        let click_fn_name = ir.strings.intern("increment");

        ir.states.push(StateCell { state_id: 0, name_index: count_name, value_type: StateType::Int, initial: Value::Int(0) });

        let function_id = 0;
        ir.functions.push(Function {
            function_id,
            name_index: increment_name,
            language_tag_index: 0,
            param_indices: Vec::new(),
            code_index: 0,
            instructions: vec![
                Instruction::GetState(0),
                Instruction::PushInt(1),
                Instruction::Add,
                Instruction::SetState(0),
                Instruction::Halt,
            ],
        });

        let label_value = ir.strings.intern("Click me");
        let mut props = IndexMap::new();
        props.insert(label_prop, kryon_ir::Expression::Literal(Value::String(label_value)));

        let mut events = IndexMap::new();
        events.insert(EventKind::Click, EventBinding { event_kind: EventKind::Click, function_id });

        let mut button = Element::new(ir.next_node_id(), button_type);
        button.properties = props;
        button.events = events;
        let _ = click_fn_name;
        ir.root.push(button);

        let style_name = ir.strings.intern("primary");
        ir.styles.insert(style_name, Style::new(style_name, None));

        let optional_host = ir.strings.intern("log");
        let sig = ir.strings.intern("(string) -> void");
        ir.host_functions.push(HostFunctionDecl { id: 0, name_index: optional_host, signature_index: sig, required: false });

        ir
    }

    #[test]
    fn curly_flavor_prints_state_function_and_element() {
        let ir = sample_ir();
        let text = print(&ir, Flavor::Curly).expect("printing should succeed");
        assert!(text.contains("state count: Int = 0;"));
        assert!(text.contains("fn increment()"));
        assert!(text.contains("count = (count + 1);"));
        assert!(text.contains("Button {"));
        assert!(text.contains("label: \"Click me\";"));
        assert!(text.contains("onClick: increment;"));
        assert!(text.contains("extern log optional;"));
    }

    #[test]
    fn sexpr_flavor_prints_the_same_semantics_in_its_own_notation() {
        let ir = sample_ir();
        let text = print(&ir, Flavor::Sexpr).expect("printing should succeed");
        assert!(text.contains("(state count Int 0)"));
        assert!(text.contains("(fn increment ()"));
        assert!(text.contains("count = (count + 1);"));
        assert!(text.contains("(Button"));
        assert!(text.contains(":label \"Click me\""));
        assert!(text.contains(":on-click increment"));
        assert!(text.contains("(extern log :optional)"));
    }

    #[test]
    fn empty_ir_prints_without_error_in_both_flavors() {
        let ir = Ir::empty();
        assert_eq!(print(&ir, Flavor::Curly).unwrap(), "");
        assert_eq!(print(&ir, Flavor::Sexpr).unwrap(), "");
    }

    #[test]
    fn nested_children_indent_one_level_deeper_in_both_flavors() {
        let mut ir = Ir::empty();
        let container_type = ir.strings.intern("Container");
        let text_type = ir.strings.intern("Text");
        let mut container = Element::new(ir.next_node_id(), container_type);
        let child = Element::new(ir.next_node_id(), text_type);
        container.children.push(child);
        ir.root.push(container);

        let curly = print(&ir, Flavor::Curly).unwrap();
        assert!(curly.contains("Container {\n  Text {\n  }\n}\n"));

        let sexpr = print(&ir, Flavor::Sexpr).unwrap();
        assert!(sexpr.contains("(Container\n  (Text)\n)\n"));
    }
}
