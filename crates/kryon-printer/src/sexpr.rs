use kryon_ir::{Element, EventKind, Ir};

use crate::decompile::decompile_function;
use crate::error::PrinterError;
use crate::expr_print::render_expression;
use crate::value_print::render_value;

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn event_directive_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Click => "on-click",
        EventKind::Change => "on-change",
        EventKind::Hover => "on-hover",
        EventKind::Mount => "on-mount",
        EventKind::Unmount => "on-unmount",
        EventKind::KeyDown => "on-key-down",
        EventKind::KeyUp => "on-key-up",
        EventKind::Focus => "on-focus",
        EventKind::Blur => "on-blur",
        EventKind::Submit => "on-submit",
    }
}

/// Prints a built [`Ir`] as s-expression-flavored Kryon source text (§4.10),
/// the alternate frontend accepted by `SexprParser`. Shares the same
/// information-loss characteristics as [`crate::curly::print_curly`] — see
/// that module's doc comment.
pub fn print_sexpr(ir: &Ir) -> Result<String, PrinterError> {
    let mut out = String::new();

    for theme in &ir.themes {
        out.push_str(&format!(
            "(theme {}.{} {})\n",
            ir.strings.get(theme.group_index).unwrap_or(""),
            ir.strings.get(theme.name_index).unwrap_or(""),
            render_expression(&ir.strings, &theme.initial)
        ));
    }
    if !ir.themes.is_empty() {
        out.push('\n');
    }

    for style in ir.styles.values() {
        out.push_str(&format!("(style {}", ir.strings.get(style.name_index).unwrap_or("")));
        if let Some(parent) = style.parent_name_index {
            out.push_str(&format!(" :extends {}", ir.strings.get(parent).unwrap_or("")));
        }
        out.push('\n');
        for (name, value) in &style.properties {
            out.push_str(&format!("  ({} {})\n", ir.strings.get(*name).unwrap_or(""), render_expression(&ir.strings, value)));
        }
        out.push_str(")\n\n");
    }

    for state in &ir.states {
        out.push_str(&format!(
            "(state {} {:?} {})\n",
            ir.strings.get(state.name_index).unwrap_or(""),
            state.value_type,
            render_value(&ir.strings, &state.initial)
        ));
    }
    if !ir.states.is_empty() {
        out.push('\n');
    }

    for decl in &ir.host_functions {
        out.push_str(&format!(
            "(extern {}{})\n",
            ir.strings.get(decl.name_index).unwrap_or(""),
            if decl.required { "" } else { " :optional" }
        ));
    }
    if !ir.host_functions.is_empty() {
        out.push('\n');
    }

    for function in &ir.functions {
        let params: Vec<String> = (0..function.param_indices.len()).map(|i| format!("p{i}")).collect();
        out.push_str(&format!("(fn {} ({})\n", ir.strings.get(function.name_index).unwrap_or(""), params.join(" ")));
        if function.language_tag_index == 0 {
            for line in decompile_function(ir, function)? {
                out.push_str(&format!("  {line}\n"));
            }
        } else {
            out.push_str(&format!(
                "  ; language: {}\n  {}\n",
                ir.strings.get(function.language_tag_index).unwrap_or(""),
                ir.strings.get(function.code_index).unwrap_or("")
            ));
        }
        out.push_str(")\n\n");
    }

    for watch in &ir.watchers {
        let state_name = ir.strings.get(watch.state_name_index).unwrap_or("");
        let fn_name = ir.functions.iter().find(|f| f.function_id == watch.function_id).map(|f| ir.strings.get(f.name_index).unwrap_or(""));
        out.push_str(&format!("(watch {} {})\n", state_name, fn_name.unwrap_or("?")));
    }
    if !ir.watchers.is_empty() {
        out.push('\n');
    }

    for element in &ir.root {
        print_element(ir, element, 0, &mut out)?;
    }

    Ok(out)
}

fn print_element(ir: &Ir, element: &Element, depth: usize, out: &mut String) -> Result<(), PrinterError> {
    if let Some(info) = &element.expansion {
        out.push_str(&indent(depth));
        out.push_str(&format!("; {}\n", describe_expansion(ir, info)));
    }

    out.push_str(&indent(depth));
    out.push('(');
    out.push_str(ir.strings.get(element.element_type_index).unwrap_or(""));
    if let Some(id) = element.id_string_index {
        out.push_str(&format!(" :id {}", ir.strings.get(id).unwrap_or("")));
    }
    if let Some(style) = element.style_ref_index {
        out.push_str(&format!(" :style {}", ir.strings.get(style).unwrap_or("")));
    }

    for (name, value) in &element.properties {
        out.push_str(&format!(" :{} {}", ir.strings.get(*name).unwrap_or(""), render_expression(&ir.strings, value)));
    }

    for binding in element.events.values() {
        let fn_name = ir.functions.iter().find(|f| f.function_id == binding.function_id).map(|f| ir.strings.get(f.name_index).unwrap_or(""));
        out.push_str(&format!(" :{} {}", event_directive_name(binding.event_kind), fn_name.unwrap_or("?")));
    }

    if element.children.is_empty() {
        out.push_str(")\n");
        return Ok(());
    }

    out.push('\n');
    for child in &element.children {
        print_element(ir, child, depth + 1, out)?;
    }
    out.push_str(&indent(depth));
    out.push_str(")\n");
    Ok(())
}

fn describe_expansion(ir: &Ir, info: &kryon_ir::ExpansionInfo) -> String {
    match info {
        kryon_ir::ExpansionInfo::ConstFor { iteration } => format!("const_for iteration {iteration}"),
        kryon_ir::ExpansionInfo::ConstIf => "const_if branch".to_string(),
        kryon_ir::ExpansionInfo::Include { path } => format!("included from {}", ir.strings.get(*path).unwrap_or("")),
        kryon_ir::ExpansionInfo::ComponentInstance { name, .. } => {
            format!("component instance: {}", ir.strings.get(*name).unwrap_or(""))
        }
    }
}
