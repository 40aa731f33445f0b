use std::collections::HashSet;

use kryon_ir::{
    default_closure_for, property_category_by_name, Element, Expression, Ir, PropertyCategory, Value, ValueKind,
};

use crate::error::{Severity, ValidateErrorKind, ValidationDiagnostic};
use crate::recovery::RecoveryMode;

/// Runs every §4.5 semantic check against `ir`, mutating it in place according
/// to `mode` and returning every finding (even ones the mode went on to fix).
pub fn validate(ir: &mut Ir, mode: RecoveryMode) -> Vec<ValidationDiagnostic> {
    let mut diagnostics = Vec::new();

    check_category_violations(ir, mode, &mut diagnostics);
    check_type_mismatches(ir, mode, &mut diagnostics);
    check_invalid_handlers(ir, mode, &mut diagnostics);
    check_duplicate_ids(ir, &mut diagnostics);
    check_style_cycles(ir, &mut diagnostics);
    check_unresolved_symbols(ir, &mut diagnostics);

    diagnostics
}

fn element_type_name<'a>(ir: &'a Ir, element: &Element) -> &'a str {
    ir.strings.get(element.element_type_index).unwrap_or("")
}

fn check_category_violations(ir: &mut Ir, mode: RecoveryMode, out: &mut Vec<ValidationDiagnostic>) {
    let mut to_drop: Vec<(u32, u32)> = Vec::new();

    for root in &ir.root {
        for element in root.dfs() {
            let type_name = element_type_name(ir, element);
            let closure = default_closure_for(type_name);
            for prop_index in element.properties.keys() {
                let name = ir.strings.get(*prop_index).unwrap_or("");
                let category = property_category_by_name(name);
                if category != PropertyCategory::ElementSpecific && !closure.contains(category) {
                    let diag = ValidationDiagnostic::new(
                        Some(element.node_id),
                        Severity::Error,
                        ValidateErrorKind::CategoryViolation,
                        format!("property `{name}` is not valid on element type `{type_name}`"),
                    );
                    out.push(diag);
                    if mode == RecoveryMode::Skip || mode == RecoveryMode::Default {
                        to_drop.push((element.node_id, *prop_index));
                    }
                }
            }
        }
    }

    if !to_drop.is_empty() {
        for root in &mut ir.root {
            drop_properties(root, &to_drop);
        }
    }
}

fn drop_properties(element: &mut Element, to_drop: &[(u32, u32)]) {
    element
        .properties
        .retain(|prop_index, _| !to_drop.iter().any(|(id, p)| *id == element.node_id && p == prop_index));
    for child in &mut element.children {
        drop_properties(child, to_drop);
    }
}

/// Best-effort expected shape for a handful of well-known property names.
/// Anything not listed here is treated as unconstrained (custom/vendor
/// properties, per-element-specific semantics the validator doesn't model).
fn expected_kind_for_property(name: &str) -> Option<ValueKind> {
    match name {
        "width" | "height" | "min_width" | "min_height" | "max_width" | "max_height" | "padding" | "margin"
        | "gap" | "font_size" | "border_width" | "border_radius" | "top" | "left" | "right" | "bottom" => {
            Some(ValueKind::Unit)
        }
        "background_color" | "color" | "border_color" => Some(ValueKind::Color),
        "disabled" | "checked" | "indeterminate" | "visible" | "resizable" | "fullscreen" => Some(ValueKind::Bool),
        "placeholder" | "title" | "tooltip" | "font_family" | "text_align" => Some(ValueKind::String),
        "opacity" | "flex" | "flex_grow" | "flex_shrink" | "z_index" | "line_height" | "letter_spacing" => {
            Some(ValueKind::Float)
        }
        _ => None,
    }
}

/// Whether `actual` is an acceptable value for an expectation of `expected`.
/// Int/Float are mutually promotable, and a bare `Int`/`Float` literal used
/// where a `Unit` is expected is inferred as pixels rather than flagged
/// (the builder does the same inference at literal-fold time).
fn kind_compatible(expected: ValueKind, actual: &Value) -> bool {
    match (expected, actual) {
        (ValueKind::Unit, Value::Unit(..) | Value::Int(_) | Value::Float(_)) => true,
        (ValueKind::Float, Value::Float(_) | Value::Int(_)) => true,
        (ValueKind::Int, Value::Int(_)) => true,
        (k, v) => k == v.kind(),
    }
}

fn check_type_mismatches(ir: &mut Ir, mode: RecoveryMode, out: &mut Vec<ValidationDiagnostic>) {
    let mut to_drop: Vec<(u32, u32)> = Vec::new();

    for root in &ir.root {
        for element in root.dfs() {
            for (prop_index, expr) in &element.properties {
                let name = ir.strings.get(*prop_index).unwrap_or("");
                let Some(expected) = expected_kind_for_property(name) else { continue };
                let Some(value) = expr.fold_const() else { continue };
                if !kind_compatible(expected, &value) {
                    out.push(ValidationDiagnostic::new(
                        Some(element.node_id),
                        Severity::Error,
                        ValidateErrorKind::TypeMismatch,
                        format!("property `{name}` expects a {expected:?} value, found a {:?} value", value.kind()),
                    ));
                    if mode == RecoveryMode::Skip {
                        to_drop.push((element.node_id, *prop_index));
                    }
                }
            }
        }
    }

    if !to_drop.is_empty() {
        for root in &mut ir.root {
            drop_properties(root, &to_drop);
        }
    }
}

fn check_invalid_handlers(ir: &mut Ir, mode: RecoveryMode, out: &mut Vec<ValidationDiagnostic>) {
    let function_count = ir.functions.len() as u32;
    let mut to_drop: Vec<(u32, kryon_ir::EventKind)> = Vec::new();

    for root in &ir.root {
        for element in root.dfs() {
            for binding in element.events.values() {
                if binding.function_id >= function_count {
                    out.push(ValidationDiagnostic::new(
                        Some(element.node_id),
                        Severity::Error,
                        ValidateErrorKind::InvalidHandler,
                        format!("event handler references unknown function id {}", binding.function_id),
                    ));
                    if mode == RecoveryMode::Skip || mode == RecoveryMode::Default {
                        to_drop.push((element.node_id, binding.event_kind));
                    }
                }
            }
        }
    }

    if !to_drop.is_empty() {
        for root in &mut ir.root {
            drop_events(root, &to_drop);
        }
    }
}

fn drop_events(element: &mut Element, to_drop: &[(u32, kryon_ir::EventKind)]) {
    element
        .events
        .retain(|kind, _| !to_drop.iter().any(|(id, k)| *id == element.node_id && k == kind));
    for child in &mut element.children {
        drop_events(child, to_drop);
    }
}

fn check_duplicate_ids(ir: &Ir, out: &mut Vec<ValidationDiagnostic>) {
    let mut seen = HashSet::new();
    for root in &ir.root {
        for element in root.dfs() {
            let Some(id_index) = element.id_string_index else { continue };
            if !seen.insert(id_index) {
                let id_str = ir.strings.get(id_index).unwrap_or("");
                out.push(ValidationDiagnostic::new(
                    Some(element.node_id),
                    Severity::Error,
                    ValidateErrorKind::DuplicateDefinition,
                    format!("duplicate element id `{id_str}`"),
                ));
            }
        }
    }
}

fn check_style_cycles(ir: &Ir, out: &mut Vec<ValidationDiagnostic>) {
    for name_index in ir.styles.keys() {
        if ir.resolve_style(*name_index).is_none() {
            let name = ir.strings.get(*name_index).unwrap_or("");
            out.push(ValidationDiagnostic::new(
                None,
                Severity::Error,
                ValidateErrorKind::StyleCycle,
                format!("style `{name}` has a cyclic or dangling `extends` chain"),
            ));
        }
    }
}

fn collect_var_refs(expr: &Expression, out: &mut Vec<u32>) {
    match expr {
        Expression::VarRef(idx) => out.push(*idx),
        Expression::MemberAccess(inner, _) => collect_var_refs(inner, out),
        Expression::ArrayAccess(base, index) => {
            collect_var_refs(base, out);
            collect_var_refs(index, out);
        }
        Expression::BinaryOp(_, lhs, rhs) => {
            collect_var_refs(lhs, out);
            collect_var_refs(rhs, out);
        }
        Expression::UnaryOp(_, inner) => collect_var_refs(inner, out),
        Expression::Ternary(cond, then, else_) => {
            collect_var_refs(cond, out);
            collect_var_refs(then, out);
            collect_var_refs(else_, out);
        }
        Expression::FunctionCall(_, args) => {
            for arg in args {
                collect_var_refs(arg, out);
            }
        }
        Expression::Template(segments) => {
            for segment in segments {
                if let kryon_ir::TemplateSegment::Expr(e) = segment {
                    collect_var_refs(e, out);
                }
            }
        }
        Expression::ArrayLit(items) => {
            for item in items {
                collect_var_refs(item, out);
            }
        }
        Expression::ObjectLit(fields) => {
            for (_, v) in fields {
                collect_var_refs(v, out);
            }
        }
        Expression::Literal(_) => {}
    }
}

fn check_unresolved_symbols(ir: &Ir, out: &mut Vec<ValidationDiagnostic>) {
    let known: HashSet<u32> = ir.states.iter().map(|s| s.name_index).collect();

    let mut refs = Vec::new();
    for root in &ir.root {
        for element in root.dfs() {
            for expr in element.properties.values() {
                collect_var_refs(expr, &mut refs);
            }
            for (name_index, r) in refs.drain(..).map(|r| (element.node_id, r)) {
                if !known.contains(&r) {
                    let name = ir.strings.get(r).unwrap_or("");
                    out.push(ValidationDiagnostic::new(
                        Some(name_index),
                        Severity::Error,
                        ValidateErrorKind::UnresolvedSymbol,
                        format!("reference to unknown symbol `{name}`"),
                    ));
                }
            }
        }
    }

    for (function_id, stmts) in &ir.handler_sources {
        for stmt in stmts {
            match stmt {
                kryon_ir::IrStmt::Expr(expr) => collect_var_refs(expr, &mut refs),
                kryon_ir::IrStmt::Assign { target_state, value } => {
                    refs.push(*target_state);
                    collect_var_refs(value, &mut refs);
                }
            }
            for r in refs.drain(..) {
                if !known.contains(&r) {
                    let name = ir.strings.get(r).unwrap_or("");
                    out.push(ValidationDiagnostic::new(
                        None,
                        Severity::Error,
                        ValidateErrorKind::UnresolvedSymbol,
                        format!("function {function_id} references unknown symbol `{name}`"),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kryon_ir::{Element, EventBinding, EventKind, StateCell, StateType, Style};

    use super::*;

    fn new_ir_with_button() -> Ir {
        let mut ir = Ir::empty();
        let button_type = ir.strings.intern("Button");
        let title_prop = ir.strings.intern("title");
        let node_id = ir.next_node_id();
        let mut button = Element::new(node_id, button_type);
        button.properties.insert(title_prop, Expression::Literal(Value::String(ir.strings.intern("Go"))));
        ir.root.push(button);
        ir
    }

    #[test]
    fn clean_ir_has_no_diagnostics() {
        let mut ir = new_ir_with_button();
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn category_violation_on_window_only_property() {
        let mut ir = new_ir_with_button();
        let fullscreen_prop = ir.strings.intern("fullscreen");
        ir.root[0].properties.insert(fullscreen_prop, Expression::Literal(Value::Bool(true)));
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ValidateErrorKind::CategoryViolation);
        assert!(!ir.root[0].properties.contains_key(&fullscreen_prop));
    }

    #[test]
    fn type_mismatch_on_color_property() {
        let mut ir = new_ir_with_button();
        let bg_prop = ir.strings.intern("background_color");
        let text = ir.strings.intern("not a color");
        ir.root[0].properties.insert(bg_prop, Expression::Literal(Value::String(text)));
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ValidateErrorKind::TypeMismatch);
    }

    #[test]
    fn bare_int_width_is_not_a_type_mismatch() {
        let mut ir = new_ir_with_button();
        let width_prop = ir.strings.intern("width");
        ir.root[0].properties.insert(width_prop, Expression::Literal(Value::Int(100)));
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn invalid_handler_flags_missing_function() {
        let mut ir = new_ir_with_button();
        ir.root[0].events.insert(EventKind::Click, EventBinding { event_kind: EventKind::Click, function_id: 42 });
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ValidateErrorKind::InvalidHandler);
        assert!(ir.root[0].events.is_empty());
    }

    #[test]
    fn duplicate_element_ids_are_flagged() {
        let mut ir = new_ir_with_button();
        let id_str = ir.strings.intern("go-button");
        ir.root[0].id_string_index = Some(id_str);
        let button_type = ir.root[0].element_type_index;
        let node_id = ir.next_node_id();
        let mut second = Element::new(node_id, button_type);
        second.id_string_index = Some(id_str);
        ir.root.push(second);
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ValidateErrorKind::DuplicateDefinition);
    }

    #[test]
    fn style_cycle_is_detected() {
        let mut ir = new_ir_with_button();
        let a = ir.strings.intern("a");
        let b = ir.strings.intern("b");
        ir.styles.insert(a, Style::new(a, Some(b)));
        ir.styles.insert(b, Style::new(b, Some(a)));
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert!(diags.iter().any(|d| d.kind == ValidateErrorKind::StyleCycle));
    }

    #[test]
    fn unresolved_symbol_in_property_is_flagged() {
        let mut ir = new_ir_with_button();
        let unknown = ir.strings.intern("missingVar");
        let label_prop = ir.strings.intern("value");
        ir.root[0].properties.insert(label_prop, Expression::VarRef(unknown));
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert!(diags.iter().any(|d| d.kind == ValidateErrorKind::UnresolvedSymbol));
    }

    #[test]
    fn known_state_var_is_not_unresolved() {
        let mut ir = new_ir_with_button();
        let count = ir.strings.intern("count");
        ir.states.push(StateCell { state_id: 0, name_index: count, value_type: StateType::Int, initial: Value::Int(0) });
        let value_prop = ir.strings.intern("value");
        ir.root[0].properties.insert(value_prop, Expression::VarRef(count));
        let diags = validate(&mut ir, RecoveryMode::Skip);
        assert!(diags.iter().all(|d| d.kind != ValidateErrorKind::UnresolvedSymbol));
    }
}
