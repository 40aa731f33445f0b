//! AST-level substitution used to unroll `@for`/`@const_for` bodies: each
//! iteration gets a fresh clone of the loop body with the loop (and index)
//! variable replaced by a literal. This happens before lowering to IR so the
//! normal element-lowering path sees ordinary, variable-free elements.

use std::collections::HashMap;

use kryon_ast::{
    ComponentDef, Directive, Element, Event, HandlerBody, IfBranch, Node, Property, RawExpression,
    StateVar, Stmt, StyleDef, TemplateSegment, ThemeDef,
};

pub fn substitute_nodes(nodes: &[Node], subs: &HashMap<String, RawExpression>) -> Vec<Node> {
    nodes.iter().map(|n| substitute_node(n, subs)).collect()
}

fn substitute_node(node: &Node, subs: &HashMap<String, RawExpression>) -> Node {
    match node {
        Node::Element(el) => Node::Element(substitute_element(el, subs)),
        Node::ComponentDef(c) => Node::ComponentDef(substitute_component(c, subs)),
        Node::StyleDef(s) => Node::StyleDef(substitute_style(s, subs)),
        Node::ThemeDef(t) => Node::ThemeDef(t.clone()),
        Node::Directive(d) => Node::Directive(substitute_directive(d, subs)),
    }
}

fn substitute_element(el: &Element, subs: &HashMap<String, RawExpression>) -> Element {
    Element {
        type_name: el.type_name.clone(),
        id: el.id.clone(),
        style_ref: el.style_ref.clone(),
        properties: el.properties.iter().map(|p| substitute_property(p, subs)).collect(),
        events: el.events.iter().map(|e| substitute_event(e, subs)).collect(),
        children: substitute_nodes(&el.children, subs),
        location: el.location.clone(),
    }
}

fn substitute_property(p: &Property, subs: &HashMap<String, RawExpression>) -> Property {
    Property { name: p.name.clone(), value: substitute_expr(&p.value, subs), location: p.location.clone() }
}

fn substitute_event(e: &Event, subs: &HashMap<String, RawExpression>) -> Event {
    Event { kind: e.kind, handler: substitute_handler(&e.handler, subs), location: e.location.clone() }
}

fn substitute_handler(h: &HandlerBody, subs: &HashMap<String, RawExpression>) -> HandlerBody {
    match h {
        HandlerBody::Inline(stmts) => {
            HandlerBody::Inline(stmts.iter().map(|s| substitute_stmt(s, subs)).collect())
        }
        HandlerBody::Named(name) => HandlerBody::Named(name.clone()),
    }
}

fn substitute_stmt(s: &Stmt, subs: &HashMap<String, RawExpression>) -> Stmt {
    match s {
        Stmt::Expr(e) => Stmt::Expr(substitute_expr(e, subs)),
        Stmt::Assign { target, value } => {
            Stmt::Assign { target: target.clone(), value: substitute_expr(value, subs) }
        }
    }
}

fn substitute_state_var(sv: &StateVar, subs: &HashMap<String, RawExpression>) -> StateVar {
    StateVar {
        name: sv.name.clone(),
        type_hint: sv.type_hint.clone(),
        initial: substitute_expr(&sv.initial, subs),
        location: sv.location.clone(),
    }
}

fn substitute_component(c: &ComponentDef, subs: &HashMap<String, RawExpression>) -> ComponentDef {
    ComponentDef {
        name: c.name.clone(),
        params: c.params.clone(),
        parent: c.parent.clone(),
        state_vars: c.state_vars.iter().map(|sv| substitute_state_var(sv, subs)).collect(),
        functions: c.functions.clone(),
        on_mount: c.on_mount.as_ref().map(|stmts| stmts.iter().map(|s| substitute_stmt(s, subs)).collect()),
        on_unmount: c.on_unmount.as_ref().map(|stmts| stmts.iter().map(|s| substitute_stmt(s, subs)).collect()),
        body: substitute_nodes(&c.body, subs),
        location: c.location.clone(),
    }
}

fn substitute_style(s: &StyleDef, subs: &HashMap<String, RawExpression>) -> StyleDef {
    StyleDef {
        name: s.name.clone(),
        parent: s.parent.clone(),
        properties: s.properties.iter().map(|p| substitute_property(p, subs)).collect(),
        location: s.location.clone(),
    }
}

fn substitute_branch(b: &IfBranch, subs: &HashMap<String, RawExpression>) -> IfBranch {
    IfBranch { cond: substitute_expr(&b.cond, subs), body: substitute_nodes(&b.body, subs) }
}

fn substitute_directive(d: &Directive, subs: &HashMap<String, RawExpression>) -> Directive {
    match d {
        Directive::Variables(entries) => Directive::Variables(
            entries.iter().map(|(n, e)| (n.clone(), substitute_expr(e, subs))).collect(),
        ),
        Directive::Const(entries) => Directive::Const(
            entries.iter().map(|(n, e)| (n.clone(), substitute_expr(e, subs))).collect(),
        ),
        Directive::ForDirective { index, var, iterable, body, is_const } => Directive::ForDirective {
            index: index.clone(),
            var: var.clone(),
            iterable: substitute_expr(iterable, subs),
            body: substitute_nodes(body, subs),
            is_const: *is_const,
        },
        Directive::IfDirective { is_const, then, elif_pairs, else_ } => Directive::IfDirective {
            is_const: *is_const,
            then: substitute_branch(then, subs),
            elif_pairs: elif_pairs.iter().map(|b| substitute_branch(b, subs)).collect(),
            else_: else_.as_ref().map(|nodes| substitute_nodes(nodes, subs)),
        },
        Directive::Include { path, expanded } => {
            Directive::Include { path: path.clone(), expanded: expanded.clone() }
        }
        Directive::Import { path, symbols } => {
            Directive::Import { path: path.clone(), symbols: symbols.clone() }
        }
        Directive::Export { symbols } => Directive::Export { symbols: symbols.clone() },
        Directive::FunctionDef(f) => Directive::FunctionDef(kryon_ast::FunctionDef {
            language: f.language.clone(),
            name: f.name.clone(),
            params: f.params.clone(),
            code: f.code.iter().map(|s| substitute_stmt(s, subs)).collect(),
            location: f.location.clone(),
        }),
        Directive::StateDef(sv) => Directive::StateDef(substitute_state_var(sv, subs)),
        Directive::Watch { var, handler } => {
            Directive::Watch { var: var.clone(), handler: substitute_handler(handler, subs) }
        }
        Directive::OnMount(stmts) => Directive::OnMount(stmts.iter().map(|s| substitute_stmt(s, subs)).collect()),
        Directive::OnUnmount(stmts) => {
            Directive::OnUnmount(stmts.iter().map(|s| substitute_stmt(s, subs)).collect())
        }
        Directive::EventDirective(e) => Directive::EventDirective(substitute_event(e, subs)),
        Directive::Unknown { name, location } => {
            Directive::Unknown { name: name.clone(), location: location.clone() }
        }
    }
}

fn substitute_expr(e: &RawExpression, subs: &HashMap<String, RawExpression>) -> RawExpression {
    match e {
        RawExpression::VarRef(name) => subs.get(name).cloned().unwrap_or_else(|| e.clone()),
        RawExpression::Literal(_) => e.clone(),
        RawExpression::MemberAccess(obj, field) => {
            RawExpression::MemberAccess(Box::new(substitute_expr(obj, subs)), field.clone())
        }
        RawExpression::ArrayAccess(arr, idx) => RawExpression::ArrayAccess(
            Box::new(substitute_expr(arr, subs)),
            Box::new(substitute_expr(idx, subs)),
        ),
        RawExpression::BinaryOp(op, l, r) => {
            RawExpression::BinaryOp(*op, Box::new(substitute_expr(l, subs)), Box::new(substitute_expr(r, subs)))
        }
        RawExpression::UnaryOp(op, inner) => RawExpression::UnaryOp(*op, Box::new(substitute_expr(inner, subs))),
        RawExpression::Ternary(c, t, e2) => RawExpression::Ternary(
            Box::new(substitute_expr(c, subs)),
            Box::new(substitute_expr(t, subs)),
            Box::new(substitute_expr(e2, subs)),
        ),
        RawExpression::FunctionCall(name, args) => {
            RawExpression::FunctionCall(name.clone(), args.iter().map(|a| substitute_expr(a, subs)).collect())
        }
        RawExpression::Template(segments) => RawExpression::Template(
            segments
                .iter()
                .map(|s| match s {
                    TemplateSegment::Literal(l) => TemplateSegment::Literal(l.clone()),
                    TemplateSegment::Expr(e) => TemplateSegment::Expr(substitute_expr(e, subs)),
                })
                .collect(),
        ),
        RawExpression::ArrayLit(items) => {
            RawExpression::ArrayLit(items.iter().map(|i| substitute_expr(i, subs)).collect())
        }
        RawExpression::ObjectLit(fields) => RawExpression::ObjectLit(
            fields.iter().map(|(k, v)| (k.clone(), substitute_expr(v, subs))).collect(),
        ),
    }
}
