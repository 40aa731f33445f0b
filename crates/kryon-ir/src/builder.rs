//! Turns a frontend-produced [`Root`] into an [`Ir`] (§4.3): gathers named
//! definitions, evaluates `@const_for`/`@const_if` at compile time, expands
//! includes and component instances, resolves styles, checks references and
//! property categories, and assigns deterministic node ids.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use kryon_ast::{
    ComponentDef as AstComponentDef, Directive, Element as AstElement, FunctionDef as AstFunctionDef,
    HandlerBody, IfBranch, Node, RawExpression, RawValue, Root, SourceLocation, StateVar as AstStateVar,
    Stmt as AstStmt,
};
use tracing::{debug, warn};

use crate::category::{default_closure_for, property_category_by_name};
use crate::component::{ComponentDef, ComponentParameter};
use crate::element::{Element, ExpansionInfo};
use crate::error::{IrDiagnostic, IrErrorKind, Severity};
use crate::expression::Expression;
use crate::function::{Function, EMBEDDED_BYTECODE_LANGUAGE};
use crate::handler::IrStmt;
use crate::ir::{Ir, WatchBinding};
use crate::state::{StateCell, StateType};
use crate::string_table::StringIndex;
use crate::style::Style;
use crate::substitute;
use crate::value::Value;

/// Knobs for a single build (§ Ambient Stack / Configuration).
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// File name attached to synthesized diagnostics that have no AST
    /// location of their own (e.g. a folded `@for` iterable).
    pub file: String,
    /// When `true` (the default), a recoverable diagnostic is recorded and
    /// the offending node is skipped rather than aborting the whole build.
    pub recovery_mode: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { file: "<input>".to_string(), recovery_mode: true }
    }
}

/// Builds an [`Ir`] from a parsed [`Root`], returning it alongside whatever
/// diagnostics were recorded along the way (empty on a clean build).
pub fn build(ast: &Root, options: BuildOptions) -> (Ir, Vec<IrDiagnostic>) {
    let mut ctx = BuildCtx::new(options);
    ctx.gather_root(ast);
    ctx.lower_component_defs();
    ctx.lower_styles();
    ctx.lower_themes();
    let root = ctx.lower_body(&ast.body);
    ctx.ir.root = root;
    debug!(elements = ctx.ir.element_count(), diagnostics = ctx.diagnostics.len(), "ir build finished");
    (ctx.ir, ctx.diagnostics)
}

struct BuildCtx {
    ir: Ir,
    diagnostics: Vec<IrDiagnostic>,
    options: BuildOptions,
    consts: HashMap<String, RawExpression>,
    style_defs: IndexMap<String, kryon_ast::StyleDef>,
    theme_defs: Vec<kryon_ast::ThemeDef>,
    component_defs: IndexMap<String, AstComponentDef>,
    named_functions: HashMap<String, AstFunctionDef>,
    function_ids_by_name: HashMap<String, u32>,
    known_var_names: HashSet<String>,
    state_map: HashMap<String, u16>,
    next_state_id: u16,
    next_function_id: u32,
    include_stack: HashSet<String>,
}

fn loc0(file: &str) -> SourceLocation {
    SourceLocation::new(file.to_string(), 0, 0)
}

impl BuildCtx {
    fn new(options: BuildOptions) -> Self {
        Self {
            ir: Ir::empty(),
            diagnostics: Vec::new(),
            options,
            consts: HashMap::new(),
            style_defs: IndexMap::new(),
            theme_defs: Vec::new(),
            component_defs: IndexMap::new(),
            named_functions: HashMap::new(),
            function_ids_by_name: HashMap::new(),
            known_var_names: HashSet::new(),
            state_map: HashMap::new(),
            next_state_id: 0,
            next_function_id: 0,
            include_stack: HashSet::new(),
        }
    }

    fn diag(&mut self, location: SourceLocation, kind: IrErrorKind, message: impl Into<String>) {
        self.diagnostics.push(IrDiagnostic::new(location, Severity::Error, kind, message));
    }

    // ---- stage 1: gather ----------------------------------------------

    fn gather_root(&mut self, root: &Root) {
        for d in &root.directives {
            self.gather_directive(d);
        }
        self.gather_nodes(&root.body);
    }

    fn gather_nodes(&mut self, nodes: &[Node]) {
        for n in nodes {
            match n {
                Node::Directive(d) => self.gather_directive(d),
                Node::ComponentDef(c) => {
                    if self.component_defs.insert(c.name.clone(), c.clone()).is_some() {
                        self.diag(c.location.clone(), IrErrorKind::DuplicateDefinition, format!("duplicate component `{}`", c.name));
                    }
                }
                Node::StyleDef(s) => {
                    if self.style_defs.insert(s.name.clone(), s.clone()).is_some() {
                        self.diag(s.location.clone(), IrErrorKind::DuplicateDefinition, format!("duplicate style `{}`", s.name));
                    }
                }
                Node::ThemeDef(t) => self.theme_defs.push(t.clone()),
                Node::Element(_) => {}
            }
        }
    }

    fn gather_directive(&mut self, d: &Directive) {
        match d {
            Directive::Const(entries) | Directive::Variables(entries) => {
                for (name, expr) in entries {
                    self.consts.insert(name.clone(), expr.clone());
                    self.known_var_names.insert(name.clone());
                }
            }
            Directive::StateDef(sv) => {
                self.declare_state(sv);
            }
            Directive::FunctionDef(f) => {
                self.named_functions.insert(f.name.clone(), f.clone());
            }
            Directive::ForDirective { body, .. } => self.gather_nodes(body),
            Directive::IfDirective { then, elif_pairs, else_, .. } => {
                self.gather_nodes(&then.body);
                for b in elif_pairs {
                    self.gather_nodes(&b.body);
                }
                if let Some(nodes) = else_ {
                    self.gather_nodes(nodes);
                }
            }
            Directive::Include { expanded: Some(root), .. } => self.gather_root(root),
            Directive::Watch { var, handler } => {
                let loc = loc0(&self.options.file);
                self.check_unresolved(var, &loc);
                let function_id = self.lower_handler(handler, &loc, &format!("watch::{var}"));
                let state_name_index = self.ir.strings.intern(var);
                self.ir.watchers.push(WatchBinding { state_name_index, function_id });
            }
            Directive::OnMount(stmts) => {
                let loc = loc0(&self.options.file);
                let id = self.lower_inline_handler(stmts, &loc, "root::on_mount");
                self.ir.root_on_mount.push(id);
            }
            Directive::OnUnmount(stmts) => {
                let loc = loc0(&self.options.file);
                let id = self.lower_inline_handler(stmts, &loc, "root::on_unmount");
                self.ir.root_on_unmount.push(id);
            }
            Directive::EventDirective(_)
            | Directive::Include { expanded: None, .. }
            | Directive::Import { .. }
            | Directive::Export { .. }
            | Directive::Unknown { .. } => {}
        }
    }

    fn declare_state(&mut self, sv: &AstStateVar) -> u16 {
        let id = self.next_state_id;
        self.next_state_id += 1;
        let name_index = self.ir.strings.intern(&sv.name);
        let initial = self.fold_value(&sv.initial, sv.location.clone());
        let value_type = infer_state_type(sv.type_hint.as_deref(), &initial);
        self.ir.states.push(StateCell { state_id: id, name_index, value_type, initial });
        self.state_map.insert(sv.name.clone(), id);
        self.known_var_names.insert(sv.name.clone());
        id
    }

    fn fold_value(&mut self, expr: &RawExpression, loc: SourceLocation) -> Value {
        let resolved = self.resolve_expr(expr, &loc);
        match resolved.fold_const() {
            Some(v) => v,
            None => {
                self.diag(loc, IrErrorKind::CompileTimeEvaluationFailure, "initializer is not a compile-time constant");
                Value::Null
            }
        }
    }

    // ---- component/style/theme lowering (preserved definitions) -------

    fn lower_component_defs(&mut self) {
        // Insertion order (== source order) of `component_defs`/`style_defs`
        // must be preserved here: it drives string-table interning order and
        // thus the binary writer's byte-exact output across runs.
        let defs: Vec<(String, AstComponentDef)> = self.component_defs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        for (name, comp) in defs {
            let name_index = self.ir.strings.intern(&name);
            let parameters: Vec<ComponentParameter> = comp
                .params
                .iter()
                .map(|p| ComponentParameter {
                    name_index: self.ir.strings.intern(&p.name),
                    default: p.default.as_ref().map(|d| self.resolve_expr(d, &comp.location)),
                })
                .collect();
            let parent_name_index = comp.parent.as_ref().map(|p| self.ir.strings.intern(p));

            for p in &comp.params {
                self.known_var_names.insert(p.name.clone());
            }
            for sv in &comp.state_vars {
                self.known_var_names.insert(sv.name.clone());
            }

            let state_vars: Vec<StateCell> = comp
                .state_vars
                .iter()
                .map(|sv| {
                    let name_index = self.ir.strings.intern(&sv.name);
                    let initial = self.fold_value(&sv.initial, sv.location.clone());
                    let value_type = infer_state_type(sv.type_hint.as_deref(), &initial);
                    StateCell { state_id: u16::MAX, name_index, value_type, initial }
                })
                .collect();

            let mut function_ids: Vec<u32> = comp.functions.iter().map(|f| self.lower_named_function(f)).collect();
            if let Some(stmts) = &comp.on_mount {
                function_ids.push(self.lower_inline_handler(stmts, &comp.location, &format!("{name}::on_mount")));
            }
            if let Some(stmts) = &comp.on_unmount {
                function_ids.push(self.lower_inline_handler(stmts, &comp.location, &format!("{name}::on_unmount")));
            }

            let body = self.lower_body(&comp.body);
            self.ir.components.insert(
                name_index,
                ComponentDef { name_index, parameters, parent_name_index, state_vars, function_ids, body },
            );
        }
    }

    fn lower_styles(&mut self) {
        let defs: Vec<(String, kryon_ast::StyleDef)> = self.style_defs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        for (name, style_def) in defs {
            let name_index = self.ir.strings.intern(&name);
            let parent_name_index = style_def.parent.as_ref().map(|p| self.ir.strings.intern(p));
            let mut style = Style::new(name_index, parent_name_index);
            for p in &style_def.properties {
                let value = self.resolve_expr(&p.value, &p.location);
                let key = self.ir.strings.intern(&p.name);
                style.properties.insert(key, value);
            }
            self.ir.styles.insert(name_index, style);
        }
        // Now that every style is present, flag cycles and dangling parents.
        let names: Vec<StringIndex> = self.ir.styles.keys().copied().collect();
        for name_index in names {
            if self.ir.resolve_style(name_index).is_none() {
                let display = self.ir.strings.get(name_index).unwrap_or("<unknown>").to_string();
                self.diag(loc0(&self.options.file), IrErrorKind::StyleCycle, format!("style `{display}` has a cyclic or dangling `extends` chain"));
            }
        }
    }

    fn lower_themes(&mut self) {
        let defs = std::mem::take(&mut self.theme_defs);
        for theme in defs {
            let group_index = self.ir.strings.intern(&theme.group);
            for var in &theme.variables {
                let name_index = self.ir.strings.intern(&var.name);
                let initial = self.fold_value(&var.initial, theme.location.clone());
                let value_type = match &initial {
                    Value::Int(_) => crate::style::ThemeValueType::Int,
                    Value::Float(_) => crate::style::ThemeValueType::Float,
                    Value::Bool(_) => crate::style::ThemeValueType::Bool,
                    Value::Color(..) => crate::style::ThemeValueType::Color,
                    _ => crate::style::ThemeValueType::String,
                };
                self.ir.themes.push(crate::style::ThemeVariable {
                    group_index,
                    name_index,
                    value_type,
                    initial: Expression::Literal(initial),
                });
            }
        }
    }

    // ---- stage 2-4: expansion ------------------------------------------

    fn lower_body(&mut self, nodes: &[Node]) -> Vec<Element> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                Node::Element(el) => {
                    if self.component_defs.contains_key(&el.type_name) {
                        out.extend(self.expand_component_instance(el));
                    } else {
                        out.push(self.lower_plain_element(el));
                    }
                }
                Node::Directive(d) => out.extend(self.lower_directive(d)),
                Node::ComponentDef(_) | Node::StyleDef(_) | Node::ThemeDef(_) => {}
            }
        }
        out
    }

    fn lower_directive(&mut self, d: &Directive) -> Vec<Element> {
        match d {
            Directive::ForDirective { index, var, iterable, body, .. } => self.expand_for(index, var, iterable, body),
            Directive::IfDirective { then, elif_pairs, else_, .. } => self.expand_if(then, elif_pairs, else_),
            Directive::Include { path, expanded } => self.expand_include(path, expanded),
            Directive::Watch { .. } | Directive::OnMount(_) | Directive::OnUnmount(_) => Vec::new(),
            _ => Vec::new(),
        }
    }

    fn expand_for(&mut self, index: &Option<String>, var: &str, iterable: &RawExpression, body: &[Node]) -> Vec<Element> {
        let loc = loc0(&self.options.file);
        let resolved = self.resolve_expr(iterable, &loc);
        let Some(Value::Array(items)) = resolved.fold_const() else {
            self.diag(loc, IrErrorKind::CompileTimeEvaluationFailure, "`@for`/`@const_for` iterable must be a compile-time array");
            return Vec::new();
        };
        let mut out = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            let mut subs = HashMap::new();
            subs.insert(var.to_string(), self.value_to_raw(&item));
            if let Some(idx_name) = index {
                subs.insert(idx_name.clone(), RawExpression::Literal(RawValue::Int(i as i64)));
            }
            let substituted = substitute::substitute_nodes(body, &subs);
            let mut elements = self.lower_body(&substituted);
            for el in &mut elements {
                if el.expansion.is_none() {
                    el.expansion = Some(ExpansionInfo::ConstFor { iteration: i as u32 });
                }
            }
            out.extend(elements);
        }
        out
    }

    fn expand_if(&mut self, then: &IfBranch, elif_pairs: &[IfBranch], else_: &Option<Vec<Node>>) -> Vec<Element> {
        let loc = loc0(&self.options.file);
        for branch in std::iter::once(then).chain(elif_pairs.iter()) {
            let cond = self.resolve_expr(&branch.cond, &loc);
            match cond.fold_const() {
                Some(Value::Bool(true)) => {
                    let mut elements = self.lower_body(&branch.body);
                    for el in &mut elements {
                        if el.expansion.is_none() {
                            el.expansion = Some(ExpansionInfo::ConstIf);
                        }
                    }
                    return elements;
                }
                Some(Value::Bool(false)) => continue,
                _ => {
                    self.diag(loc, IrErrorKind::CompileTimeEvaluationFailure, "`@if`/`@const_if` condition did not fold to a compile-time bool");
                    return Vec::new();
                }
            }
        }
        match else_ {
            Some(nodes) => {
                let mut elements = self.lower_body(nodes);
                for el in &mut elements {
                    if el.expansion.is_none() {
                        el.expansion = Some(ExpansionInfo::ConstIf);
                    }
                }
                elements
            }
            None => Vec::new(),
        }
    }

    fn expand_include(&mut self, path: &str, expanded: &Option<Box<Root>>) -> Vec<Element> {
        if !self.include_stack.insert(path.to_string()) {
            self.diag(loc0(&self.options.file), IrErrorKind::IncludeCycle, format!("include cycle at `{path}`"));
            return Vec::new();
        }
        let result = match expanded {
            Some(root) => {
                self.gather_root(root);
                let path_index = self.ir.strings.intern(path);
                let mut elements = self.lower_body(&root.body);
                for el in &mut elements {
                    if el.expansion.is_none() {
                        el.expansion = Some(ExpansionInfo::Include { path: path_index });
                    }
                }
                elements
            }
            None => {
                self.diag(loc0(&self.options.file), IrErrorKind::UnresolvedSymbol, format!("unresolved include `{path}`"));
                Vec::new()
            }
        };
        self.include_stack.remove(path);
        result
    }

    fn expand_component_instance(&mut self, el: &AstElement) -> Vec<Element> {
        let comp = self.component_defs.get(&el.type_name).cloned().expect("checked by caller");
        let component_id = self.ir.next_component_id();

        let mut given: HashMap<&str, &RawExpression> = HashMap::new();
        for p in &el.properties {
            given.insert(p.name.as_str(), &p.value);
        }

        let mut subs: HashMap<String, RawExpression> = HashMap::new();
        let mut instance_parameters = indexmap::IndexMap::new();
        for param in &comp.params {
            match given.get(param.name.as_str()).copied().or(param.default.as_ref()) {
                Some(raw) => {
                    subs.insert(param.name.clone(), raw.clone());
                    let resolved = self.resolve_expr(raw, &el.location);
                    instance_parameters.insert(self.ir.strings.intern(&param.name), resolved);
                }
                None => {
                    self.diag(
                        el.location.clone(),
                        IrErrorKind::UnresolvedSymbol,
                        format!("missing required parameter `{}` for component `{}`", param.name, el.type_name),
                    );
                }
            }
        }

        let mut state_renames: HashMap<String, String> = HashMap::new();
        for sv in &comp.state_vars {
            state_renames.insert(sv.name.clone(), format!("{}__{component_id}", sv.name));
        }
        for (orig, renamed) in &state_renames {
            subs.entry(orig.clone()).or_insert_with(|| RawExpression::VarRef(renamed.clone()));
        }
        for sv in &comp.state_vars {
            let mut renamed_sv = sv.clone();
            renamed_sv.name = state_renames.get(&sv.name).cloned().unwrap();
            self.declare_state(&renamed_sv);
        }

        let substituted_body = substitute::substitute_nodes(&comp.body, &subs);
        let mut elements = self.lower_body(&substituted_body);

        let name_index = self.ir.strings.intern(&el.type_name);
        for out_el in &mut elements {
            if out_el.expansion.is_none() {
                out_el.expansion = Some(ExpansionInfo::ComponentInstance { name: name_index, instance_parameters: instance_parameters.clone() });
            }
        }
        if elements.len() == 1 {
            if let Some(id) = &el.id {
                elements[0].id_string_index = Some(self.ir.strings.intern(id));
            }
            if let Some(style_ref) = &el.style_ref {
                elements[0].style_ref_index = Some(self.ir.strings.intern(style_ref));
            }
        } else if elements.len() > 1 {
            warn!(component = %el.type_name, "component body has {} root elements; id/style on the instance site is dropped", elements.len());
        }
        elements
    }

    fn lower_plain_element(&mut self, el: &AstElement) -> Element {
        let type_index = self.ir.strings.intern(&el.type_name);
        let mut out = Element::new(self.ir.next_node_id(), type_index);
        out.id_string_index = el.id.as_ref().map(|s| self.ir.strings.intern(s));
        out.style_ref_index = el.style_ref.as_ref().map(|s| self.ir.strings.intern(s));

        let closure = default_closure_for(&el.type_name);
        for p in &el.properties {
            let category = property_category_by_name(&p.name);
            if !closure.contains(category) {
                self.diag(
                    p.location.clone(),
                    IrErrorKind::CategoryViolation,
                    format!("property `{}` is not valid on element `{}`", p.name, el.type_name),
                );
                if self.options.recovery_mode {
                    continue;
                }
            }
            let name_index = self.ir.strings.intern(&p.name);
            let value = self.resolve_expr(&p.value, &p.location);
            if out.properties.contains_key(&name_index) {
                self.diag(p.location.clone(), IrErrorKind::DuplicateDefinition, format!("duplicate property `{}`", p.name));
            }
            out.properties.insert(name_index, value);
        }

        for e in &el.events {
            let synth_name = format!("{}::{:?}", el.type_name, e.kind);
            let function_id = self.lower_handler(&e.handler, &e.location, &synth_name);
            out.events.insert(e.kind, crate::element::EventBinding { event_kind: e.kind, function_id });
        }

        out.children = self.lower_body(&el.children);
        out
    }

    // ---- handler/function lowering -------------------------------------

    fn lower_handler(&mut self, handler: &HandlerBody, loc: &SourceLocation, synth_name: &str) -> u32 {
        match handler {
            HandlerBody::Inline(stmts) => self.lower_inline_handler(stmts, loc, synth_name),
            HandlerBody::Named(name) => {
                if let Some(f) = self.named_functions.get(name).cloned() {
                    self.lower_named_function(&f)
                } else {
                    self.check_unresolved(name, loc);
                    let function_id = self.next_function_id;
                    self.next_function_id += 1;
                    let name_index = self.ir.strings.intern(name);
                    let language_tag_index = self.ir.strings.intern(EMBEDDED_BYTECODE_LANGUAGE);
                    self.ir.functions.push(Function {
                        function_id,
                        name_index,
                        language_tag_index,
                        param_indices: Vec::new(),
                        code_index: 0,
                        instructions: Vec::new(),
                    });
                    function_id
                }
            }
        }
    }

    fn lower_inline_handler(&mut self, stmts: &[AstStmt], loc: &SourceLocation, synth_name: &str) -> u32 {
        let function_id = self.next_function_id;
        self.next_function_id += 1;
        let name_index = self.ir.strings.intern(synth_name);
        let language_tag_index = self.ir.strings.intern(EMBEDDED_BYTECODE_LANGUAGE);
        let ir_stmts: Vec<IrStmt> = stmts.iter().map(|s| self.resolve_stmt(s, loc)).collect();
        self.ir.functions.push(Function {
            function_id,
            name_index,
            language_tag_index,
            param_indices: Vec::new(),
            code_index: 0,
            instructions: Vec::new(),
        });
        self.ir.handler_sources.insert(function_id, ir_stmts);
        function_id
    }

    fn lower_named_function(&mut self, f: &AstFunctionDef) -> u32 {
        if let Some(&id) = self.function_ids_by_name.get(&f.name) {
            return id;
        }
        let function_id = self.next_function_id;
        self.next_function_id += 1;
        let name_index = self.ir.strings.intern(&f.name);
        let is_embedded = f.language.is_empty() || f.language.eq_ignore_ascii_case("kryon");
        let language_tag_index =
            self.ir.strings.intern(if is_embedded { EMBEDDED_BYTECODE_LANGUAGE } else { f.language.as_str() });
        let param_indices: Vec<u16> = (0..f.params.len() as u16).collect();

        for p in &f.params {
            self.known_var_names.insert(p.clone());
        }

        if is_embedded {
            let ir_stmts: Vec<IrStmt> = f.code.iter().map(|s| self.resolve_stmt(s, &f.location)).collect();
            self.ir.functions.push(Function {
                function_id,
                name_index,
                language_tag_index,
                param_indices,
                code_index: 0,
                instructions: Vec::new(),
            });
            self.ir.handler_sources.insert(function_id, ir_stmts);
        } else {
            let source_stub = format!("{:?}", f.code);
            let code_index = self.ir.strings.intern(&source_stub);
            self.ir.functions.push(Function {
                function_id,
                name_index,
                language_tag_index,
                param_indices,
                code_index,
                instructions: Vec::new(),
            });
        }
        self.function_ids_by_name.insert(f.name.clone(), function_id);
        function_id
    }

    fn resolve_stmt(&mut self, s: &AstStmt, loc: &SourceLocation) -> IrStmt {
        match s {
            AstStmt::Expr(e) => IrStmt::Expr(self.resolve_expr(e, loc)),
            AstStmt::Assign { target, value } => {
                self.check_unresolved(target, loc);
                let target_state = self.ir.strings.intern(target);
                IrStmt::Assign { target_state, value: self.resolve_expr(value, loc) }
            }
        }
    }

    // ---- expression resolution + reference checking --------------------

    fn resolve_expr(&mut self, expr: &RawExpression, loc: &SourceLocation) -> Expression {
        match expr {
            RawExpression::Literal(v) => Expression::Literal(self.raw_value_to_value(v)),
            RawExpression::VarRef(name) => {
                if let Some(c) = self.consts.get(name).cloned() {
                    self.resolve_expr(&c, loc)
                } else {
                    self.check_unresolved(name, loc);
                    Expression::VarRef(self.ir.strings.intern(name))
                }
            }
            RawExpression::MemberAccess(obj, field) => {
                let obj = Box::new(self.resolve_expr(obj, loc));
                Expression::MemberAccess(obj, self.ir.strings.intern(field))
            }
            RawExpression::ArrayAccess(arr, idx) => {
                Expression::ArrayAccess(Box::new(self.resolve_expr(arr, loc)), Box::new(self.resolve_expr(idx, loc)))
            }
            RawExpression::BinaryOp(op, l, r) => {
                Expression::BinaryOp(*op, Box::new(self.resolve_expr(l, loc)), Box::new(self.resolve_expr(r, loc)))
            }
            RawExpression::UnaryOp(op, inner) => Expression::UnaryOp(*op, Box::new(self.resolve_expr(inner, loc))),
            RawExpression::Ternary(c, t, e) => Expression::Ternary(
                Box::new(self.resolve_expr(c, loc)),
                Box::new(self.resolve_expr(t, loc)),
                Box::new(self.resolve_expr(e, loc)),
            ),
            RawExpression::FunctionCall(name, args) => {
                let name_index = self.ir.strings.intern(name);
                let args = args.iter().map(|a| self.resolve_expr(a, loc)).collect();
                Expression::FunctionCall(name_index, args)
            }
            RawExpression::Template(segments) => {
                let segments = segments
                    .iter()
                    .map(|s| match s {
                        kryon_ast::TemplateSegment::Literal(l) => crate::expression::TemplateSegment::Literal(self.ir.strings.intern(l)),
                        kryon_ast::TemplateSegment::Expr(e) => crate::expression::TemplateSegment::Expr(self.resolve_expr(e, loc)),
                    })
                    .collect();
                Expression::Template(segments)
            }
            RawExpression::ArrayLit(items) => Expression::ArrayLit(items.iter().map(|i| self.resolve_expr(i, loc)).collect()),
            RawExpression::ObjectLit(fields) => Expression::ObjectLit(
                fields.iter().map(|(k, v)| (self.ir.strings.intern(k), self.resolve_expr(v, loc))).collect(),
            ),
        }
    }

    fn raw_value_to_value(&mut self, v: &RawValue) -> Value {
        match v {
            RawValue::String(s) => Value::String(self.ir.strings.intern(s)),
            RawValue::Int(i) => Value::Int(*i),
            RawValue::Float(f) => Value::Float(*f),
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Null => Value::Null,
            RawValue::Color(r, g, b, a) => Value::Color(*r, *g, *b, *a),
            RawValue::Unit(n, u) => Value::Unit(*n, *u),
        }
    }

    fn value_to_raw(&self, v: &Value) -> RawExpression {
        match v {
            Value::String(idx) => RawExpression::Literal(RawValue::String(self.ir.strings.get(*idx).unwrap_or("").to_string())),
            Value::Int(i) => RawExpression::Literal(RawValue::Int(*i)),
            Value::Float(f) => RawExpression::Literal(RawValue::Float(*f)),
            Value::Bool(b) => RawExpression::Literal(RawValue::Bool(*b)),
            Value::Null => RawExpression::Literal(RawValue::Null),
            Value::Color(r, g, b, a) => RawExpression::Literal(RawValue::Color(*r, *g, *b, *a)),
            Value::Unit(n, u) => RawExpression::Literal(RawValue::Unit(*n, *u)),
            Value::Array(items) => RawExpression::ArrayLit(items.iter().map(|i| self.value_to_raw(i)).collect()),
            Value::Object(fields) => RawExpression::ObjectLit(
                fields.iter().map(|(k, v)| (self.ir.strings.get(*k).unwrap_or("").to_string(), self.value_to_raw(v))).collect(),
            ),
        }
    }

    fn check_unresolved(&mut self, name: &str, loc: &SourceLocation) {
        if self.consts.contains_key(name) || self.known_var_names.contains(name) {
            return;
        }
        let suggestion = self.suggest_name(name);
        let mut diagnostic = IrDiagnostic::new(loc.clone(), Severity::Error, IrErrorKind::UnresolvedSymbol, format!("unresolved symbol `{name}`"));
        if let Some(s) = suggestion {
            diagnostic = diagnostic.with_hint(format!("did you mean `{s}`?"));
        }
        self.diagnostics.push(diagnostic);
    }

    fn suggest_name(&self, name: &str) -> Option<String> {
        let mut best: Option<(usize, &str)> = None;
        for candidate in self.known_var_names.iter().chain(self.consts.keys()) {
            let dist = strsim::levenshtein(name, candidate);
            if dist <= 2 && best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, candidate.as_str()));
            }
        }
        best.map(|(_, s)| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kryon_ast::{CurlyParser, FrontendParser};

    fn build_source(src: &str) -> (Ir, Vec<IrDiagnostic>) {
        let tokens = kryon_lexer::lex(src).expect("lex");
        let (root, parse_diags) = CurlyParser.parse(tokens, "<test>");
        assert!(parse_diags.is_empty(), "unexpected parse diagnostics: {parse_diags:?}");
        build(&root, BuildOptions::default())
    }

    #[test]
    fn lowers_minimal_button_with_no_diagnostics() {
        let (ir, diags) = build_source(r#"Button { id = "go"; width = 100px; }"#);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        assert_eq!(ir.root.len(), 1);
        let button = &ir.root[0];
        assert_eq!(ir.strings.get(button.element_type_index), Some("Button"));
        assert_eq!(button.id_string_index.and_then(|i| ir.strings.get(i)), Some("go"));
    }

    #[test]
    fn const_for_unrolls_into_one_element_per_item() {
        let (ir, diags) = build_source(
            r#"
            const { items = [1, 2, 3]; }
            Column {
                @const_for(item in items) {
                    Text { value = item; }
                }
            }
            "#,
        );
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        assert_eq!(ir.root.len(), 1);
        assert_eq!(ir.root[0].children.len(), 3);
        for (i, child) in ir.root[0].children.iter().enumerate() {
            assert_eq!(child.expansion, Some(ExpansionInfo::ConstFor { iteration: i as u32 }));
        }
    }

    #[test]
    fn style_extends_chain_resolves_inherited_properties() {
        let (ir, diags) = build_source(
            r#"
            style base { padding = 8px; }
            style card extends base { width = 200px; }
            Panel { style = "card"; }
            "#,
        );
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        let card_index = ir.strings.iter().position(|s| s == "card").expect("card interned") as StringIndex;
        let resolved = ir.resolve_style(card_index).expect("no cycle");
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn unresolved_symbol_gets_a_suggestion() {
        let (_ir, diags) = build_source(
            r#"
            const { coolor = "#ff0000"; }
            Panel { background_color = color; }
            "#,
        );
        assert!(diags.iter().any(|d| d.kind == IrErrorKind::UnresolvedSymbol));
        let diag = diags.iter().find(|d| d.kind == IrErrorKind::UnresolvedSymbol).unwrap();
        assert!(diag.hint.as_deref().unwrap_or("").contains("coolor"));
    }

    #[test]
    fn category_violation_is_recorded_and_recovered_by_skipping() {
        let (ir, diags) = build_source(r#"Button { checked = true; }"#);
        assert!(diags.iter().any(|d| d.kind == IrErrorKind::CategoryViolation));
        assert!(ir.root[0].properties.is_empty());
    }

    #[test]
    fn include_cycle_is_detected() {
        let mut ctx = BuildCtx::new(BuildOptions::default());
        ctx.include_stack.insert("self.krx".to_string());
        let elements = ctx.expand_include("self.krx", &None);
        assert!(elements.is_empty());
        assert!(ctx.diagnostics.iter().any(|d| d.kind == IrErrorKind::IncludeCycle));
    }
}

fn infer_state_type(hint: Option<&str>, initial: &Value) -> StateType {
    if let Some(hint) = hint {
        match hint {
            "int" => return StateType::Int,
            "float" => return StateType::Float,
            "string" => return StateType::String,
            "bool" => return StateType::Bool,
            _ => {}
        }
    }
    match initial {
        Value::Int(_) => StateType::Int,
        Value::Float(_) => StateType::Float,
        Value::Bool(_) => StateType::Bool,
        _ => StateType::String,
    }
}
