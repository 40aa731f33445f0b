//! The primary frontend: a curly-brace DSL resembling QML/SwiftUI-style
//! declarative markup. This is the parser every Scenario in the reference
//! corpus is written against.

mod expr;

use kryon_lexer::{Token, TokenKind};

use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::expr::RawExpression;
use crate::frontend::FrontendParser;
use crate::node::{
    ComponentDef, ComponentParam, Directive, Element, Event, EventKind, FunctionDef, HandlerBody,
    IfBranch, Node, Property, Root, StateVar, Stmt, StyleDef, ThemeDef, ThemeVariable,
};

pub struct CurlyParser;

impl FrontendParser for CurlyParser {
    fn name(&self) -> &'static str {
        "curly"
    }

    fn parse(&self, tokens: Vec<Token>, file: &str) -> (Root, Vec<Diagnostic>) {
        let mut cursor = Cursor::new(&tokens, file);
        let mut diags = Vec::new();
        let mut root = Root::default();

        while !cursor.is_eof() {
            match parse_top_level(&mut cursor, &mut diags) {
                Some(Node::Directive(d)) => root.directives.push(d),
                Some(node) => root.body.push(node),
                None => cursor.synchronize(),
            }
        }

        (root, diags)
    }
}

fn parse_top_level(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Option<Node> {
    match cursor.peek().clone() {
        TokenKind::Component => Some(Node::ComponentDef(parse_component(cursor, diags))),
        TokenKind::Style => Some(Node::StyleDef(parse_style(cursor, diags))),
        TokenKind::Theme => Some(Node::ThemeDef(parse_theme(cursor, diags))),
        TokenKind::Const => Some(Node::Directive(parse_const(cursor, diags))),
        TokenKind::AtVar => Some(Node::Directive(parse_var(cursor, diags))),
        TokenKind::Include => Some(Node::Directive(parse_include(cursor, diags))),
        TokenKind::Import => Some(Node::Directive(parse_import(cursor, diags))),
        TokenKind::Export => Some(Node::Directive(parse_export(cursor, diags))),
        TokenKind::AtFor | TokenKind::AtConstFor => {
            Some(Node::Directive(parse_for(cursor, diags)))
        }
        TokenKind::AtIf | TokenKind::AtConstIf => Some(Node::Directive(parse_if(cursor, diags))),
        TokenKind::AtWatch => Some(Node::Directive(parse_watch(cursor, diags))),
        TokenKind::OnMount => Some(Node::Directive(parse_on_mount(cursor, diags))),
        TokenKind::OnUnmount => Some(Node::Directive(parse_on_unmount(cursor, diags))),
        TokenKind::Identifier(_) => Some(Node::Element(parse_element(cursor, diags))),
        other => {
            diags.push(Diagnostic::error(
                cursor.location(),
                format!("unexpected token at top level: {other:?}"),
            ));
            None
        }
    }
}

fn parse_body(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Vec<Node> {
    expect_lbrace(cursor, diags);
    let mut nodes = Vec::new();
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        match parse_top_level(cursor, diags) {
            Some(node) => nodes.push(node),
            None => cursor.synchronize(),
        }
    }
    expect_rbrace(cursor, diags);
    nodes
}

fn parse_element(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Element {
    let location = cursor.location();
    let type_name = expect_identifier(cursor, diags);
    let mut element = Element {
        type_name,
        id: None,
        style_ref: None,
        properties: Vec::new(),
        events: Vec::new(),
        children: Vec::new(),
        location,
    };

    expect_lbrace(cursor, diags);
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        match cursor.peek().clone() {
            TokenKind::AtFor | TokenKind::AtConstFor => {
                element.children.push(Node::Directive(parse_for(cursor, diags)))
            }
            TokenKind::AtIf | TokenKind::AtConstIf => {
                element.children.push(Node::Directive(parse_if(cursor, diags)))
            }
            TokenKind::Identifier(name) if matches!(cursor.peek_at(1), TokenKind::LBrace) => {
                if let Some(kind) = EventKind::from_name(&name) {
                    cursor.advance();
                    element.events.push(parse_event_inline(cursor, diags, kind));
                } else {
                    element.children.push(Node::Element(parse_element(cursor, diags)));
                }
            }
            TokenKind::Identifier(name) if matches!(cursor.peek_at(1), TokenKind::Eq) => {
                cursor.advance();
                cursor.advance();
                let value = expr::parse_expression(cursor, diags);
                let prop_loc = cursor.location();
                match name.as_str() {
                    "id" => element.id = literal_string(&value),
                    _ => {
                        if let Some(kind) = EventKind::from_name(&name) {
                            element.events.push(Event {
                                kind,
                                handler: handler_from_expr(value),
                                location: prop_loc,
                            });
                        } else {
                            element.properties.push(Property { name, value, location: prop_loc });
                        }
                    }
                }
                consume_optional_semicolon(cursor);
            }
            // `style` is a keyword token everywhere else, but as an element
            // property it just references a style definition by name.
            TokenKind::Style if matches!(cursor.peek_at(1), TokenKind::Eq) => {
                cursor.advance();
                cursor.advance();
                let value = expr::parse_expression(cursor, diags);
                element.style_ref = literal_string(&value);
                consume_optional_semicolon(cursor);
            }
            _ => {
                diags.push(Diagnostic::error(
                    cursor.location(),
                    "expected a property, event, or child element inside element body",
                ));
                cursor.synchronize();
            }
        }
    }
    expect_rbrace(cursor, diags);
    element
}

fn parse_event_inline(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>, kind: EventKind) -> Event {
    let location = cursor.location();
    let body = parse_stmt_block(cursor, diags);
    Event { kind, handler: HandlerBody::Inline(body), location }
}

fn handler_from_expr(expr: RawExpression) -> HandlerBody {
    match expr {
        RawExpression::VarRef(name) => HandlerBody::Named(name),
        RawExpression::FunctionCall(name, _) => HandlerBody::Named(name),
        other => HandlerBody::Inline(vec![Stmt::Expr(other)]),
    }
}

fn literal_string(expr: &RawExpression) -> Option<String> {
    match expr {
        RawExpression::Literal(crate::expr::RawValue::String(s)) => Some(s.clone()),
        RawExpression::VarRef(name) => Some(name.clone()),
        _ => None,
    }
}

fn parse_stmt_block(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Vec<Stmt> {
    expect_lbrace(cursor, diags);
    let mut stmts = Vec::new();
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        stmts.push(parse_stmt(cursor, diags));
        consume_optional_semicolon(cursor);
    }
    expect_rbrace(cursor, diags);
    stmts
}

fn parse_stmt(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Stmt {
    if matches!(cursor.peek(), TokenKind::Identifier(_)) && matches!(cursor.peek_at(1), TokenKind::Eq) {
        let target = expect_identifier(cursor, diags);
        cursor.advance();
        let value = expr::parse_expression(cursor, diags);
        Stmt::Assign { target, value }
    } else {
        Stmt::Expr(expr::parse_expression(cursor, diags))
    }
}

fn parse_component(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> ComponentDef {
    let location = cursor.location();
    cursor.advance();
    let name = expect_identifier(cursor, diags);

    let mut params = Vec::new();
    if matches!(cursor.peek(), TokenKind::LParen) {
        cursor.advance();
        while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
            let pname = expect_identifier(cursor, diags);
            let default = if matches!(cursor.peek(), TokenKind::Eq) {
                cursor.advance();
                Some(expr::parse_expression(cursor, diags))
            } else {
                None
            };
            params.push(ComponentParam { name: pname, default });
            if matches!(cursor.peek(), TokenKind::Comma) {
                cursor.advance();
            } else {
                break;
            }
        }
        expect(cursor, diags, TokenKind::RParen, "expected ')' after component parameters");
    }

    let parent = if matches!(cursor.peek(), TokenKind::Extends) {
        cursor.advance();
        Some(expect_identifier(cursor, diags))
    } else {
        None
    };

    let mut def = ComponentDef {
        name,
        params,
        parent,
        state_vars: Vec::new(),
        functions: Vec::new(),
        on_mount: None,
        on_unmount: None,
        body: Vec::new(),
        location,
    };

    expect_lbrace(cursor, diags);
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        match cursor.peek().clone() {
            TokenKind::State => def.state_vars.push(parse_state_var(cursor, diags)),
            TokenKind::AtVar => {
                if let Directive::StateDef(sv) = parse_var(cursor, diags) {
                    def.state_vars.push(sv);
                }
            }
            TokenKind::OnMount => {
                if let Directive::OnMount(stmts) = parse_on_mount(cursor, diags) {
                    def.on_mount = Some(stmts);
                }
            }
            TokenKind::OnUnmount => {
                if let Directive::OnUnmount(stmts) = parse_on_unmount(cursor, diags) {
                    def.on_unmount = Some(stmts);
                }
            }
            TokenKind::Identifier(name) if name == "function" || name == "fn" => {
                def.functions.push(parse_function(cursor, diags));
            }
            _ => match parse_top_level(cursor, diags) {
                Some(node) => def.body.push(node),
                None => cursor.synchronize(),
            },
        }
    }
    expect_rbrace(cursor, diags);
    def
}

fn parse_function(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> FunctionDef {
    let location = cursor.location();
    cursor.advance();
    let language = if matches!(cursor.peek(), TokenKind::Colon) {
        cursor.advance();
        expect_identifier(cursor, diags)
    } else {
        "kryon".to_string()
    };
    let name = expect_identifier(cursor, diags);
    let mut params = Vec::new();
    expect(cursor, diags, TokenKind::LParen, "expected '(' after function name");
    while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
        params.push(expect_identifier(cursor, diags));
        if matches!(cursor.peek(), TokenKind::Comma) {
            cursor.advance();
        } else {
            break;
        }
    }
    expect(cursor, diags, TokenKind::RParen, "expected ')' after function parameters");
    let code = parse_stmt_block(cursor, diags);
    FunctionDef { language, name, params, code, location }
}

fn parse_state_var(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> StateVar {
    let location = cursor.location();
    cursor.advance();
    let name = expect_identifier(cursor, diags);
    let type_hint = if matches!(cursor.peek(), TokenKind::Colon) {
        cursor.advance();
        Some(expect_identifier(cursor, diags))
    } else {
        None
    };
    expect(cursor, diags, TokenKind::Eq, "expected '=' in state declaration");
    let initial = expr::parse_expression(cursor, diags);
    consume_optional_semicolon(cursor);
    StateVar { name, type_hint, initial, location }
}

fn parse_var(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    let location = cursor.location();
    cursor.advance();
    let name = expect_identifier(cursor, diags);
    let type_hint = if matches!(cursor.peek(), TokenKind::Colon) {
        cursor.advance();
        Some(expect_identifier(cursor, diags))
    } else {
        None
    };
    expect(cursor, diags, TokenKind::Eq, "expected '=' in @var declaration");
    let initial = expr::parse_expression(cursor, diags);
    consume_optional_semicolon(cursor);
    Directive::StateDef(StateVar { name, type_hint, initial, location })
}

fn parse_style(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> StyleDef {
    let location = cursor.location();
    cursor.advance();
    let name = expect_identifier(cursor, diags);
    let parent = if matches!(cursor.peek(), TokenKind::Extends) {
        cursor.advance();
        Some(expect_identifier(cursor, diags))
    } else {
        None
    };
    expect_lbrace(cursor, diags);
    let mut properties = Vec::new();
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        let prop_loc = cursor.location();
        let pname = expect_identifier(cursor, diags);
        expect(cursor, diags, TokenKind::Eq, "expected '=' in style property");
        let value = expr::parse_expression(cursor, diags);
        properties.push(Property { name: pname, value, location: prop_loc });
        consume_optional_semicolon(cursor);
    }
    expect_rbrace(cursor, diags);
    StyleDef { name, parent, properties, location }
}

fn parse_theme(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> ThemeDef {
    let location = cursor.location();
    cursor.advance();
    let group = expect_identifier(cursor, diags);
    expect_lbrace(cursor, diags);
    let mut variables = Vec::new();
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        let name = expect_identifier(cursor, diags);
        let type_hint = if matches!(cursor.peek(), TokenKind::Colon) {
            cursor.advance();
            Some(expect_identifier(cursor, diags))
        } else {
            None
        };
        expect(cursor, diags, TokenKind::Eq, "expected '=' in theme variable");
        let initial = expr::parse_expression(cursor, diags);
        variables.push(ThemeVariable { name, type_hint, initial });
        consume_optional_semicolon(cursor);
    }
    expect_rbrace(cursor, diags);
    ThemeDef { group, variables, location }
}

fn parse_const(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    expect_lbrace(cursor, diags);
    let mut entries = Vec::new();
    while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
        let name = expect_identifier(cursor, diags);
        expect(cursor, diags, TokenKind::Eq, "expected '=' in const declaration");
        let value = expr::parse_expression(cursor, diags);
        entries.push((name, value));
        consume_optional_semicolon(cursor);
    }
    expect_rbrace(cursor, diags);
    Directive::Const(entries)
}

fn parse_include(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    let path = expect_string(cursor, diags);
    consume_optional_semicolon(cursor);
    Directive::Include { path, expanded: None }
}

fn parse_import(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    let mut symbols = Vec::new();
    if matches!(cursor.peek(), TokenKind::LBrace) {
        cursor.advance();
        while !matches!(cursor.peek(), TokenKind::RBrace | TokenKind::Eof) {
            symbols.push(expect_identifier(cursor, diags));
            if matches!(cursor.peek(), TokenKind::Comma) {
                cursor.advance();
            } else {
                break;
            }
        }
        expect_rbrace(cursor, diags);
    }
    let path = if matches!(cursor.peek(), TokenKind::StringLiteral(_)) {
        expect_string(cursor, diags)
    } else {
        expect_identifier(cursor, diags)
    };
    consume_optional_semicolon(cursor);
    Directive::Import { path, symbols }
}

fn parse_export(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    let mut symbols = vec![expect_identifier(cursor, diags)];
    while matches!(cursor.peek(), TokenKind::Comma) {
        cursor.advance();
        symbols.push(expect_identifier(cursor, diags));
    }
    consume_optional_semicolon(cursor);
    Directive::Export { symbols }
}

fn parse_for(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    let is_const = matches!(cursor.peek(), TokenKind::AtConstFor);
    cursor.advance();
    expect(cursor, diags, TokenKind::LParen, "expected '(' after @for");
    let first = expect_identifier(cursor, diags);
    let (index, var) = if matches!(cursor.peek(), TokenKind::Comma) {
        cursor.advance();
        (Some(first), expect_identifier(cursor, diags))
    } else {
        (None, first)
    };
    expect_keyword_in(cursor, diags);
    let iterable = expr::parse_expression(cursor, diags);
    expect(cursor, diags, TokenKind::RParen, "expected ')' after @for iterable");
    let body = parse_body(cursor, diags);
    Directive::ForDirective { index, var, iterable, body, is_const }
}

fn expect_keyword_in(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) {
    match cursor.peek().clone() {
        TokenKind::Identifier(name) if name == "in" => {
            cursor.advance();
        }
        _ => diags.push(Diagnostic::error(cursor.location(), "expected 'in' inside @for(...)")),
    }
}

fn parse_if(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    let is_const = matches!(cursor.peek(), TokenKind::AtConstIf);
    cursor.advance();
    expect(cursor, diags, TokenKind::LParen, "expected '(' after @if");
    let cond = expr::parse_expression(cursor, diags);
    expect(cursor, diags, TokenKind::RParen, "expected ')' after @if condition");
    let then_body = parse_body(cursor, diags);
    let then = IfBranch { cond, body: then_body };

    let mut elif_pairs = Vec::new();
    while matches!(cursor.peek(), TokenKind::AtElif) {
        cursor.advance();
        expect(cursor, diags, TokenKind::LParen, "expected '(' after @elif");
        let cond = expr::parse_expression(cursor, diags);
        expect(cursor, diags, TokenKind::RParen, "expected ')' after @elif condition");
        let body = parse_body(cursor, diags);
        elif_pairs.push(IfBranch { cond, body });
    }

    let else_ = if matches!(cursor.peek(), TokenKind::AtElse) {
        cursor.advance();
        Some(parse_body(cursor, diags))
    } else {
        None
    };

    Directive::IfDirective { is_const, then, elif_pairs, else_ }
}

fn parse_watch(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    expect(cursor, diags, TokenKind::LParen, "expected '(' after @watch");
    let var = expect_identifier(cursor, diags);
    expect(cursor, diags, TokenKind::RParen, "expected ')' after @watch variable");
    let handler = if matches!(cursor.peek(), TokenKind::LBrace) {
        HandlerBody::Inline(parse_stmt_block(cursor, diags))
    } else {
        HandlerBody::Named(expect_identifier(cursor, diags))
    };
    Directive::Watch { var, handler }
}

fn parse_on_mount(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    Directive::OnMount(parse_stmt_block(cursor, diags))
}

fn parse_on_unmount(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Directive {
    cursor.advance();
    Directive::OnUnmount(parse_stmt_block(cursor, diags))
}

fn consume_optional_semicolon(cursor: &mut Cursor) {
    if matches!(cursor.peek(), TokenKind::Semicolon) {
        cursor.advance();
    }
}

fn expect_lbrace(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) {
    expect(cursor, diags, TokenKind::LBrace, "expected '{'");
}

fn expect_rbrace(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) {
    expect(cursor, diags, TokenKind::RBrace, "expected '}'");
}

fn expect(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>, kind: TokenKind, message: &str) {
    if std::mem::discriminant(cursor.peek()) == std::mem::discriminant(&kind) {
        cursor.advance();
    } else {
        diags.push(Diagnostic::error(cursor.location(), message));
    }
}

fn expect_identifier(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> String {
    match cursor.peek().clone() {
        TokenKind::Identifier(name) => {
            cursor.advance();
            name
        }
        other => {
            diags.push(Diagnostic::error(cursor.location(), format!("expected an identifier, found {other:?}")));
            String::new()
        }
    }
}

fn expect_string(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> String {
    match cursor.peek().clone() {
        TokenKind::StringLiteral(s) => {
            cursor.advance();
            s
        }
        other => {
            diags.push(Diagnostic::error(cursor.location(), format!("expected a string literal, found {other:?}")));
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kryon_lexer::lex;

    fn parse(src: &str) -> (Root, Vec<Diagnostic>) {
        let tokens = lex(src).expect("lex should succeed");
        CurlyParser.parse(tokens, "test.kry")
    }

    #[test]
    fn parses_minimal_button() {
        let (root, diags) = parse(r#"Button { id = "go"; text = "Go" }"#);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(root.body.len(), 1);
        match &root.body[0] {
            Node::Element(el) => {
                assert_eq!(el.type_name, "Button");
                assert_eq!(el.id.as_deref(), Some("go"));
                assert_eq!(el.properties.len(), 1);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn parses_click_handler_and_state() {
        let src = r#"
            component Counter {
                @var count = 0
                Button {
                    click { count = count + 1 }
                }
            }
        "#;
        let (root, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        match &root.body[0] {
            Node::ComponentDef(def) => {
                assert_eq!(def.state_vars.len(), 1);
                assert_eq!(def.state_vars[0].name, "count");
                let Node::Element(btn) = &def.body[0] else { panic!() };
                assert_eq!(btn.events.len(), 1);
                assert_eq!(btn.events[0].kind, EventKind::Click);
            }
            other => panic!("expected component def, got {other:?}"),
        }
    }

    #[test]
    fn parses_const_for_unrolled_children() {
        let src = r#"
            @const_for (i in [1, 2, 3]) {
                Text { value = i }
            }
        "#;
        let (root, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        match &root.directives[0] {
            Directive::ForDirective { is_const, var, .. } => {
                assert!(is_const);
                assert_eq!(var, "i");
            }
            other => panic!("expected for directive, got {other:?}"),
        }
    }

    #[test]
    fn recovers_from_malformed_element_and_keeps_parsing() {
        let src = r#"
            Broken { +++ }
            Button { id = "ok" }
        "#;
        let (root, diags) = parse(src);
        assert!(!diags.is_empty());
        assert!(root.body.iter().any(|n| matches!(n, Node::Element(e) if e.type_name == "Button")));
    }

    #[test]
    fn parses_style_extends_chain() {
        let (root, diags) = parse(r#"style card extends base { padding = 8px }"#);
        assert!(diags.is_empty(), "{diags:?}");
        match &root.body[0] {
            Node::StyleDef(style) => {
                assert_eq!(style.name, "card");
                assert_eq!(style.parent.as_deref(), Some("base"));
                assert_eq!(style.properties.len(), 1);
            }
            other => panic!("expected style def, got {other:?}"),
        }
    }
}
