//! A smaller, parenthesized second frontend. It does not cover the full
//! grammar the curly-brace parser does — components carry a name, an
//! optional `extends`, and a body, nothing more — but it converges on the
//! exact same [`Root`]/[`Node`] tree, which is the only thing the IR builder
//! downstream ever looks at.

use kryon_lexer::{Token, TokenKind};

use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::expr::{BinOp, RawExpression, RawValue, UnOp};
use crate::frontend::FrontendParser;
use crate::node::{
    ComponentDef, Directive, Element, Event, EventKind, HandlerBody, Node, Property, Root,
    StateVar, Stmt, StyleDef,
};

pub struct SexprParser;

impl FrontendParser for SexprParser {
    fn name(&self) -> &'static str {
        "sexpr"
    }

    fn parse(&self, tokens: Vec<Token>, file: &str) -> (Root, Vec<Diagnostic>) {
        let mut cursor = Cursor::new(&tokens, file);
        let mut diags = Vec::new();
        let mut root = Root::default();

        while !cursor.is_eof() {
            match parse_form(&mut cursor, &mut diags) {
                Some(Node::Directive(d)) => root.directives.push(d),
                Some(node) => root.body.push(node),
                None => cursor.synchronize(),
            }
        }

        (root, diags)
    }
}

/// Reads one `(tag ...)` form and dispatches on `tag`.
fn parse_form(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Option<Node> {
    let location = cursor.location();
    expect(cursor, diags, TokenKind::LParen, "expected '(' to start a form")?;
    let tag = read_symbol(cursor, diags)?;

    let node = match tag.as_str() {
        "component" => Node::ComponentDef(parse_component_form(cursor, diags, location)),
        "style" => Node::StyleDef(parse_style_form(cursor, diags, location)),
        "var" => Node::Directive(parse_var_form(cursor, diags, location)),
        _ if tag.chars().next().is_some_and(|c| c.is_uppercase()) => {
            Node::Element(parse_element_form(cursor, diags, tag, location))
        }
        other => {
            diags.push(Diagnostic::error(
                location,
                format!("unrecognized top-level form tag '{other}'"),
            ));
            skip_to_matching_rparen(cursor);
            return None;
        }
    };
    let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close form");
    Some(node)
}

fn parse_component_form(
    cursor: &mut Cursor,
    diags: &mut Vec<Diagnostic>,
    location: crate::location::SourceLocation,
) -> ComponentDef {
    let name = read_symbol(cursor, diags).unwrap_or_default();
    let parent = if peek_symbol_is(cursor, "extends") {
        cursor.advance();
        read_symbol(cursor, diags)
    } else {
        None
    };

    let mut def = ComponentDef {
        name,
        params: Vec::new(),
        parent,
        state_vars: Vec::new(),
        functions: Vec::new(),
        on_mount: None,
        on_unmount: None,
        body: Vec::new(),
        location,
    };

    while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
        let form_loc = cursor.location();
        if matches!(cursor.peek(), TokenKind::LParen) && peek_tag_is(cursor, "var") {
            cursor.advance();
            cursor.advance(); // "var"
            if let Directive::StateDef(sv) = parse_var_form(cursor, diags, form_loc) {
                def.state_vars.push(sv);
            }
            let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close (var ...)");
        } else {
            match parse_form(cursor, diags) {
                Some(node) => def.body.push(node),
                None => {}
            }
        }
    }
    def
}

fn parse_style_form(
    cursor: &mut Cursor,
    diags: &mut Vec<Diagnostic>,
    location: crate::location::SourceLocation,
) -> StyleDef {
    let name = read_symbol(cursor, diags).unwrap_or_default();
    let parent = if peek_symbol_is(cursor, "extends") {
        cursor.advance();
        read_symbol(cursor, diags)
    } else {
        None
    };
    let mut properties = Vec::new();
    while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
        let prop_loc = cursor.location();
        let _ = expect(cursor, diags, TokenKind::LParen, "expected '(' to start a style property");
        let name = read_symbol(cursor, diags).unwrap_or_default();
        let value = parse_expr(cursor, diags);
        let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close style property");
        properties.push(Property { name, value, location: prop_loc });
    }
    StyleDef { name, parent, properties, location }
}

fn parse_var_form(
    cursor: &mut Cursor,
    diags: &mut Vec<Diagnostic>,
    location: crate::location::SourceLocation,
) -> Directive {
    let name = read_symbol(cursor, diags).unwrap_or_default();
    let initial = parse_expr(cursor, diags);
    Directive::StateDef(StateVar { name, type_hint: None, initial, location })
}

fn parse_element_form(
    cursor: &mut Cursor,
    diags: &mut Vec<Diagnostic>,
    type_name: String,
    location: crate::location::SourceLocation,
) -> Element {
    let mut element = Element {
        type_name,
        id: None,
        style_ref: None,
        properties: Vec::new(),
        events: Vec::new(),
        children: Vec::new(),
        location,
    };

    while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
        if !matches!(cursor.peek(), TokenKind::LParen) {
            diags.push(Diagnostic::error(cursor.location(), "expected '(' to start a child form"));
            cursor.advance();
            continue;
        }
        let form_loc = cursor.location();
        if peek_tag_is(cursor, "on") {
            cursor.advance();
            cursor.advance(); // "on"
            let event_name = read_symbol(cursor, diags).unwrap_or_default();
            let kind = EventKind::from_name(&event_name);
            let mut stmts = Vec::new();
            while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
                stmts.push(parse_stmt_form(cursor, diags));
            }
            let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close (on ...)");
            if let Some(kind) = kind {
                element.events.push(Event { kind, handler: HandlerBody::Inline(stmts), location: form_loc });
            } else {
                diags.push(Diagnostic::error(form_loc, format!("unknown event name '{event_name}'")));
            }
            continue;
        }

        if let Some(tag) = peek_first_symbol(cursor) {
            if tag.chars().next().is_some_and(|c| c.is_uppercase()) {
                match parse_form(cursor, diags) {
                    Some(Node::Element(child)) => element.children.push(Node::Element(child)),
                    Some(other) => element.children.push(other),
                    None => {}
                }
                continue;
            }
        }

        cursor.advance(); // consume '('
        let name = read_symbol(cursor, diags).unwrap_or_default();
        let value = parse_expr(cursor, diags);
        let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close property form");
        match name.as_str() {
            "id" => element.id = literal_string(&value),
            "style" => element.style_ref = literal_string(&value),
            _ => element.properties.push(Property { name, value, location: form_loc }),
        }
    }

    element
}

fn parse_stmt_form(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Stmt {
    if matches!(cursor.peek(), TokenKind::LParen) && peek_tag_is(cursor, "set") {
        cursor.advance();
        cursor.advance(); // "set"
        let target = read_symbol(cursor, diags).unwrap_or_default();
        let value = parse_expr(cursor, diags);
        let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close (set ...)");
        Stmt::Assign { target, value }
    } else {
        Stmt::Expr(parse_expr(cursor, diags))
    }
}

fn parse_expr(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    match cursor.peek().clone() {
        TokenKind::LParen => parse_expr_form(cursor, diags),
        TokenKind::NumberLiteral(value, unit) => {
            cursor.advance();
            if matches!(unit, kryon_lexer::Unit::None) && value.fract() == 0.0 {
                RawExpression::Literal(RawValue::Int(value as i64))
            } else if matches!(unit, kryon_lexer::Unit::None) {
                RawExpression::Literal(RawValue::Float(value))
            } else {
                RawExpression::Literal(RawValue::Unit(value, unit))
            }
        }
        TokenKind::StringLiteral(s) => {
            cursor.advance();
            RawExpression::Literal(RawValue::String(s))
        }
        TokenKind::BoolLiteral(b) => {
            cursor.advance();
            RawExpression::Literal(RawValue::Bool(b))
        }
        TokenKind::ColorLiteral(r, g, b, a) => {
            cursor.advance();
            RawExpression::Literal(RawValue::Color(r, g, b, a))
        }
        TokenKind::Identifier(name) => {
            cursor.advance();
            if name == "null" {
                RawExpression::Literal(RawValue::Null)
            } else {
                RawExpression::VarRef(name)
            }
        }
        other => {
            diags.push(Diagnostic::error(cursor.location(), format!("expected an expression, found {other:?}")));
            cursor.advance();
            RawExpression::Literal(RawValue::Null)
        }
    }
}

fn parse_expr_form(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let location = cursor.location();
    cursor.advance(); // '('
    let op = read_symbol(cursor, diags).unwrap_or_default();

    let binop = match op.as_str() {
        "+" => Some(BinOp::Add),
        "*" => Some(BinOp::Mul),
        "/" => Some(BinOp::Div),
        "%" => Some(BinOp::Mod),
        "==" => Some(BinOp::Eq),
        "!=" => Some(BinOp::Ne),
        "<" => Some(BinOp::Lt),
        ">" => Some(BinOp::Gt),
        "<=" => Some(BinOp::Le),
        ">=" => Some(BinOp::Ge),
        "&&" => Some(BinOp::And),
        "||" => Some(BinOp::Or),
        _ => None,
    };

    let result = if let Some(op) = binop {
        let lhs = parse_expr(cursor, diags);
        let rhs = parse_expr(cursor, diags);
        RawExpression::BinaryOp(op, Box::new(lhs), Box::new(rhs))
    } else {
        match op.as_str() {
            "-" => {
                // `(- a)` negates; `(- a b)` subtracts. Only the first
                // operand is needed to tell which, since a closing paren
                // right after it means there was only one.
                let first = parse_expr(cursor, diags);
                if matches!(cursor.peek(), TokenKind::RParen) {
                    RawExpression::UnaryOp(UnOp::Neg, Box::new(first))
                } else {
                    let second = parse_expr(cursor, diags);
                    RawExpression::BinaryOp(BinOp::Sub, Box::new(first), Box::new(second))
                }
            }
            "neg" => RawExpression::UnaryOp(UnOp::Neg, Box::new(parse_expr(cursor, diags))),
            "!" | "not" => RawExpression::UnaryOp(UnOp::Not, Box::new(parse_expr(cursor, diags))),
            "if" => {
                let cond = parse_expr(cursor, diags);
                let then = parse_expr(cursor, diags);
                let else_ = parse_expr(cursor, diags);
                RawExpression::Ternary(Box::new(cond), Box::new(then), Box::new(else_))
            }
            "get" => {
                let obj = parse_expr(cursor, diags);
                let field = read_symbol(cursor, diags).unwrap_or_default();
                RawExpression::MemberAccess(Box::new(obj), field)
            }
            "index" => {
                let arr = parse_expr(cursor, diags);
                let idx = parse_expr(cursor, diags);
                RawExpression::ArrayAccess(Box::new(arr), Box::new(idx))
            }
            "array" => {
                let mut items = Vec::new();
                while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
                    items.push(parse_expr(cursor, diags));
                }
                RawExpression::ArrayLit(items)
            }
            "object" => {
                let mut fields = Vec::new();
                while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
                    let _ = expect(cursor, diags, TokenKind::LParen, "expected '(' to start an object field");
                    let key = read_symbol(cursor, diags).unwrap_or_default();
                    let value = parse_expr(cursor, diags);
                    let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close object field");
                    fields.push((key, value));
                }
                RawExpression::ObjectLit(fields)
            }
            name => {
                let mut args = Vec::new();
                while !matches!(cursor.peek(), TokenKind::RParen | TokenKind::Eof) {
                    args.push(parse_expr(cursor, diags));
                }
                if name.is_empty() {
                    diags.push(Diagnostic::error(location, "expected an operator or function name"));
                }
                RawExpression::FunctionCall(name.to_string(), args)
            }
        }
    };

    let _ = expect(cursor, diags, TokenKind::RParen, "expected ')' to close expression form");
    result
}

fn literal_string(expr: &RawExpression) -> Option<String> {
    match expr {
        RawExpression::Literal(RawValue::String(s)) => Some(s.clone()),
        RawExpression::VarRef(name) => Some(name.clone()),
        _ => None,
    }
}

fn read_symbol(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> Option<String> {
    match cursor.peek().clone() {
        TokenKind::Identifier(name) => {
            cursor.advance();
            Some(name)
        }
        TokenKind::Plus => {
            cursor.advance();
            Some("+".to_string())
        }
        TokenKind::Minus => {
            cursor.advance();
            Some("-".to_string())
        }
        TokenKind::Star => {
            cursor.advance();
            Some("*".to_string())
        }
        TokenKind::Slash => {
            cursor.advance();
            Some("/".to_string())
        }
        TokenKind::Percent => {
            cursor.advance();
            Some("%".to_string())
        }
        TokenKind::EqEq => {
            cursor.advance();
            Some("==".to_string())
        }
        TokenKind::NotEq => {
            cursor.advance();
            Some("!=".to_string())
        }
        TokenKind::Lt => {
            cursor.advance();
            Some("<".to_string())
        }
        TokenKind::Gt => {
            cursor.advance();
            Some(">".to_string())
        }
        TokenKind::LtEq => {
            cursor.advance();
            Some("<=".to_string())
        }
        TokenKind::GtEq => {
            cursor.advance();
            Some(">=".to_string())
        }
        TokenKind::AndAnd => {
            cursor.advance();
            Some("&&".to_string())
        }
        TokenKind::OrOr => {
            cursor.advance();
            Some("||".to_string())
        }
        TokenKind::Bang => {
            cursor.advance();
            Some("!".to_string())
        }
        other => {
            diags.push(Diagnostic::error(cursor.location(), format!("expected a symbol, found {other:?}")));
            None
        }
    }
}

fn peek_symbol_is(cursor: &Cursor, name: &str) -> bool {
    matches!(cursor.peek(), TokenKind::Identifier(n) if n == name)
}

/// True if the form starting at the current `(` has `tag` as its head symbol.
fn peek_tag_is(cursor: &Cursor, tag: &str) -> bool {
    matches!(cursor.peek_at(1), TokenKind::Identifier(n) if n == tag)
}

fn peek_first_symbol(cursor: &Cursor) -> Option<String> {
    match cursor.peek_at(1) {
        TokenKind::Identifier(n) => Some(n.clone()),
        _ => None,
    }
}

fn skip_to_matching_rparen(cursor: &mut Cursor) {
    let mut depth = 1i32;
    loop {
        match cursor.peek() {
            TokenKind::Eof => return,
            TokenKind::LParen => {
                depth += 1;
                cursor.advance();
            }
            TokenKind::RParen => {
                depth -= 1;
                cursor.advance();
                if depth == 0 {
                    return;
                }
            }
            _ => {
                cursor.advance();
            }
        }
    }
}

fn expect(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>, kind: TokenKind, message: &str) -> Option<()> {
    if std::mem::discriminant(cursor.peek()) == std::mem::discriminant(&kind) {
        cursor.advance();
        Some(())
    } else {
        diags.push(Diagnostic::error(cursor.location(), message));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kryon_lexer::lex;

    fn parse(src: &str) -> (Root, Vec<Diagnostic>) {
        let tokens = lex(src).expect("lex should succeed");
        SexprParser.parse(tokens, "test.kryl")
    }

    #[test]
    fn parses_minimal_button() {
        let (root, diags) = parse(r#"(Button (id "go") (text "Go"))"#);
        assert!(diags.is_empty(), "{diags:?}");
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
            (component Counter
                (var count 0)
                (Button (on click (set count (+ count 1)))))
        "#;
        let (root, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        match &root.body[0] {
            Node::ComponentDef(def) => {
                assert_eq!(def.state_vars.len(), 1);
                assert_eq!(def.state_vars[0].name, "count");
                let Node::Element(btn) = &def.body[0] else { panic!() };
                assert_eq!(btn.events[0].kind, EventKind::Click);
            }
            other => panic!("expected component def, got {other:?}"),
        }
    }

    #[test]
    fn converges_with_curly_on_same_button_shape() {
        use crate::parsers::curly::CurlyParser;

        let (sexpr_root, _) = parse(r#"(Button (id "go"))"#);
        let curly_tokens = kryon_lexer::lex(r#"Button { id = "go" }"#).unwrap();
        let (curly_root, _) = CurlyParser.parse(curly_tokens, "test.kry");

        let Node::Element(a) = &sexpr_root.body[0] else { panic!() };
        let Node::Element(b) = &curly_root.body[0] else { panic!() };
        assert_eq!(a.type_name, b.type_name);
        assert_eq!(a.id, b.id);
    }
}
