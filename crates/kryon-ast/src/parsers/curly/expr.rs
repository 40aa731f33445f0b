use kryon_lexer::TokenKind;

use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::expr::{BinOp, RawExpression, RawValue, TemplateSegment, UnOp};

pub fn parse_expression(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    parse_ternary(cursor, diags)
}

fn parse_ternary(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let cond = parse_or(cursor, diags);
    if matches!(cursor.peek(), TokenKind::Question) {
        cursor.advance();
        let then = parse_ternary(cursor, diags);
        expect(cursor, diags, TokenKind::Colon, "expected ':' in ternary expression");
        let else_ = parse_ternary(cursor, diags);
        return RawExpression::Ternary(Box::new(cond), Box::new(then), Box::new(else_));
    }
    cond
}

fn parse_or(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut left = parse_and(cursor, diags);
    while matches!(cursor.peek(), TokenKind::OrOr) {
        cursor.advance();
        let right = parse_and(cursor, diags);
        left = RawExpression::BinaryOp(BinOp::Or, Box::new(left), Box::new(right));
    }
    left
}

fn parse_and(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut left = parse_equality(cursor, diags);
    while matches!(cursor.peek(), TokenKind::AndAnd) {
        cursor.advance();
        let right = parse_equality(cursor, diags);
        left = RawExpression::BinaryOp(BinOp::And, Box::new(left), Box::new(right));
    }
    left
}

fn parse_equality(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut left = parse_relational(cursor, diags);
    loop {
        let op = match cursor.peek() {
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::Ne,
            _ => break,
        };
        cursor.advance();
        let right = parse_relational(cursor, diags);
        left = RawExpression::BinaryOp(op, Box::new(left), Box::new(right));
    }
    left
}

fn parse_relational(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut left = parse_additive(cursor, diags);
    loop {
        let op = match cursor.peek() {
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            _ => break,
        };
        cursor.advance();
        let right = parse_additive(cursor, diags);
        left = RawExpression::BinaryOp(op, Box::new(left), Box::new(right));
    }
    left
}

fn parse_additive(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut left = parse_multiplicative(cursor, diags);
    loop {
        let op = match cursor.peek() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            _ => break,
        };
        cursor.advance();
        let right = parse_multiplicative(cursor, diags);
        left = RawExpression::BinaryOp(op, Box::new(left), Box::new(right));
    }
    left
}

fn parse_multiplicative(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut left = parse_unary(cursor, diags);
    loop {
        let op = match cursor.peek() {
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            _ => break,
        };
        cursor.advance();
        let right = parse_unary(cursor, diags);
        left = RawExpression::BinaryOp(op, Box::new(left), Box::new(right));
    }
    left
}

fn parse_unary(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    match cursor.peek() {
        TokenKind::Minus => {
            cursor.advance();
            RawExpression::UnaryOp(UnOp::Neg, Box::new(parse_unary(cursor, diags)))
        }
        TokenKind::Bang => {
            cursor.advance();
            RawExpression::UnaryOp(UnOp::Not, Box::new(parse_unary(cursor, diags)))
        }
        _ => parse_postfix(cursor, diags),
    }
}

fn parse_postfix(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut expr = parse_primary(cursor, diags);
    loop {
        match cursor.peek() {
            TokenKind::Dot => {
                cursor.advance();
                let name = expect_identifier(cursor, diags);
                expr = RawExpression::MemberAccess(Box::new(expr), name);
            }
            TokenKind::LBracket => {
                cursor.advance();
                let index = parse_expression(cursor, diags);
                expect(cursor, diags, TokenKind::RBracket, "expected ']'");
                expr = RawExpression::ArrayAccess(Box::new(expr), Box::new(index));
            }
            _ => break,
        }
    }
    expr
}

fn parse_primary(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    match cursor.peek().clone() {
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
        TokenKind::BoolLiteral(b) => {
            cursor.advance();
            RawExpression::Literal(RawValue::Bool(b))
        }
        TokenKind::ColorLiteral(r, g, b, a) => {
            cursor.advance();
            RawExpression::Literal(RawValue::Color(r, g, b, a))
        }
        TokenKind::StringLiteral(s) => {
            cursor.advance();
            RawExpression::Literal(RawValue::String(s))
        }
        TokenKind::TemplateStringPart(_) | TokenKind::TemplateExprStart => {
            parse_template(cursor, diags)
        }
        TokenKind::Identifier(name) => {
            cursor.advance();
            if matches!(cursor.peek(), TokenKind::LParen) {
                cursor.advance();
                let mut args = Vec::new();
                if !matches!(cursor.peek(), TokenKind::RParen) {
                    loop {
                        args.push(parse_expression(cursor, diags));
                        if matches!(cursor.peek(), TokenKind::Comma) {
                            cursor.advance();
                        } else {
                            break;
                        }
                    }
                }
                expect(cursor, diags, TokenKind::RParen, "expected ')' after call arguments");
                RawExpression::FunctionCall(name, args)
            } else if name == "null" {
                RawExpression::Literal(RawValue::Null)
            } else {
                RawExpression::VarRef(name)
            }
        }
        TokenKind::LParen => {
            cursor.advance();
            let inner = parse_expression(cursor, diags);
            expect(cursor, diags, TokenKind::RParen, "expected ')'");
            inner
        }
        TokenKind::LBracket => {
            cursor.advance();
            let mut items = Vec::new();
            if !matches!(cursor.peek(), TokenKind::RBracket) {
                loop {
                    items.push(parse_expression(cursor, diags));
                    if matches!(cursor.peek(), TokenKind::Comma) {
                        cursor.advance();
                    } else {
                        break;
                    }
                }
            }
            expect(cursor, diags, TokenKind::RBracket, "expected ']'");
            RawExpression::ArrayLit(items)
        }
        TokenKind::LBrace => {
            cursor.advance();
            let mut fields = Vec::new();
            if !matches!(cursor.peek(), TokenKind::RBrace) {
                loop {
                    let key = expect_identifier(cursor, diags);
                    expect(cursor, diags, TokenKind::Colon, "expected ':' in object literal");
                    let value = parse_expression(cursor, diags);
                    fields.push((key, value));
                    if matches!(cursor.peek(), TokenKind::Comma) {
                        cursor.advance();
                    } else {
                        break;
                    }
                }
            }
            expect(cursor, diags, TokenKind::RBrace, "expected '}' to close object literal");
            RawExpression::ObjectLit(fields)
        }
        other => {
            diags.push(Diagnostic::error(cursor.location(), format!("expected an expression, found {other:?}")));
            cursor.advance();
            RawExpression::Literal(RawValue::Null)
        }
    }
}

fn parse_template(cursor: &mut Cursor, diags: &mut Vec<Diagnostic>) -> RawExpression {
    let mut segments = Vec::new();
    loop {
        match cursor.peek().clone() {
            TokenKind::TemplateStringPart(s) => {
                cursor.advance();
                segments.push(TemplateSegment::Literal(s));
            }
            TokenKind::TemplateExprStart => {
                cursor.advance();
                let expr = parse_expression(cursor, diags);
                expect(cursor, diags, TokenKind::TemplateExprEnd, "expected '}' to close template expression");
                segments.push(TemplateSegment::Expr(expr));
            }
            TokenKind::StringLiteral(s) => {
                cursor.advance();
                segments.push(TemplateSegment::Literal(s));
                break;
            }
            _ => break,
        }
    }
    RawExpression::Template(segments)
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
