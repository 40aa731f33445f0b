use kryon_ir::{BinOp, Expression, StringTable, TemplateSegment, UnOp};

use crate::value_print::{quote, render_value};

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

/// Renders an [`Expression`] tree back into source-text form. Every
/// sub-expression that isn't already atomic is fully parenthesized rather
/// than precedence-tracked, which is always round-trip-safe even if it's
/// occasionally more parenthesized than a human would write by hand.
pub fn render_expression(strings: &StringTable, expr: &Expression) -> String {
    match expr {
        Expression::Literal(v) => render_value(strings, v),
        Expression::VarRef(name) => strings.get(*name).unwrap_or("").to_string(),
        Expression::MemberAccess(base, field) => {
            format!("{}.{}", render_expression(strings, base), strings.get(*field).unwrap_or(""))
        }
        Expression::ArrayAccess(base, index) => {
            format!("{}[{}]", render_expression(strings, base), render_expression(strings, index))
        }
        Expression::BinaryOp(op, lhs, rhs) => {
            format!("({} {} {})", render_expression(strings, lhs), binop_symbol(*op), render_expression(strings, rhs))
        }
        Expression::UnaryOp(UnOp::Neg, inner) => format!("-{}", render_expression(strings, inner)),
        Expression::UnaryOp(UnOp::Not, inner) => format!("!{}", render_expression(strings, inner)),
        Expression::Ternary(cond, then, else_) => {
            format!("({} ? {} : {})", render_expression(strings, cond), render_expression(strings, then), render_expression(strings, else_))
        }
        Expression::FunctionCall(name, args) => {
            let parts: Vec<String> = args.iter().map(|a| render_expression(strings, a)).collect();
            format!("{}({})", strings.get(*name).unwrap_or(""), parts.join(", "))
        }
        Expression::Template(segments) => render_template(strings, segments),
        Expression::ArrayLit(items) => {
            let parts: Vec<String> = items.iter().map(|i| render_expression(strings, i)).collect();
            format!("[{}]", parts.join(", "))
        }
        Expression::ObjectLit(fields) => {
            let parts: Vec<String> =
                fields.iter().map(|(k, v)| format!("{}: {}", strings.get(*k).unwrap_or(""), render_expression(strings, v))).collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

fn render_template(strings: &StringTable, segments: &[TemplateSegment]) -> String {
    let mut body = String::new();
    for segment in segments {
        match segment {
            TemplateSegment::Literal(idx) => body.push_str(strings.get(*idx).unwrap_or("")),
            TemplateSegment::Expr(e) => {
                body.push('{');
                body.push_str(&render_expression(strings, e));
                body.push('}');
            }
        }
    }
    quote(&body)
}
