use serde::{Deserialize, Serialize};

pub use kryon_ast::{BinOp, UnOp};

use crate::string_table::StringIndex;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    Literal(StringIndex),
    Expr(Expression),
}

/// The IR's pure expression tree — resolved names, no side effects. Mirrors
/// `kryon_ast::RawExpression` one-to-one but addresses variables and
/// functions by string-table index rather than by name (§3 DATA MODEL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Value),
    VarRef(StringIndex),
    MemberAccess(Box<Expression>, StringIndex),
    ArrayAccess(Box<Expression>, Box<Expression>),
    BinaryOp(BinOp, Box<Expression>, Box<Expression>),
    UnaryOp(UnOp, Box<Expression>),
    Ternary(Box<Expression>, Box<Expression>, Box<Expression>),
    FunctionCall(StringIndex, Vec<Expression>),
    Template(Vec<TemplateSegment>),
    ArrayLit(Vec<Expression>),
    ObjectLit(Vec<(StringIndex, Expression)>),
}

impl Expression {
    /// Folds a literal expression tree into a concrete [`Value`], for the
    /// compile-time-evaluation stage (`const_for`/`const_if`/`const`).
    /// Returns `None` for anything that isn't a closed-form literal —
    /// variable references and function calls require runtime state.
    pub fn fold_const(&self) -> Option<Value> {
        match self {
            Expression::Literal(v) => Some(v.clone()),
            Expression::ArrayLit(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.fold_const()?);
                }
                Some(Value::Array(out))
            }
            Expression::BinaryOp(op, lhs, rhs) => {
                let lhs = lhs.fold_const()?;
                let rhs = rhs.fold_const()?;
                fold_binop(*op, &lhs, &rhs)
            }
            Expression::UnaryOp(UnOp::Neg, inner) => match inner.fold_const()? {
                Value::Int(i) => Some(Value::Int(-i)),
                Value::Float(f) => Some(Value::Float(-f)),
                _ => None,
            },
            Expression::UnaryOp(UnOp::Not, inner) => match inner.fold_const()? {
                Value::Bool(b) => Some(Value::Bool(!b)),
                _ => None,
            },
            Expression::Ternary(cond, then, else_) => match cond.fold_const()? {
                Value::Bool(true) => then.fold_const(),
                Value::Bool(false) => else_.fold_const(),
                _ => None,
            },
            _ => None,
        }
    }
}

fn fold_binop(op: BinOp, lhs: &Value, rhs: &Value) -> Option<Value> {
    use BinOp::*;
    match (op, lhs, rhs) {
        (Add, Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_add(*b))),
        (Add, a, b) => Some(Value::Float(a.as_numeric_f64()? + b.as_numeric_f64()?)),
        (Sub, Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_sub(*b))),
        (Sub, a, b) => Some(Value::Float(a.as_numeric_f64()? - b.as_numeric_f64()?)),
        (Mul, Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_mul(*b))),
        (Mul, a, b) => Some(Value::Float(a.as_numeric_f64()? * b.as_numeric_f64()?)),
        (Div, a, b) => Some(Value::Float(a.as_numeric_f64()? / b.as_numeric_f64()?)),
        (Eq, a, b) => Some(Value::Bool(a == b)),
        (Ne, a, b) => Some(Value::Bool(a != b)),
        (Lt, a, b) => Some(Value::Bool(a.as_numeric_f64()? < b.as_numeric_f64()?)),
        (Gt, a, b) => Some(Value::Bool(a.as_numeric_f64()? > b.as_numeric_f64()?)),
        (Le, a, b) => Some(Value::Bool(a.as_numeric_f64()? <= b.as_numeric_f64()?)),
        (Ge, a, b) => Some(Value::Bool(a.as_numeric_f64()? >= b.as_numeric_f64()?)),
        (And, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(*a && *b)),
        (Or, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(*a || *b)),
        _ => None,
    }
}
