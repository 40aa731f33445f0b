use kryon_lexer::Unit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

/// Literal forms the parser can produce directly from source tokens. Arrays
/// and objects are expressed as [`RawExpression::ArrayLit`] /
/// [`RawExpression::ObjectLit`] instead of a literal value, since their
/// elements may themselves be expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Color(u8, u8, u8, u8),
    Unit(f64, Unit),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Literal(String),
    Expr(RawExpression),
}

/// Raw, pre-interning expression tree. Mirrors the IR's `Expression` shape
/// one-to-one (see `kryon-ir::Expression`) but addresses variables, members,
/// and functions by name rather than by string-table index; the IR builder
/// performs the name -> index resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RawExpression {
    Literal(RawValue),
    VarRef(String),
    MemberAccess(Box<RawExpression>, String),
    ArrayAccess(Box<RawExpression>, Box<RawExpression>),
    BinaryOp(BinOp, Box<RawExpression>, Box<RawExpression>),
    UnaryOp(UnOp, Box<RawExpression>),
    Ternary(Box<RawExpression>, Box<RawExpression>, Box<RawExpression>),
    FunctionCall(String, Vec<RawExpression>),
    Template(Vec<TemplateSegment>),
    ArrayLit(Vec<RawExpression>),
    ObjectLit(Vec<(String, RawExpression)>),
}
