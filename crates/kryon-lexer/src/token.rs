//! Token vocabulary shared by every frontend.

use serde::{Deserialize, Serialize};

/// Length unit suffixes a numeric literal may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Px,
    Pct,
    Em,
    Rem,
    Vw,
    Vh,
    Vmin,
    Vmax,
    None,
}

impl Unit {
    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        Some(match suffix {
            "px" => Unit::Px,
            "%" => Unit::Pct,
            "em" => Unit::Em,
            "rem" => Unit::Rem,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            "vmin" => Unit::Vmin,
            "vmax" => Unit::Vmax,
            "" => Unit::None,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    StringLiteral(String),
    NumberLiteral(f64, Unit),
    BoolLiteral(bool),
    ColorLiteral(u8, u8, u8, u8),
    Identifier(String),

    // Keywords
    Component,
    Style,
    Extends,
    State,
    Const,
    Include,
    Import,
    Export,
    OnMount,
    OnUnmount,
    Theme,

    // Directive sigils (@for, @if, @const_for, @const_if, @var, @watch, @event)
    AtFor,
    AtIf,
    AtElif,
    AtElse,
    AtConstFor,
    AtConstIf,
    AtVar,
    AtWatch,
    AtEvent,

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Semicolon,
    Dot,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Question,
    Eq,

    // Template string pieces: `"prefix ${` ... `} suffix"` is lexed as a
    // sequence of TemplateStringPart/TemplateExprStart/TemplateExprEnd tokens
    // bracketing ordinary expression tokens.
    TemplateStringPart(String),
    TemplateExprStart,
    TemplateExprEnd,

    Dollar,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self { kind, lexeme: lexeme.into(), line, column }
    }
}

pub fn keyword_from_ident(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "component" => TokenKind::Component,
        "style" => TokenKind::Style,
        "extends" => TokenKind::Extends,
        "state" => TokenKind::State,
        "const" => TokenKind::Const,
        "include" => TokenKind::Include,
        "import" => TokenKind::Import,
        "export" => TokenKind::Export,
        "on_mount" => TokenKind::OnMount,
        "on_unmount" => TokenKind::OnUnmount,
        "theme" => TokenKind::Theme,
        "true" => TokenKind::BoolLiteral(true),
        "false" => TokenKind::BoolLiteral(false),
        _ => return None,
    })
}
