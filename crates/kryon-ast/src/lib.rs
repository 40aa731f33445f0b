//! Raw, pre-resolution abstract syntax tree and the frontends that produce
//! it. Every concrete frontend implements [`FrontendParser`] and converges on
//! the same [`Root`]; name resolution, constant folding, and everything else
//! that needs whole-program context happens downstream in the IR builder.

mod cursor;
mod diagnostic;
mod expr;
mod frontend;
mod location;
mod node;
pub mod parsers;

pub use cursor::Cursor;
pub use diagnostic::{Diagnostic, Severity};
pub use expr::{BinOp, RawExpression, RawValue, TemplateSegment, UnOp};
pub use frontend::FrontendParser;
pub use location::SourceLocation;
pub use node::{
    ComponentDef, ComponentParam, Directive, Element, Event, EventKind, FunctionDef, HandlerBody,
    IfBranch, Node, Property, Root, StateVar, Stmt, StyleDef, ThemeDef, ThemeVariable,
};
pub use parsers::{CurlyParser, SexprParser};
