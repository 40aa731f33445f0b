//! The canonical intermediate representation (§3): string interning,
//! property categorization (§4.4), and the [`builder::build`] entry point
//! that turns any frontend's [`kryon_ast::Root`] into an [`Ir`].

mod builder;
mod category;
mod component;
mod element;
mod error;
mod expression;
mod function;
mod handler;
mod instruction;
mod ir;
mod state;
mod string_table;
mod style;
mod substitute;
mod value;

pub use builder::{build, BuildOptions};
pub use category::{default_closure_for, property_category_by_name, CategoryClosure, PropertyCategory, PropertyId};
pub use component::{ComponentDef, ComponentParameter};
pub use element::{Element, EventBinding, EventKind, ExpansionInfo, NodeId};
pub use error::{IrDiagnostic, IrErrorKind, Severity};
pub use expression::{BinOp, Expression, TemplateSegment, UnOp};
pub use function::{Function, HostFunctionDecl, EMBEDDED_BYTECODE_LANGUAGE};
pub use handler::IrStmt;
pub use instruction::Instruction;
pub use ir::{Ir, WatchBinding};
pub use state::{StateCell, StateType};
pub use string_table::{StringIndex, StringTable};
pub use style::{Style, ThemeValueType, ThemeVariable};
pub use value::{parse_hex_color, Unit, Value, ValueKind};
