use serde::{Deserialize, Serialize};

use crate::expr::RawExpression;
use crate::location::SourceLocation;

/// One effectful statement inside an event handler body. Assignment to a
/// state variable is the only effectful form the language allows (§4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(RawExpression),
    Assign { target: String, value: RawExpression },
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandlerBody {
    Inline(Vec<Stmt>),
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Click,
    Change,
    Hover,
    Mount,
    Unmount,
    KeyDown,
    KeyUp,
    Focus,
    Blur,
    Submit,
}

impl EventKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "click" | "onClick" => EventKind::Click,
            "change" | "onChange" => EventKind::Change,
            "hover" | "onHover" => EventKind::Hover,
            "mount" | "onMount" => EventKind::Mount,
            "unmount" | "onUnmount" => EventKind::Unmount,
            "keydown" | "onKeyDown" => EventKind::KeyDown,
            "keyup" | "onKeyUp" => EventKind::KeyUp,
            "focus" | "onFocus" => EventKind::Focus,
            "blur" | "onBlur" => EventKind::Blur,
            "submit" | "onSubmit" => EventKind::Submit,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: RawExpression,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub handler: HandlerBody,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub type_name: String,
    pub id: Option<String>,
    pub style_ref: Option<String>,
    pub properties: Vec<Property>,
    pub events: Vec<Event>,
    pub children: Vec<Node>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateVar {
    pub name: String,
    pub type_hint: Option<String>,
    pub initial: RawExpression,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub language: String,
    pub name: String,
    pub params: Vec<String>,
    pub code: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentParam {
    pub name: String,
    pub default: Option<RawExpression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    pub params: Vec<ComponentParam>,
    pub parent: Option<String>,
    pub state_vars: Vec<StateVar>,
    pub functions: Vec<FunctionDef>,
    pub on_mount: Option<Vec<Stmt>>,
    pub on_unmount: Option<Vec<Stmt>>,
    pub body: Vec<Node>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleDef {
    pub name: String,
    pub parent: Option<String>,
    pub properties: Vec<Property>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeVariable {
    pub name: String,
    pub type_hint: Option<String>,
    pub initial: RawExpression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDef {
    pub group: String,
    pub variables: Vec<ThemeVariable>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub cond: RawExpression,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Variables(Vec<(String, RawExpression)>),
    Const(Vec<(String, RawExpression)>),
    ForDirective {
        index: Option<String>,
        var: String,
        iterable: RawExpression,
        body: Vec<Node>,
        is_const: bool,
    },
    IfDirective {
        is_const: bool,
        then: IfBranch,
        elif_pairs: Vec<IfBranch>,
        else_: Option<Vec<Node>>,
    },
    Include { path: String, expanded: Option<Box<Root>> },
    Import { path: String, symbols: Vec<String> },
    Export { symbols: Vec<String> },
    FunctionDef(FunctionDef),
    StateDef(StateVar),
    Watch { var: String, handler: HandlerBody },
    OnMount(Vec<Stmt>),
    OnUnmount(Vec<Stmt>),
    EventDirective(Event),
    /// An unrecognized directive kept as a recoverable placeholder; the
    /// attached diagnostic index lets callers find the matching message.
    Unknown { name: String, location: SourceLocation },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    ComponentDef(ComponentDef),
    StyleDef(StyleDef),
    ThemeDef(ThemeDef),
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub directives: Vec<Directive>,
    pub body: Vec<Node>,
}
