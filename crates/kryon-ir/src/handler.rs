use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::string_table::StringIndex;

/// A single resolved statement from an event handler or lifecycle hook,
/// name-resolved but not yet lowered to bytecode. The bytecode compiler
/// consumes these via `Ir::handler_sources` (§4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrStmt {
    Expr(Expression),
    Assign { target_state: StringIndex, value: Expression },
}
