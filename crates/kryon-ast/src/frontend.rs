use crate::diagnostic::Diagnostic;
use crate::node::Root;
use kryon_lexer::Token;

/// Contract every concrete frontend (curly-brace DSL, S-expression dialect,
/// …) must satisfy so the IR builder can treat them interchangeably. Parsers
/// are order-tolerant inside a body and always recover: a malformed node
/// becomes a diagnostic plus a placeholder, never a hard abort.
pub trait FrontendParser {
    /// Short, stable name used in error messages and `.kir` metadata.
    fn name(&self) -> &'static str;

    fn parse(&self, tokens: Vec<Token>, file: &str) -> (Root, Vec<Diagnostic>);
}
