//! Source text to token stream, the leaf stage of the Kryon compilation
//! pipeline. Tokens live only for the duration of a single parse call; the
//! lexer itself holds no state across calls to [`lex`].

mod error;
mod lexer;
mod token;

pub use error::LexicalError;
pub use lexer::lex;
pub use token::{keyword_from_ident, Token, TokenKind, Unit};
