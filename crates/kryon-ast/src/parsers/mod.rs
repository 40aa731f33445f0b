pub mod curly;
pub mod sexpr;

pub use curly::CurlyParser;
pub use sexpr::SexprParser;
