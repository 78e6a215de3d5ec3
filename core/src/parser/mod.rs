pub mod error;
pub mod parser;

// Re-export the parser and rule enum for external use
pub use error::{ParseError, ParseErrorKind};
pub use parser::ExpressionParser;
pub use parser::Rule;
pub use parser::parse;

#[cfg(test)]
mod parse_test;
