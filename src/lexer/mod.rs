//! Lexical analysis
//!
//! Converts source text into a stream of tokens, dropping `;` line comments and
//! `#| ... |#` block comments on the way.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::SExprScanner;
pub use token::{Token, TokenKind};
