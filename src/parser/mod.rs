//! Parser module
//!
//! Parses S-expressions into syntax nodes. Special-form keywords are `if0`, `fun`,
//! `define`, `set`, `with`, `seqn` and `quote`; every other parenthesized form is an
//! application.

mod ast;
mod sexpr_parser;

pub use ast::{Datum, Expression, Number, Program};
pub use sexpr_parser::SExprParser;

use crate::error::{Error, Result};
use crate::lexer::SExprScanner;

/// Parses a whole program: every top-level form in order
pub fn parse_program(source: &str) -> Result<Program> {
    let mut scanner = SExprScanner::new(source);
    let tokens = scanner.scan_tokens()?;
    let mut parser = SExprParser::new(tokens);
    parser.parse()
}

/// Parses exactly one form
pub fn parse(source: &str) -> Result<Expression> {
    let mut program = parse_program(source)?;
    match program.forms.len() {
        0 => Err(Error::UnexpectedEof),
        1 => Ok(program.forms.remove(0)),
        n => Err(Error::syntax(
            1,
            1,
            format!(
                "Expected a single form, found {}\n\nHelp: Use a program run to evaluate several forms.",
                n
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_form() {
        assert_eq!(parse("42").unwrap(), Expression::int(42));
        assert_eq!(
            parse("\"Hello World!\"").unwrap(),
            Expression::StringLiteral("Hello World!".to_string())
        );
        assert_eq!(
            parse("5.0").unwrap(),
            Expression::Number(Number::Float(5.0))
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_multiple() {
        assert_eq!(parse("   ; only a comment"), Err(Error::UnexpectedEof));
        assert!(matches!(parse("1 2"), Err(Error::SyntaxError { .. })));
    }
}
