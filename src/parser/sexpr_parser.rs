use std::sync::Arc;

use super::ast::{Datum, Expression, Number, Program};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};
use crate::runtime::stack::ensure_sufficient_stack;

/// S-expression parser producing syntax nodes
pub struct SExprParser {
    tokens: Vec<Token>,
    current: usize,
}

impl SExprParser {
    /// Creates a new S-expression parser
    pub fn new(tokens: Vec<Token>) -> Self {
        SExprParser { tokens, current: 0 }
    }

    /// Parses every top-level form
    pub fn parse(&mut self) -> Result<Program> {
        let mut forms = Vec::new();

        while !self.is_at_end() {
            forms.push(self.parse_expression()?);
        }

        Ok(Program { forms })
    }

    /// Parse an expression (atom, quoted datum or parenthesized form)
    fn parse_expression(&mut self) -> Result<Expression> {
        match self.peek().kind.clone() {
            TokenKind::LeftParen | TokenKind::LeftBracket => {
                ensure_sufficient_stack(|| self.parse_list())
            }
            TokenKind::Quote => {
                self.advance();
                Ok(Expression::Quote(ensure_sufficient_stack(|| self.parse_datum())?))
            }
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expression::Number(Number::Int(n)))
            }
            TokenKind::Float(x) => {
                self.advance();
                Ok(Expression::Number(Number::Float(x)))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expression::StringLiteral(s))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expression::Identifier(name))
            }
            TokenKind::Eof => Err(Error::UnexpectedEof),
            kind => Err(self.syntax_error(format!(
                "Unexpected {} in expression.\n\n\
                 Help: Check that every closing delimiter has a matching opening one.",
                kind.describe()
            ))),
        }
    }

    /// Parse a parenthesized form: a special form or an application
    fn parse_list(&mut self) -> Result<Expression> {
        let open = self.advance();
        let closer = Self::closer_for(&open.kind);

        if self.peek().kind.is_close() {
            return Err(Error::syntax(
                open.line,
                open.column,
                "Empty form `()`.\n\nHelp: Use `empty` for the empty list.",
            ));
        }

        let keyword = match &self.peek().kind {
            TokenKind::Identifier(name) => Some(name.clone()),
            _ => None,
        };

        match keyword.as_deref() {
            Some("if0") => self.parse_if0(&closer),
            Some("fun") => self.parse_fun(&closer),
            Some("define") => self.parse_binding_form(&closer, true),
            Some("set") => self.parse_binding_form(&closer, false),
            Some("with") => self.parse_with(&closer),
            Some("seqn") => self.parse_seqn(&closer),
            Some("quote") => self.parse_quote_form(&closer),
            _ => self.parse_application(&closer),
        }
    }

    /// Parse (if0 condition then-expr else-expr)
    fn parse_if0(&mut self, closer: &TokenKind) -> Result<Expression> {
        self.advance(); // consume 'if0'

        let condition = Box::new(self.parse_operand("condition", "(if0 cond then else)")?);
        let then_branch = Box::new(self.parse_operand("then branch", "(if0 cond then else)")?);
        let else_branch = Box::new(self.parse_operand("else branch", "(if0 cond then else)")?);

        self.consume_close(closer)?;

        Ok(Expression::If0 {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// Parse (fun (params...) body)
    fn parse_fun(&mut self, closer: &TokenKind) -> Result<Expression> {
        self.advance(); // consume 'fun'

        if !self.peek().kind.is_open() {
            return Err(self.expected_error(
                "parameter list",
                Some("Syntax: (fun (param1 param2 ...) body)\nExample: (fun (x y) (+ x y))"),
            ));
        }
        let params_closer = Self::closer_for(&self.advance().kind);

        let mut params = Vec::new();
        while !self.peek().kind.is_close() {
            params.push(self.expect_identifier(
                "parameter name",
                "Function parameters must be plain identifiers.",
            )?);
        }
        self.consume_close(&params_closer)?;

        let body = Arc::new(self.parse_operand("function body", "(fun (params...) body)")?);
        self.consume_close(closer)?;

        Ok(Expression::Fun { params, body })
    }

    /// Parse (define name value) or (set name value)
    fn parse_binding_form(&mut self, closer: &TokenKind, is_define: bool) -> Result<Expression> {
        let keyword = if is_define { "define" } else { "set" };
        self.advance(); // consume keyword

        let name = self.expect_identifier(
            "identifier (variable name)",
            &format!(
                "Syntax: ({} variable-name value)\nExample: ({} count 0)",
                keyword, keyword
            ),
        )?;
        let value = Box::new(self.parse_operand("value", &format!("({} name value)", keyword))?);
        self.consume_close(closer)?;

        Ok(if is_define {
            Expression::Define { name, value }
        } else {
            Expression::Set { name, value }
        })
    }

    /// Parse (with (name bound) body)
    fn parse_with(&mut self, closer: &TokenKind) -> Result<Expression> {
        self.advance(); // consume 'with'

        if !self.peek().kind.is_open() {
            return Err(self.expected_error(
                "binding `(name value)`",
                Some("Syntax: (with (name value) body)\nExample: (with (x 3) (+ x 1))"),
            ));
        }
        let binding_closer = Self::closer_for(&self.advance().kind);
        let name = self.expect_identifier(
            "identifier (bound name)",
            "Syntax: (with (name value) body)",
        )?;
        let bound = Box::new(self.parse_operand("bound value", "(with (name value) body)")?);
        self.consume_close(&binding_closer)?;

        let body = Box::new(self.parse_operand("body", "(with (name value) body)")?);
        self.consume_close(closer)?;

        Ok(Expression::With { name, bound, body })
    }

    /// Parse (seqn first second)
    fn parse_seqn(&mut self, closer: &TokenKind) -> Result<Expression> {
        self.advance(); // consume 'seqn'

        let first = Box::new(self.parse_operand("first expression", "(seqn first second)")?);
        let second = Box::new(self.parse_operand("second expression", "(seqn first second)")?);
        self.consume_close(closer)?;

        Ok(Expression::Seqn { first, second })
    }

    /// Parse (quote datum...) - quotes the whole sequence of datums
    fn parse_quote_form(&mut self, closer: &TokenKind) -> Result<Expression> {
        self.advance(); // consume 'quote'

        let mut datums = Vec::new();
        while !self.peek().kind.is_close() {
            if self.is_at_end() {
                return Err(Error::UnexpectedEof);
            }
            datums.push(self.parse_datum()?);
        }
        self.consume_close(closer)?;

        Ok(Expression::Quote(Datum::List(datums)))
    }

    /// Parse (operator operands...)
    fn parse_application(&mut self, closer: &TokenKind) -> Result<Expression> {
        let operator = Box::new(self.parse_expression()?);

        let mut operands = Vec::new();
        while !self.peek().kind.is_close() {
            if self.is_at_end() {
                return Err(Error::UnexpectedEof);
            }
            operands.push(self.parse_expression()?);
        }
        self.consume_close(closer)?;

        Ok(Expression::Application { operator, operands })
    }

    /// Parse an unevaluated datum
    fn parse_datum(&mut self) -> Result<Datum> {
        let token = self.advance();
        match token.kind {
            TokenKind::Integer(n) => Ok(Datum::Int(n)),
            TokenKind::Float(x) => Ok(Datum::Float(x)),
            TokenKind::String(s) => Ok(Datum::Str(s)),
            TokenKind::Identifier(name) => Ok(Datum::Symbol(name)),
            TokenKind::Quote => {
                let inner = ensure_sufficient_stack(|| self.parse_datum())?;
                Ok(Datum::List(vec![Datum::Symbol("quote".to_string()), inner]))
            }
            TokenKind::LeftParen | TokenKind::LeftBracket => {
                let closer = Self::closer_for(&token.kind);
                let mut items = Vec::new();
                while !self.peek().kind.is_close() {
                    if self.is_at_end() {
                        return Err(Error::UnexpectedEof);
                    }
                    items.push(ensure_sufficient_stack(|| self.parse_datum())?);
                }
                self.consume_close(&closer)?;
                Ok(Datum::List(items))
            }
            TokenKind::Eof => Err(Error::UnexpectedEof),
            kind => Err(Error::syntax(
                token.line,
                token.column,
                format!("Unexpected {} in quoted datum", kind.describe()),
            )),
        }
    }

    /// Parse a required sub-expression of a special form
    fn parse_operand(&mut self, what: &str, syntax: &str) -> Result<Expression> {
        if self.peek().kind.is_close() {
            return Err(self.expected_error(what, Some(&format!("Syntax: {}", syntax))));
        }
        self.parse_expression()
    }

    // Helper methods

    fn closer_for(open: &TokenKind) -> TokenKind {
        match open {
            TokenKind::LeftBracket => TokenKind::RightBracket,
            _ => TokenKind::RightParen,
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
            self.tokens[self.current - 1].clone()
        } else {
            self.tokens[self.current].clone()
        }
    }

    fn expect_identifier(&mut self, what: &str, hint: &str) -> Result<String> {
        if let TokenKind::Identifier(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.expected_error(what, Some(hint)))
        }
    }

    fn consume_close(&mut self, closer: &TokenKind) -> Result<()> {
        let token = self.peek();
        if &token.kind == closer {
            self.advance();
            return Ok(());
        }
        if token.kind == TokenKind::Eof {
            return Err(Error::UnexpectedEof);
        }

        let hint = if token.kind.is_close() {
            "Opening and closing delimiters must match: `(` with `)`, `[` with `]`."
        } else {
            "This form has too many parts, or an earlier `)` is missing."
        };
        Err(Error::syntax(
            token.line,
            token.column,
            format!(
                "Expected {}, found {}\n\nHelp: {}",
                closer.describe(),
                token.kind.describe(),
                hint
            ),
        ))
    }

    /// Helper to create a syntax error at current position
    fn syntax_error(&self, message: impl Into<String>) -> Error {
        let token = self.peek();
        Error::syntax(token.line, token.column, message)
    }

    /// Helper to create a syntax error with expected/got pattern
    fn expected_error(&self, expected: &str, hint: Option<&str>) -> Error {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return Error::UnexpectedEof;
        }

        let mut message = format!("Expected {}, found {}", expected, token.kind.describe());
        if let Some(hint) = hint {
            message.push_str("\n\nHelp: ");
            message.push_str(hint);
        }

        Error::syntax(token.line, token.column, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::SExprScanner;

    fn parse_str(source: &str) -> Result<Program> {
        let mut scanner = SExprScanner::new(source);
        let tokens = scanner.scan_tokens()?;
        let mut parser = SExprParser::new(tokens);
        parser.parse()
    }

    fn parse_one(source: &str) -> Expression {
        let mut program = parse_str(source).unwrap();
        assert_eq!(program.forms.len(), 1);
        program.forms.remove(0)
    }

    #[test]
    fn test_simple_application() {
        let expr = parse_one("(+ 1 2)");
        assert_eq!(
            expr,
            Expression::call(
                Expression::ident("+"),
                vec![Expression::int(1), Expression::int(2)]
            )
        );
    }

    #[test]
    fn test_nested_fun_application() {
        let expr = parse_one("((fun (x) (func (+ 1 1) 5)) 2)");
        match &expr {
            Expression::Application { operator, operands } => {
                assert!(matches!(**operator, Expression::Fun { ref params, .. } if params == &["x"]));
                assert_eq!(operands, &vec![Expression::int(2)]);
            }
            other => panic!("expected application, got {:?}", other),
        }
    }

    #[test]
    fn test_special_forms() {
        assert!(matches!(parse_one("(if0 1 2 3)"), Expression::If0 { .. }));
        assert!(matches!(parse_one("(define x 5)"), Expression::Define { .. }));
        assert!(matches!(parse_one("(set x 5)"), Expression::Set { .. }));
        assert!(matches!(parse_one("(seqn 1 2)"), Expression::Seqn { .. }));
        match &parse_one("(with (x 3) x)") {
            Expression::With { name, bound, body } => {
                assert_eq!(name, "x");
                assert_eq!(**bound, Expression::int(3));
                assert_eq!(**body, Expression::ident("x"));
            }
            other => panic!("expected with, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_forms() {
        assert_eq!(
            parse_one("(quote 1 2 a)"),
            Expression::Quote(Datum::List(vec![
                Datum::Int(1),
                Datum::Int(2),
                Datum::Symbol("a".to_string())
            ]))
        );
        assert_eq!(
            parse_one("(quote (quote 1))"),
            Expression::Quote(Datum::List(vec![Datum::List(vec![
                Datum::Symbol("quote".to_string()),
                Datum::Int(1)
            ])]))
        );
        assert_eq!(
            parse_one("'x"),
            Expression::Quote(Datum::Symbol("x".to_string()))
        );
    }

    #[test]
    fn test_brackets_are_lists() {
        assert!(matches!(
            parse_one("(with [x 3] x)"),
            Expression::With { .. }
        ));
    }

    #[test]
    fn test_mismatched_delimiters() {
        assert!(matches!(
            parse_str("(+ 1 2]"),
            Err(Error::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_malformed_special_forms() {
        assert!(matches!(
            parse_str("(if0 1 2)"),
            Err(Error::SyntaxError { .. })
        ));
        assert!(matches!(
            parse_str("(define 5 5)"),
            Err(Error::SyntaxError { .. })
        ));
        assert!(matches!(
            parse_str("(with x 3)"),
            Err(Error::SyntaxError { .. })
        ));
        assert!(matches!(
            parse_str("(seqn 1 2 3)"),
            Err(Error::SyntaxError { .. })
        ));
        assert!(matches!(parse_str("()"), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_unexpected_eof() {
        assert_eq!(parse_str("(+ 1"), Err(Error::UnexpectedEof));
        assert_eq!(parse_str("(fun (x)"), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_multiple_forms() {
        let program = parse_str("(define a 5) ; five\n(+ a 1) #| block |# a").unwrap();
        assert_eq!(program.forms.len(), 3);
    }

    #[test]
    fn test_deep_nesting_parses() {
        let depth = 50_000;
        let source = format!("{}1{}", "(add1 ".repeat(depth), ")".repeat(depth));
        let program = parse_str(&source).unwrap();
        assert_eq!(program.forms.len(), 1);

        let quoted = format!("'{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_str(&quoted).is_ok());
        assert_eq!(parse_str(&"(add1 ".repeat(depth)), Err(Error::UnexpectedEof));
    }
}
