use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

/// All possible token types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Integer(i64),
    /// Floating-point literal
    Float(f64),
    /// String literal (escapes already resolved)
    String(String),

    /// Any other atom: variable names, operators, `#true`, `list->string`, ...
    Identifier(String),

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `'` reader shorthand for quote
    Quote,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Human-readable name used in syntax error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LeftParen => "`(`".to_string(),
            TokenKind::RightParen => "`)`".to_string(),
            TokenKind::LeftBracket => "`[`".to_string(),
            TokenKind::RightBracket => "`]`".to_string(),
            TokenKind::Quote => "`'`".to_string(),
            TokenKind::Integer(_) => "integer".to_string(),
            TokenKind::Float(_) => "float".to_string(),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Identifier(name) => format!("identifier `{}`", name),
            TokenKind::Eof => "end of file".to_string(),
        }
    }

    /// True for `(` and `[`
    pub fn is_open(&self) -> bool {
        matches!(self, TokenKind::LeftParen | TokenKind::LeftBracket)
    }

    /// True for `)` and `]`
    pub fn is_close(&self) -> bool {
        matches!(self, TokenKind::RightParen | TokenKind::RightBracket)
    }
}
