//! # Rexp - A Small Lisp with Value-Captured Closures
//!
//! An interpreter for a compact Racket-flavored teaching language: numbers,
//! strings, lists, first-class procedures, conditionals, local binding,
//! sequencing and quoting, on top of a fixed primitive library.
//!
//! The one unusual thing about the language is its scoping. A `fun` captures a
//! **copy** of the environment it was created in, so a closure never sees a later
//! `define` or `set` of an outer variable:
//!
//! ```rust
//! use rexp::run;
//!
//! # fn main() -> rexp::Result<()> {
//! let result = run("(with (x 3) (with (f (fun (y) (+ x y))) (with (x 5) (f 4))))")?;
//! assert_eq!(result, "7");
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rexp::{Evaluator, Parser, Scanner, Environment, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = r#"
//!     (define total (foldl + 0 (build-list 5 add1)))
//!     total
//! "#;
//!
//! // Tokenize (scan)
//! let mut scanner = Scanner::new(code);
//! let tokens = scanner.scan_tokens()?;
//!
//! // Parse into syntax nodes
//! let mut parser = Parser::new(tokens);
//! let program = parser.parse()?;
//!
//! // Evaluate against one top-level environment
//! let mut evaluator = Evaluator::new();
//! let mut env = Environment::top_level();
//! let mut last = Value::Void;
//! for form in &program.forms {
//!     last = evaluator.eval(form, &mut env)?;
//! }
//!
//! assert_eq!(last, Value::Int(15));
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! ### Special Forms
//!
//! - `(if0 c t e)` - evaluates exactly one branch depending on the truthiness of `c`
//! - `(fun (x y) body)` - procedure closing over a snapshot of the current scope
//! - `(define x v)` / `(set x v)` - bind in the current scope
//! - `(with (x v) body)` - local binding
//! - `(seqn a b)` - evaluate `a`, then `b`
//! - `(quote d ...)` / `'d` - literal data; symbols become strings
//!
//! ### Built-in Procedures
//!
//! - **Arithmetic**: `+ - * / add1 sub1 modulo odd? even?`
//! - **Comparison**: `< > <= >= equal?`, **Logic**: `and or not`
//! - **Lists**: `list cons empty? first second third rest reverse length list-ref build-list`
//! - **Characters**: `explode list->string integer->char`
//! - **Higher-order**: `map filter foldl foldr ormap andmap`
//! - **Effects**: `display begin read error check-expect`
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → Syntax Nodes → Evaluator → Value
//! ```
//!
//! - [`Scanner`] - Tokenizes source code
//! - [`Parser`] - Builds syntax nodes from tokens
//! - [`Evaluator`] - Walks syntax nodes and applies procedures
//! - [`Environment`] - One flat scope frame, copied on capture
//! - [`PrimitiveRegistry`] - The host procedure table
//! - [`Session`] - An evaluator plus an accumulating top-level environment
//!
//! ## Error Handling
//!
//! ```rust
//! # use rexp::{run, Error};
//! match run("(/ 10 0)") {
//!     Ok(_) => panic!("Should have failed"),
//!     Err(e) => assert_eq!(e, Error::DivisionByZero),
//! }
//! ```

/// Version of the rexp interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod parser;
pub mod primitives;
pub mod runtime;

// Re-export main types
pub use error::{Error, ErrorSeverity, Result};
pub use lexer::{SExprScanner, Token, TokenKind};
pub use parser::{parse, parse_program, Datum, Expression, Number, Program, SExprParser};
pub use primitives::{Builtin, CallContext, Primitive, PrimitiveRegistry};
pub use runtime::{
    run, run_forms, run_program, Environment, EvalConfig, LispEvaluator, Session, Value,
};

/// Type alias for the S-expression scanner (lexer).
/// Converts raw source text into tokens for the parser.
pub type Scanner = SExprScanner;

/// Type alias for the S-expression parser.
/// Converts tokens into syntax nodes.
pub type Parser = SExprParser;

/// Type alias for the evaluator.
/// Evaluates syntax nodes against an environment and produces runtime values.
pub type Evaluator = LispEvaluator;
