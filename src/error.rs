//! Error types for the rexp interpreter

use thiserror::Error;

/// Interpreter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Parse errors
    /// Syntax error encountered while scanning or parsing
    ///
    /// **Triggered by:** unmatched parentheses, malformed special forms, bad escapes
    /// **Example:** `(if0 (> x 10) 1)` (missing else branch)
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// Input ended in the middle of a form
    #[error("Unexpected end of file")]
    UnexpectedEof,

    // Runtime errors
    /// Reference to an identifier with no binding in the current frame
    ///
    /// **Triggered by:** using a name before it is defined, or a closure parameter
    /// that received no argument
    /// **Example:** `(with (f (fun (y) (+ x y))) (f 3))`
    #[error("Unbound variable: {name}")]
    UnboundVariable {
        /// Identifier that failed to resolve
        name: String,
    },

    /// Type mismatch inside a primitive
    ///
    /// **Example:** `(+ "hello" 5)`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Wrong number or shape of arguments passed to a primitive
    #[error("Invalid arguments for {primitive}: {reason}")]
    InvalidArguments {
        /// Primitive name
        primitive: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer arithmetic left the 64-bit range
    #[error("Arithmetic overflow in {op}")]
    ArithmeticOverflow {
        /// Operation name
        op: String,
    },

    /// List index out of bounds
    #[error("Index out of bounds: {index} for list of length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// List length
        length: usize,
    },

    /// Operation on an empty list that requires elements
    #[error("Empty list for operation: {operation}")]
    EmptyCollection {
        /// Operation name
        operation: String,
    },

    /// Attempt to apply a value that is not a procedure
    #[error("Value is not callable: {type_name}")]
    NotCallable {
        /// Type of the non-callable value
        type_name: String,
    },

    /// Raised by the `error` primitive
    #[error("User error: {0}")]
    UserError(String),

    /// `check-expect` saw a value different from the expected one
    #[error("check-expect failed: actual {actual}, expected {expected}")]
    CheckFailed {
        /// Printed form of the actual value
        actual: String,
        /// Printed form of the expected value
        expected: String,
    },

    /// Reading from or writing to the interpreter's I/O sinks failed
    #[error("I/O error: {0}")]
    Io(String),

    // Resource errors
    /// Evaluation nested deeper than the configured limit
    #[error("Stack exhausted (max depth: {limit})")]
    StackExhausted {
        /// Configured maximum depth
        limit: usize,
    },

    // Internal errors
    /// The evaluator received a syntax node that breaks the parser contract
    #[error("Internal error: malformed syntax node: {message}")]
    MalformedNode {
        /// What was wrong with the node
        message: String,
    },
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// A bug in the user's program (or source text)
    User,
    /// A resource limit was hit
    Resource,
    /// A collaborator broke its contract with the evaluator
    Internal,
}

impl Error {
    /// Create a syntax error at a position
    pub fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Error::SyntaxError {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create an unbound-variable error
    pub fn unbound(name: impl Into<String>) -> Self {
        Error::UnboundVariable { name: name.into() }
    }

    /// Create an invalid-arguments error for a primitive
    pub fn invalid_args(primitive: &str, reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            primitive: primitive.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::MalformedNode { .. } => ErrorSeverity::Internal,
            Error::StackExhausted { .. } | Error::Io(_) => ErrorSeverity::Resource,
            _ => ErrorSeverity::User,
        }
    }

    /// True when the error signals a contract breach rather than a user bug
    pub fn is_internal(&self) -> bool {
        self.classify() == ErrorSeverity::Internal
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for rexp operations
pub type Result<T> = std::result::Result<T, Error>;
