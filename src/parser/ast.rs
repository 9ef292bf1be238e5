use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::runtime::stack::ensure_sufficient_stack;

/// Complete program: the top-level forms in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Program {
    /// Top-level forms
    pub forms: Vec<Expression>,
}

/// Numeric literal, kept exact when the source spelled an integer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    /// Integer literal
    Int(i64),
    /// Floating-point literal
    Float(f64),
}

/// Syntax nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Numeric literal
    Number(Number),
    /// String literal
    StringLiteral(String),
    /// Variable reference (also `#true` / `#false`, which are pre-bound)
    Identifier(String),
    /// Unevaluated structure
    Quote(Datum),

    /// `(if0 condition then else)`
    If0 {
        /// Condition expression
        condition: Box<Expression>,
        /// Taken when the condition is truthy
        then_branch: Box<Expression>,
        /// Taken otherwise
        else_branch: Box<Expression>,
    },

    /// `(fun (params...) body)`
    Fun {
        /// Parameter names in order
        params: Vec<String>,
        /// Function body, shared with every closure built from this node
        body: Arc<Expression>,
    },

    /// `(define name value)`
    Define {
        /// Name to bind
        name: String,
        /// Value expression
        value: Box<Expression>,
    },

    /// `(set name value)` - same rule as define
    Set {
        /// Name to bind
        name: String,
        /// Value expression
        value: Box<Expression>,
    },

    /// `(with (name bound) body)`
    With {
        /// Locally bound name
        name: String,
        /// Expression evaluated in the new scope to produce the binding
        bound: Box<Expression>,
        /// Body evaluated in the new scope
        body: Box<Expression>,
    },

    /// `(seqn first second)`
    Seqn {
        /// Evaluated for effect
        first: Box<Expression>,
        /// Evaluated for the result
        second: Box<Expression>,
    },

    /// `(operator operands...)`
    Application {
        /// Expression producing the procedure
        operator: Box<Expression>,
        /// Argument expressions, evaluated left to right
        operands: Vec<Expression>,
    },
}

/// Quoted structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    /// Integer atom
    Int(i64),
    /// Float atom
    Float(f64),
    /// String literal
    Str(String),
    /// Bare word
    Symbol(String),
    /// Parenthesized sub-structure
    List(Vec<Datum>),
}

impl Expression {
    /// Integer literal shorthand
    pub fn int(n: i64) -> Self {
        Expression::Number(Number::Int(n))
    }

    /// Identifier shorthand
    pub fn ident(name: &str) -> Self {
        Expression::Identifier(name.to_string())
    }

    /// Application shorthand
    pub fn call(operator: Expression, operands: Vec<Expression>) -> Self {
        Expression::Application {
            operator: Box::new(operator),
            operands,
        }
    }
}

impl Expression {
    /// Moves every owned sub-expression into `out`, leaving placeholders behind
    fn take_children(&mut self, out: &mut Vec<Expression>) {
        fn take(expr: &mut Expression) -> Expression {
            mem::replace(expr, Expression::int(0))
        }

        match self {
            Expression::Number(_)
            | Expression::StringLiteral(_)
            | Expression::Identifier(_)
            | Expression::Quote(_) => {}
            Expression::If0 {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push(take(condition));
                out.push(take(then_branch));
                out.push(take(else_branch));
            }
            Expression::Fun { body, .. } => {
                // bodies still shared with live closures are left alone
                if let Some(body) = Arc::get_mut(body) {
                    out.push(take(body));
                }
            }
            Expression::Define { value, .. } | Expression::Set { value, .. } => {
                out.push(take(value));
            }
            Expression::With { bound, body, .. } => {
                out.push(take(bound));
                out.push(take(body));
            }
            Expression::Seqn { first, second } => {
                out.push(take(first));
                out.push(take(second));
            }
            Expression::Application { operator, operands } => {
                out.push(take(operator));
                out.append(operands);
            }
        }
    }
}

// Deeply nested trees are torn down with a worklist instead of recursive drop glue.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl Drop for Datum {
    fn drop(&mut self) {
        let mut pending = match self {
            Datum::List(items) => mem::take(items),
            _ => return,
        };
        while let Some(mut datum) = pending.pop() {
            if let Datum::List(items) = &mut datum {
                pending.append(items);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Datum::Int(n) => write!(f, "{}", n),
            Datum::Float(x) => write!(f, "{:?}", x),
            Datum::Str(s) => write!(f, "{:?}", s),
            Datum::Symbol(s) => write!(f, "{}", s),
            Datum::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        })
    }
}

/// Renders the node back as source text
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Expression::Number(n) => write!(f, "{}", n),
            Expression::StringLiteral(s) => write!(f, "{:?}", s),
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Quote(datum) => write!(f, "'{}", datum),
            Expression::If0 {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "(if0 {} {} {})", condition, then_branch, else_branch),
            Expression::Fun { params, body } => {
                write!(f, "(fun ({}) {})", params.join(" "), body)
            }
            Expression::Define { name, value } => write!(f, "(define {} {})", name, value),
            Expression::Set { name, value } => write!(f, "(set {} {})", name, value),
            Expression::With { name, bound, body } => {
                write!(f, "(with ({} {}) {})", name, bound, body)
            }
            Expression::Seqn { first, second } => write!(f, "(seqn {} {})", first, second),
            Expression::Application { operator, operands } => {
                write!(f, "({}", operator)?;
                for operand in operands {
                    write!(f, " {}", operand)?;
                }
                write!(f, ")")
            }
        })
    }
}
