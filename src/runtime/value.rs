use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::{Datum, Expression};
use crate::primitives::{CallContext, Primitive};
use crate::runtime::stack::ensure_sufficient_stack;
use crate::runtime::Environment;

/// Runtime value representation
#[derive(Debug, Clone)]
pub enum Value {
    /// Result of `define`, `set`, `display`: no value
    Void,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// String value (also quoted atoms)
    String(String),
    /// Cons-list of values
    List(List),
    /// Host procedure from the primitive library
    Native(NativeProcedure),
    /// User procedure with its captured environment
    Closure(Arc<Closure>),
}

/// A user-defined procedure
pub struct Closure {
    /// Parameter names in order
    pub params: Vec<String>,
    /// Body evaluated on application
    pub body: Arc<Expression>,
    /// Independent copy of the defining environment
    pub env: Environment,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

/// A primitive procedure value
#[derive(Clone)]
pub struct NativeProcedure(Arc<dyn Primitive>);

impl NativeProcedure {
    /// Wraps a registered primitive
    pub fn new(primitive: Arc<dyn Primitive>) -> Self {
        NativeProcedure(primitive)
    }

    /// Name the primitive is bound under
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Calls the primitive after checking its fixed arity, if it has one
    pub fn call(&self, args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
        if let Some(arity) = self.0.arity() {
            if args.len() != arity {
                return Err(Error::invalid_args(
                    self.name(),
                    format!("expected {} argument(s), got {}", arity, args.len()),
                ));
            }
        }
        self.0.execute(args, ctx)
    }
}

impl fmt::Debug for NativeProcedure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NativeProcedure({})", self.name())
    }
}

/// Persistent singly linked list.
///
/// `cons` shares the tail, so `rest` and `cons` are O(1) and structure matches the
/// language's cons-cell model.
#[derive(Clone, Default)]
pub struct List {
    head: Option<Arc<Node>>,
    len: usize,
}

struct Node {
    value: Value,
    next: List,
}

impl List {
    /// The empty list
    pub fn empty() -> Self {
        List::default()
    }

    /// New list with `value` in front of `tail`
    pub fn cons(value: Value, tail: List) -> Self {
        let len = tail.len + 1;
        List {
            head: Some(Arc::new(Node { value, next: tail })),
            len,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for the empty list
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// First element
    pub fn first(&self) -> Option<&Value> {
        self.head.as_ref().map(|node| &node.value)
    }

    /// Everything after the first element
    pub fn rest(&self) -> Option<List> {
        self.head.as_ref().map(|node| node.next.clone())
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.iter().nth(index)
    }

    /// Borrowing iterator from front to back
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Same elements in reverse order
    pub fn reversed(&self) -> List {
        self.iter()
            .fold(List::empty(), |acc, value| List::cons(value.clone(), acc))
    }

    /// Elements copied into a vector
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }
}

/// Iterator over a [`List`]
pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.head.as_deref();
            &node.value
        })
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let items: Vec<Value> = iter.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(List::empty(), |acc, value| List::cons(value, acc))
    }
}

// Unlinks uniquely owned nodes one at a time so long or deeply nested lists do not
// recurse on drop.
impl Drop for List {
    fn drop(&mut self) {
        let mut pending = vec![self.head.take()];
        while let Some(mut head) = pending.pop() {
            while let Some(node) = head {
                match Arc::try_unwrap(node) {
                    Ok(mut node) => {
                        if let Value::List(inner) = &mut node.value {
                            pending.push(inner.head.take());
                        }
                        head = node.next.head.take();
                    }
                    Err(_) => break,
                }
            }
        }
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Value {
    /// Creates a list value from a vector of values
    pub fn list(values: Vec<Value>) -> Self {
        Value::List(values.into_iter().collect())
    }

    /// Creates a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Converts quoted structure into a value: symbols become strings
    pub fn from_datum(datum: &Datum) -> Self {
        match datum {
            Datum::Int(n) => Value::Int(*n),
            Datum::Float(x) => Value::Float(*x),
            Datum::Str(s) | Datum::Symbol(s) => Value::String(s.clone()),
            Datum::List(items) => ensure_sufficient_stack(|| {
                Value::List(items.iter().map(Value::from_datum).collect())
            }),
        }
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "void".to_string(),
            Value::Bool(_) => "boolean".to_string(),
            Value::Int(_) => "integer".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Native(_) | Value::Closure(_) => "procedure".to_string(),
        }
    }

    /// Returns true if the value is truthy in a boolean context
    ///
    /// `#false`, zero, the empty string, the empty list and void are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Void => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Native(_) | Value::Closure(_) => true,
        }
    }

    /// True for natives and closures
    pub fn is_procedure(&self) -> bool {
        matches!(self, Value::Native(_) | Value::Closure(_))
    }

    // Type conversion methods

    /// Extracts an integer; integral floats are accepted
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            _ => Err(Error::TypeError {
                expected: "integer".to_string(),
                got: self.type_name(),
            }),
        }
    }

    /// Converts a number to a 64-bit float
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            _ => Err(Error::TypeError {
                expected: "number".to_string(),
                got: self.type_name(),
            }),
        }
    }

    /// Returns a reference to the string value
    pub fn as_string(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::TypeError {
                expected: "string".to_string(),
                got: self.type_name(),
            }),
        }
    }

    /// Returns a reference to the list value
    pub fn as_list(&self) -> Result<&List> {
        match self {
            Value::List(list) => Ok(list),
            _ => Err(Error::TypeError {
                expected: "list".to_string(),
                got: self.type_name(),
            }),
        }
    }

    /// Text written by `display`: like the printed form, but strings are unquoted
    pub fn display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::List(list) => {
                let items: Vec<String> = list.iter().map(|v| v.display_string()).collect();
                format!("({})", items.join(" "))
            }
            other => other.to_string(),
        }
    }

    /// JSON rendering used by the CLI's `--json` output
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Void => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(list) => serde_json::Value::Array(list.iter().map(Value::to_json).collect()),
            Value::Native(_) | Value::Closure(_) => serde_json::Value::String(self.to_string()),
        }
    }
}

fn write_float(f: &mut fmt::Formatter, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

/// Printed representation reported by the driver
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Void => write!(f, "#<void>"),
            Value::Bool(true) => write!(f, "#true"),
            Value::Bool(false) => write!(f, "#false"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write_float(f, *x),
            Value::String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Value::List(list) if list.is_empty() => write!(f, "empty"),
            Value::List(list) => ensure_sufficient_stack(|| {
                write!(f, "(list")?;
                for value in list.iter() {
                    write!(f, " {}", value)?;
                }
                write!(f, ")")
            }),
            Value::Native(native) => write!(f, "#<procedure:{}>", native.name()),
            Value::Closure(closure) => write!(f, "#<procedure:fun/{}>", closure.params.len()),
        }
    }
}

// Numbers compare by value across int/float; procedures compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a.name() == b.name(),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq<Vec<Value>> for Value {
    fn eq(&self, other: &Vec<Value>) -> bool {
        match self {
            Value::List(list) => list.len() == other.len() && list.iter().eq(other.iter()),
            _ => false,
        }
    }
}
