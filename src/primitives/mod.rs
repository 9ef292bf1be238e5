//! Primitive library for rexp
//!
//! Provides the framework for host procedures and the standard table that is
//! installed into every top-level environment.

#[cfg(feature = "stdlib")]
pub mod compare;
#[cfg(feature = "stdlib")]
pub mod effects;
#[cfg(feature = "stdlib")]
pub mod higher_order;
#[cfg(feature = "stdlib")]
pub mod lists;
#[cfg(feature = "stdlib")]
pub mod numeric;

use crate::error::{Error, Result};
use crate::runtime::value::NativeProcedure;
use crate::runtime::{Environment, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Primitive trait - every host procedure implements this
pub trait Primitive: Send + Sync {
    /// Name the primitive is bound under
    fn name(&self) -> &str;

    /// Short description
    fn description(&self) -> &str;

    /// Execute the primitive on evaluated arguments
    fn execute(&self, args: &[Value], ctx: &mut dyn CallContext) -> Result<Value>;

    /// Fixed argument count, if any
    fn arity(&self) -> Option<usize> {
        None // None means variadic
    }
}

/// What a primitive may ask of the running evaluator.
///
/// Higher-order primitives call back into the applier; `display` and `read` go
/// through the evaluator's I/O sinks instead of touching stdio directly.
pub trait CallContext {
    /// Apply a procedure value to arguments
    fn apply(&mut self, procedure: &Value, args: Vec<Value>) -> Result<Value>;

    /// Write text to the output sink
    fn write_output(&mut self, text: &str) -> Result<()>;

    /// Read one line from the input sink; `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// Signature shared by the table-driven primitives
pub type PrimitiveFn = fn(&[Value], &mut dyn CallContext) -> Result<Value>;

/// A primitive defined by a plain function
pub struct Builtin {
    /// Bound name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Fixed argument count, `None` for variadic
    pub arity: Option<usize>,
    /// Implementation
    pub func: PrimitiveFn,
}

impl Builtin {
    /// Variadic builtin
    pub fn variadic(name: &'static str, description: &'static str, func: PrimitiveFn) -> Self {
        Builtin {
            name,
            description,
            arity: None,
            func,
        }
    }

    /// Builtin with a fixed argument count
    pub fn fixed(
        name: &'static str,
        description: &'static str,
        arity: usize,
        func: PrimitiveFn,
    ) -> Self {
        Builtin {
            name,
            description,
            arity: Some(arity),
            func,
        }
    }
}

impl Primitive for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn execute(&self, args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
        (self.func)(args, ctx)
    }

    fn arity(&self) -> Option<usize> {
        self.arity
    }
}

/// Primitive registry
pub struct PrimitiveRegistry {
    primitives: HashMap<String, Arc<dyn Primitive>>,
}

impl PrimitiveRegistry {
    /// Create new registry with the standard library
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut registry = PrimitiveRegistry::empty();

        #[cfg(feature = "stdlib")]
        {
            numeric::register(&mut registry);
            compare::register(&mut registry);
            lists::register(&mut registry);
            higher_order::register(&mut registry);
            effects::register(&mut registry);
        }

        registry
    }

    /// Create empty registry (for testing)
    pub fn empty() -> Self {
        PrimitiveRegistry {
            primitives: HashMap::new(),
        }
    }

    /// Register a primitive, replacing any previous one with the same name
    pub fn register<T: Primitive + 'static>(&mut self, primitive: T) {
        let name = primitive.name().to_string();
        self.primitives.insert(name, Arc::new(primitive));
    }

    /// Get primitive by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Primitive>> {
        self.primitives
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unbound(name))
    }

    /// Check if primitive exists
    pub fn has(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
    }

    /// List all primitive names
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.primitives.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get primitive count
    pub fn count(&self) -> usize {
        self.primitives.len()
    }

    /// Binds every primitive plus the constants `#true`, `#false` and `empty`
    pub fn install(&self, env: &mut Environment) {
        for (name, primitive) in &self.primitives {
            env.bind(
                name.clone(),
                Value::Native(NativeProcedure::new(Arc::clone(primitive))),
            );
        }
        env.bind("#true", Value::Bool(true));
        env.bind("#false", Value::Bool(false));
        env.bind("empty", Value::list(vec![]));
    }
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Argument helpers shared by the primitive modules

/// Fails unless at least `min` arguments were passed
pub(crate) fn expect_at_least(name: &str, args: &[Value], min: usize) -> Result<()> {
    if args.len() < min {
        return Err(Error::invalid_args(
            name,
            format!("expected at least {} argument(s), got {}", min, args.len()),
        ));
    }
    Ok(())
}

/// Fails unless `value` is a procedure
pub(crate) fn expect_procedure<'a>(value: &'a Value) -> Result<&'a Value> {
    if value.is_procedure() {
        Ok(value)
    } else {
        Err(Error::TypeError {
            expected: "procedure".to_string(),
            got: value.type_name(),
        })
    }
}
