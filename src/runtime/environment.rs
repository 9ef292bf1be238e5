use std::fmt;

use im::HashMap;

use crate::error::{Error, Result};
use crate::primitives::PrimitiveRegistry;
use crate::runtime::Value;

/// One scope frame: identifier to value.
///
/// There is no parent pointer. Entering a `fun` or `with` copies the whole frame
/// with [`Environment::snapshot`], so closures see the bindings as they were when
/// they were built and never observe later `define`/`set` in the outer scope.
///
/// The table is an `im::HashMap`: a snapshot shares structure with its source and
/// costs O(1), while a later `bind` on either side copies only the path it touches.
#[derive(Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    /// Creates an empty environment
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Creates the top-level environment with the standard primitive table
    pub fn top_level() -> Self {
        Self::with_primitives(&PrimitiveRegistry::new())
    }

    /// Creates a top-level environment from a custom registry
    pub fn with_primitives(registry: &PrimitiveRegistry) -> Self {
        let mut env = Environment::new();
        registry.install(&mut env);
        env
    }

    /// Gets the value bound to `name` in this frame
    pub fn lookup(&self, name: &str) -> Result<Value> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unbound(name))
    }

    /// Inserts or overwrites a binding; `define` and `set` both land here
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Independent copy of every binding.
    ///
    /// Values are immutable once constructed, so copying the table is equivalent
    /// to a deep copy of the value graph: nothing reachable from the copy can be
    /// changed through the original frame. The copy is structural, so it is O(1).
    pub fn snapshot(&self) -> Environment {
        self.clone()
    }

    /// Checks if `name` is bound
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.names())
            .finish()
    }
}
