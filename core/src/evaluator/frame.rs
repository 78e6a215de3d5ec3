//! Variable bindings.
//!
//! A single flat frame maps names to values or host functions. Binding a
//! name that is also a builtin counts as rebinding the builtin: the
//! [`RebindWatch`] is notified before `bind` returns.

use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;
use tracing::debug;

use crate::evaluator::RuntimeError;
use crate::nodes::builtins;
use crate::syntax::Symbol;
use crate::tree::{Tree, TreeError};
use crate::values::Value;
use crate::watch::RebindWatch;

/// Signature of host functions callable from programs.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, RuntimeError>;

/// A host function bound into a frame.
///
/// # Example
///
/// ```
/// use molt_core::evaluator::NativeFunction;
/// use molt_core::Value;
///
/// let twice = NativeFunction::new("twice", |args| {
///     Ok(args.first().cloned().unwrap_or(Value::Null))
/// });
/// assert_eq!(twice.name(), "twice");
/// ```
#[derive(Clone)]
pub struct NativeFunction {
    name: Symbol,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<Symbol>,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Function(NativeFunction),
}

#[derive(Debug, Default)]
pub struct Frame {
    bindings: HashMap<Symbol, Binding>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binds `name`, notifying `watch` synchronously when `name` shadows a
    /// builtin.
    ///
    /// The binding is installed before the subscribers run and stays in
    /// place if one of them fails. Every subscriber still runs; the error is
    /// the first splice failure, which indicates a broken tree rather than a
    /// rejected binding.
    pub fn bind(
        &mut self,
        name: Symbol,
        binding: Binding,
        tree: &mut Tree,
        watch: &mut RebindWatch,
    ) -> Result<(), TreeError> {
        let rebinds_builtin = builtins::is_builtin(&name);
        self.bindings.insert(name.clone(), binding);
        if rebinds_builtin {
            debug!(name = %name, "builtin rebound");
            watch.notify_rebound(&name, tree)?;
        }
        Ok(())
    }

    /// Removes `name`. Nodes already rewritten for a rebound builtin stay
    /// pessimistic.
    pub fn unbind(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }
}
