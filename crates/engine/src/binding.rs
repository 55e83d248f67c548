//! Caller-side argument bindings.
//!
//! A [`BindingTable`] maps each parameter name the caller wants to exchange
//! with a delegate to a [`BoundArgument`]: its direction, its declared type,
//! and an [`ArgumentAccessor`] capability that reads and writes the value in
//! the host's [`ValueScope`]. The table itself is immutable metadata once the
//! activity is defined; only the values reached through accessors change from
//! one invocation to the next.

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, map::Entry};
use invoke_types::{ArgumentDirection, ArgumentType};
use serde_json::Value;
use thiserror::Error;

/// Host-owned storage that bound arguments read from and write to.
pub trait ValueScope {
    /// Returns the current value of a variable, if it has been assigned.
    fn read(&self, name: &str) -> Option<Value>;
    /// Assigns a variable.
    fn write(&mut self, name: &str, value: Value);
}

/// Simple ordered variable store usable as a [`ValueScope`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableScope {
    /// Variables keyed by name, in assignment order.
    pub variables: IndexMap<String, Value>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a scope pre-populated with the given variables.
    pub fn with_variables(variables: IndexMap<String, Value>) -> Self {
        Self { variables }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

impl ValueScope for VariableScope {
    fn read(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn write(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }
}

/// Failure reading or writing a bound argument's value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("the argument location is read-only")]
    ReadOnly,
    #[error("{message}")]
    Host { message: String },
}

impl AccessError {
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host { message: message.into() }
    }
}

/// Read/write capability pair behind a bound argument.
///
/// Implementations decide how a value is located in the scope (a variable, an
/// expression, a constant). The core only calls `get` on input-bearing
/// bindings and `set` on output-bearing ones.
pub trait ArgumentAccessor: fmt::Debug + Send + Sync {
    fn get(&self, scope: &dyn ValueScope) -> Result<Value, AccessError>;
    fn set(&self, scope: &mut dyn ValueScope, value: Value) -> Result<(), AccessError>;
}

/// Constant input value. Writing to it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralValue(pub Value);

impl ArgumentAccessor for LiteralValue {
    fn get(&self, _scope: &dyn ValueScope) -> Result<Value, AccessError> {
        Ok(self.0.clone())
    }

    fn set(&self, _scope: &mut dyn ValueScope, _value: Value) -> Result<(), AccessError> {
        Err(AccessError::ReadOnly)
    }
}

/// Reference to a named variable in the scope. Unassigned variables read as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference(pub String);

impl ArgumentAccessor for VariableReference {
    fn get(&self, scope: &dyn ValueScope) -> Result<Value, AccessError> {
        Ok(scope.read(&self.0).unwrap_or(Value::Null))
    }

    fn set(&self, scope: &mut dyn ValueScope, value: Value) -> Result<(), AccessError> {
        scope.write(&self.0, value);
        Ok(())
    }
}

/// A caller-declared argument slot exposed to a delegate handler.
#[derive(Debug, Clone)]
pub struct BoundArgument {
    direction: ArgumentDirection,
    declared_type: ArgumentType,
    accessor: Arc<dyn ArgumentAccessor>,
}

impl BoundArgument {
    pub fn new(direction: ArgumentDirection, declared_type: ArgumentType, accessor: impl ArgumentAccessor + 'static) -> Self {
        Self {
            direction,
            declared_type,
            accessor: Arc::new(accessor),
        }
    }

    /// Input argument carrying a constant value.
    pub fn literal(declared_type: ArgumentType, value: Value) -> Self {
        Self::new(ArgumentDirection::In, declared_type, LiteralValue(value))
    }

    /// Argument bound to a scope variable in the given direction.
    pub fn variable(direction: ArgumentDirection, declared_type: ArgumentType, variable: impl Into<String>) -> Self {
        Self::new(direction, declared_type, VariableReference(variable.into()))
    }

    pub fn direction(&self) -> ArgumentDirection {
        self.direction
    }

    pub fn declared_type(&self) -> &ArgumentType {
        &self.declared_type
    }

    pub fn get(&self, scope: &dyn ValueScope) -> Result<Value, AccessError> {
        self.accessor.get(scope)
    }

    pub fn set(&self, scope: &mut dyn ValueScope, value: Value) -> Result<(), AccessError> {
        self.accessor.set(scope, value)
    }
}

/// Error raised while building a binding table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("an argument named '{name}' is already bound")]
    Duplicate { name: String },
}

/// Name → bound argument mapping owned by the invoking activity.
///
/// Names are unique. Insertion order is preserved and determines the order of
/// the runtime argument list declared to the host.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: IndexMap<String, BoundArgument>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, rejecting names that are already bound.
    pub fn bind(&mut self, name: impl Into<String>, argument: BoundArgument) -> Result<(), BindingError> {
        match self.entries.entry(name.into()) {
            Entry::Occupied(entry) => Err(BindingError::Duplicate { name: entry.key().clone() }),
            Entry::Vacant(entry) => {
                entry.insert(argument);
                Ok(())
            }
        }
    }

    /// Removes a binding, returning it if present.
    pub fn unbind(&mut self, name: &str) -> Option<BoundArgument> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&BoundArgument> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundArgument)> {
        self.entries.iter().map(|(name, argument)| (name.as_str(), argument))
    }
}
