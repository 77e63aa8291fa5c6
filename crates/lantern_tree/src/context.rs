//! Per-trial parsing state.

use std::collections::HashMap;
use std::fmt;

use lantern_foundation::{Actor, Value};

use crate::execution::Execution;

/// Arguments resolved so far, keyed by parameter name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedArguments {
    values: HashMap<String, Value>,
}

impl ResolvedArguments {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns true if `name` has been resolved.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of resolved arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Discards all resolved values.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// State shared by the parameter types, conditions, and action of one trial.
pub struct ExecutionContext<'a> {
    actor: &'a dyn Actor,
    execution: &'a Execution,
    input: &'a str,
    arguments: ResolvedArguments,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context for one trial of `execution`.
    #[must_use]
    pub fn new(actor: &'a dyn Actor, execution: &'a Execution, input: &'a str) -> Self {
        Self {
            actor,
            execution,
            input,
            arguments: ResolvedArguments::new(),
        }
    }

    /// The actor issuing the command.
    #[must_use]
    pub fn actor(&self) -> &'a dyn Actor {
        self.actor
    }

    /// The execution being tried.
    #[must_use]
    pub fn execution(&self) -> &'a Execution {
        self.execution
    }

    /// The raw input line.
    #[must_use]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Arguments resolved so far.
    #[must_use]
    pub fn arguments(&self) -> &ResolvedArguments {
        &self.arguments
    }

    /// Mutable access to the resolved arguments.
    pub fn arguments_mut(&mut self) -> &mut ResolvedArguments {
        &mut self.arguments
    }

    /// Returns the resolved value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Consumes the context, returning its arguments.
    #[must_use]
    pub fn into_arguments(self) -> ResolvedArguments {
        self.arguments
    }
}

impl fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("actor", &self.actor.id())
            .field("execution", &self.execution.path())
            .field("input", &self.input)
            .field("arguments", &self.arguments)
            .finish()
    }
}
