//! Command function declarations.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use lantern_foundation::{ActionError, Actor, Value};

use crate::action::CommandAction;
use crate::context::ExecutionContext;
use crate::execution::ExecutionMeta;
use crate::parameter::ParameterDescriptor;
use crate::permission::CommandPermission;

/// A command declaration: paths, parameters, metadata, and an action.
///
/// Each path compiles to its own execution; extra paths act as aliases.
#[derive(Clone)]
pub struct CommandFunction {
    paths: Vec<String>,
    parameters: Vec<ParameterDescriptor>,
    action: Arc<dyn CommandAction>,
    meta: ExecutionMeta,
}

impl CommandFunction {
    /// Declares a function at `path` running `action`.
    pub fn new<F>(path: impl Into<String>, action: F) -> Self
    where
        F: Fn(&ExecutionContext<'_>) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        Self::with_action(path, Arc::new(action))
    }

    /// Declares a function at `path` running a shared action.
    pub fn with_action(path: impl Into<String>, action: Arc<dyn CommandAction>) -> Self {
        Self {
            paths: vec![path.into()],
            parameters: Vec::new(),
            action,
            meta: ExecutionMeta::default(),
        }
    }

    /// Adds an alias path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Appends a parameter in declaration order.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets an explicit priority. Lower values win.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.meta.priority = Some(priority);
        self
    }

    /// Marks the function as losing to every unmarked candidate.
    #[must_use]
    pub fn low_priority(mut self) -> Self {
        self.meta.low_priority = true;
        self
    }

    /// Hides the function from listings and completion.
    #[must_use]
    pub fn secret(mut self) -> Self {
        self.meta.secret = true;
        self
    }

    /// Sets a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    /// Overrides the usage string.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.meta.usage = Some(usage.into());
        self
    }

    /// Requires a permission to run the command.
    #[must_use]
    pub fn with_permission<P>(mut self, permission: P) -> Self
    where
        P: Fn(&dyn Actor) -> bool + Send + Sync + 'static,
    {
        self.meta.permission = Some(Arc::new(permission) as Arc<dyn CommandPermission>);
        self
    }

    /// Requires `cooldown` to pass between uses by the same actor.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.meta.cooldown = Some(cooldown);
        self
    }

    /// The declared paths.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The declared parameters.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub(crate) fn action(&self) -> &Arc<dyn CommandAction> {
        &self.action
    }

    pub(crate) fn meta(&self) -> &ExecutionMeta {
        &self.meta
    }
}

impl fmt::Debug for CommandFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFunction")
            .field("paths", &self.paths)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
