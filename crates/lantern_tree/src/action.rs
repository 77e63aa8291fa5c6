//! Terminal actions.

use std::fmt;
use std::sync::Arc;

use lantern_foundation::{ActionError, ErrorContext, Value};

use crate::context::ExecutionContext;
use crate::parameter::ParameterDescriptor;
use crate::resolver::ContextParameter;

/// The body of a command, invoked once its arguments are resolved.
///
/// A non-nil return value is handed to the dispatcher's response handler.
pub trait CommandAction: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Any error is routed to the exception handler.
    fn execute(&self, context: &ExecutionContext<'_>) -> Result<Value, ActionError>;
}

impl<F> CommandAction for F
where
    F: Fn(&ExecutionContext<'_>) -> Result<Value, ActionError> + Send + Sync,
{
    fn execute(&self, context: &ExecutionContext<'_>) -> Result<Value, ActionError> {
        self(context)
    }
}

/// An action together with its deferred context parameters.
#[derive(Clone)]
pub struct BoundAction {
    action: Arc<dyn CommandAction>,
    context_parameters: Vec<(ParameterDescriptor, Arc<dyn ContextParameter>)>,
}

impl BoundAction {
    /// Binds `action` with no context parameters.
    #[must_use]
    pub fn new(action: Arc<dyn CommandAction>) -> Self {
        Self {
            action,
            context_parameters: Vec::new(),
        }
    }

    /// Adds a parameter resolved from context at invocation time.
    pub fn add_context_parameter(
        &mut self,
        parameter: ParameterDescriptor,
        resolver: Arc<dyn ContextParameter>,
    ) {
        self.context_parameters.push((parameter, resolver));
    }

    /// The deferred context parameters, in declaration order.
    pub fn context_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.context_parameters.iter().map(|(p, _)| p)
    }

    /// Resolves the context parameters into `context`, then runs the action.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if a context parameter cannot be resolved
    /// or the action fails.
    pub fn invoke(&self, context: &mut ExecutionContext<'_>) -> Result<Value, ActionError> {
        for (parameter, resolver) in &self.context_parameters {
            let value = resolver.resolve(parameter, context).map_err(|err| {
                err.with_context(ErrorContext::ExecutingFunction {
                    path: context.execution().path().to_string(),
                })
            })?;
            context.arguments_mut().insert(parameter.name(), value);
        }
        self.action.execute(context)
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.context_parameters().map(ParameterDescriptor::name).collect();
        f.debug_struct("BoundAction")
            .field("context_parameters", &names)
            .finish_non_exhaustive()
    }
}
