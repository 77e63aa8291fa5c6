//! The execution registry and dispatcher.
//!
//! Registered executions live in a persistent vector kept sorted by static
//! rank. Dispatch snapshots the vector under a read lock and releases the
//! lock before any trial runs, so actions may register or unregister
//! commands re-entrantly.

use std::fmt;
use std::sync::Arc;

use im::Vector;
use lantern_foundation::{ActionError, Actor, CommandError, ConfigError, ErrorContext, Value};
use lantern_tree::{
    CommandFunction, Execution, ExecutionContext, ExecutionId, ResolvedArguments, ResolverPipeline,
    TreeBuilder,
};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, trace};

use crate::completion::AutoCompleter;
use crate::condition::{CommandCondition, CooldownCondition, PermissionCondition};
use crate::handler::{
    DefaultExceptionHandler, DefaultFailureHandler, DefaultResponseHandler, ExceptionHandler,
    FailureHandler, ResponseHandler,
};
use crate::hooks::CommandHooks;
use crate::potential::Potential;
use crate::settings::DispatcherSettings;

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// The execution that ran.
    pub execution: Arc<Execution>,
    /// The arguments it ran with, including context parameters.
    pub arguments: ResolvedArguments,
    /// The action's return value.
    pub response: Value,
}

/// Why a dispatch did not run a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered command starts with the input's first word.
    #[error("{0}")]
    UnknownCommand(CommandError),

    /// Every candidate failed; carries the error the failure handler chose.
    #[error("{0}")]
    Failed(CommandError),

    /// The winning candidate's action returned an error.
    #[error("command '{path}' failed: {source}")]
    Action {
        /// Path of the command that ran.
        path: String,
        /// The action's error.
        source: ActionError,
    },

    /// A hook cancelled the winning candidate.
    #[error("execution of '{path}' was cancelled")]
    Vetoed {
        /// Path of the cancelled command.
        path: String,
    },
}

impl DispatchError {
    /// The parse or condition error, for unknown and failed dispatches.
    #[must_use]
    pub const fn command_error(&self) -> Option<&CommandError> {
        match self {
            Self::UnknownCommand(error) | Self::Failed(error) => Some(error),
            Self::Action { .. } | Self::Vetoed { .. } => None,
        }
    }
}

/// Holds compiled executions and dispatches input against them.
pub struct Dispatcher {
    settings: DispatcherSettings,
    pipeline: ResolverPipeline,
    executions: RwLock<Vector<Arc<Execution>>>,
    conditions: Vec<Arc<dyn CommandCondition>>,
    hooks: Vec<Arc<dyn CommandHooks>>,
    failure_handler: Arc<dyn FailureHandler>,
    exception_handler: Arc<dyn ExceptionHandler>,
    response_handler: Arc<dyn ResponseHandler>,
}

impl Dispatcher {
    /// Creates a dispatcher with default settings, pipeline, and handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a dispatcher.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// The dispatcher settings.
    #[must_use]
    pub const fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// The pipeline used by [`Dispatcher::register_function`].
    #[must_use]
    pub const fn pipeline(&self) -> &ResolverPipeline {
        &self.pipeline
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Adds a compiled execution.
    ///
    /// Returns `None` if a hook cancelled the registration.
    pub fn register(&self, execution: Execution) -> Option<Arc<Execution>> {
        let execution = Arc::new(execution);
        let accepted = self
            .hooks
            .iter()
            .fold(true, |accepted, hook| hook.on_registered(&execution) && accepted);
        if !accepted {
            debug!(id = %execution.id(), path = execution.path(), "registration cancelled");
            return None;
        }

        let mut executions = self.executions.write();
        let index = executions
            .iter()
            .position(|existing| execution.rank(existing).is_lt())
            .unwrap_or(executions.len());
        executions.insert(index, Arc::clone(&execution));
        drop(executions);

        debug!(id = %execution.id(), path = execution.path(), "registered command");
        Some(execution)
    }

    /// Compiles every path of `function` and registers the results.
    ///
    /// All paths are compiled before any is registered, so an invalid
    /// grammar registers nothing.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the first invalid path.
    pub fn register_function(&self, function: &CommandFunction) -> Result<Vec<Arc<Execution>>, ConfigError> {
        let compiled = TreeBuilder::new(&self.pipeline).build_all(function)?;
        Ok(compiled
            .into_iter()
            .filter_map(|execution| self.register(execution))
            .collect())
    }

    /// Removes the execution with `id`.
    pub fn unregister(&self, id: ExecutionId) -> Option<Arc<Execution>> {
        let removed = {
            let mut executions = self.executions.write();
            let index = executions.iter().position(|e| e.id() == id)?;
            executions.remove(index)
        };
        self.notify_unregistered(&removed);
        Some(removed)
    }

    /// Removes every execution matching `predicate`.
    pub fn unregister_if<F>(&self, predicate: F) -> Vec<Arc<Execution>>
    where
        F: Fn(&Execution) -> bool,
    {
        let removed: Vector<Arc<Execution>> = {
            let mut executions = self.executions.write();
            let (removed, kept): (Vector<_>, Vector<_>) = executions
                .iter()
                .cloned()
                .partition(|e| predicate(e.as_ref()));
            *executions = kept;
            removed
        };
        for execution in &removed {
            self.notify_unregistered(execution);
        }
        removed.into_iter().collect()
    }

    fn notify_unregistered(&self, execution: &Execution) {
        for hook in &self.hooks {
            hook.on_unregistered(execution);
        }
        debug!(id = %execution.id(), path = execution.path(), "unregistered command");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// A snapshot of every registered execution, in rank order.
    #[must_use]
    pub fn commands(&self) -> Vector<Arc<Execution>> {
        self.executions.read().clone()
    }

    /// Looks up an execution by id.
    #[must_use]
    pub fn get(&self, id: ExecutionId) -> Option<Arc<Execution>> {
        self.executions.read().iter().find(|e| e.id() == id).cloned()
    }

    /// Executions matching `predicate`, in rank order.
    pub fn filter<F>(&self, predicate: F) -> Vec<Arc<Execution>>
    where
        F: Fn(&Execution) -> bool,
    {
        self.commands()
            .into_iter()
            .filter(|e| predicate(e.as_ref()))
            .collect()
    }

    /// Whether any execution matches `predicate`.
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Execution) -> bool,
    {
        self.executions.read().iter().any(|e| predicate(e.as_ref()))
    }

    /// Executions whose leading literal is the first word of `input`.
    #[must_use]
    pub fn candidates(&self, input: &str) -> Vector<Arc<Execution>> {
        let Some(word) = input.split_whitespace().next() else {
            return Vector::new();
        };
        self.commands()
            .into_iter()
            .filter(|e| e.name().eq_ignore_ascii_case(word))
            .collect()
    }

    /// Executions that are siblings of `execution`.
    #[must_use]
    pub fn siblings(&self, execution: &Execution) -> Vec<Arc<Execution>> {
        self.filter(|e| e.is_sibling_of(execution))
    }

    /// Executions whose paths extend the path of `execution`.
    #[must_use]
    pub fn children(&self, execution: &Execution) -> Vec<Arc<Execution>> {
        self.filter(|e| e.is_child_of(execution))
    }

    /// Suggestions for the word being typed at the end of `input`.
    #[must_use]
    pub fn complete(&self, actor: &dyn Actor, input: &str) -> Vec<String> {
        AutoCompleter::new(&self.settings).complete(&self.commands(), actor, input)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Trial-parses `input` against one execution without running it.
    #[must_use]
    pub fn test<'a>(
        &self,
        execution: &'a Arc<Execution>,
        actor: &'a dyn Actor,
        input: &'a str,
    ) -> Potential<'a> {
        Potential::trial(execution, actor, input, &self.settings, &self.conditions)
    }

    /// Parses `input`, picks the best candidate, and runs it.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when no command matches, every candidate
    /// fails, a hook cancels the winner, or the winner's action fails.
    pub fn dispatch(&self, actor: &dyn Actor, input: &str) -> Result<Dispatched, DispatchError> {
        let candidates = self.candidates(input);
        if candidates.is_empty() {
            let error = self.failure_handler.handle_unknown_command(actor, input);
            return Err(DispatchError::UnknownCommand(error));
        }

        let max_successes = self.settings.max_successes.max(1);
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for execution in &candidates {
            let potential = self.test(execution, actor, input);
            trace!(
                path = execution.path(),
                success = potential.is_successful(),
                consumed_all = potential.consumed_all_input(),
                "trial"
            );
            if potential.is_successful() {
                successes.push(potential);
                if successes.len() >= max_successes {
                    break;
                }
            } else {
                failures.push(potential);
            }
        }

        successes.sort_by(Potential::compare);
        let Some(winner) = successes.into_iter().next() else {
            let error = self.failure_handler.handle_failures(actor, input, &failures);
            return Err(DispatchError::Failed(error));
        };
        self.execute(winner)
    }

    fn execute(&self, winner: Potential<'_>) -> Result<Dispatched, DispatchError> {
        let execution = Arc::clone(winner.execution());
        let path = execution.path().to_string();
        let mut context = winner.into_context();

        for (index, condition) in self.conditions.iter().enumerate() {
            if let Err(error) = condition.acquire(&context) {
                for acquired in &self.conditions[..index] {
                    acquired.released(&context);
                }
                debug!(path = %path, %error, "winner lost its claim");
                return Err(DispatchError::Failed(error.with_context(
                    ErrorContext::ExecutingFunction { path },
                )));
            }
        }

        let proceed = self
            .hooks
            .iter()
            .fold(true, |proceed, hook| hook.on_executed(&context) && proceed);
        if !proceed {
            self.release(&context);
            debug!(path = %path, "execution cancelled");
            return Err(DispatchError::Vetoed { path });
        }

        let Some(action) = execution.action() else {
            self.release(&context);
            return Err(DispatchError::Action {
                path,
                source: ActionError::message("command has no action"),
            });
        };

        match action.invoke(&mut context) {
            Ok(response) => {
                for condition in &self.conditions {
                    condition.executed(&context);
                }
                debug!(actor = %context.actor().id(), path = %path, "executed command");
                if !response.is_nil() {
                    self.response_handler.handle_response(&context, &response);
                }
                Ok(Dispatched {
                    execution: Arc::clone(&execution),
                    arguments: context.into_arguments(),
                    response,
                })
            }
            Err(error) => {
                self.release(&context);
                self.exception_handler.handle_exception(&context, &error);
                Err(DispatchError::Action { path, source: error })
            }
        }
    }
}

impl Dispatcher {
    fn release(&self, context: &ExecutionContext<'_>) {
        for condition in &self.conditions {
            condition.released(context);
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("settings", &self.settings)
            .field("commands", &self.executions.read().len())
            .field("conditions", &self.conditions.len())
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
///
/// Starts with the permission and cooldown conditions installed.
pub struct DispatcherBuilder {
    settings: DispatcherSettings,
    pipeline: ResolverPipeline,
    conditions: Vec<Arc<dyn CommandCondition>>,
    hooks: Vec<Arc<dyn CommandHooks>>,
    failure_handler: Arc<dyn FailureHandler>,
    exception_handler: Arc<dyn ExceptionHandler>,
    response_handler: Arc<dyn ResponseHandler>,
}

impl DispatcherBuilder {
    /// Creates a builder with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: DispatcherSettings::default(),
            pipeline: ResolverPipeline::default(),
            conditions: vec![
                Arc::new(PermissionCondition),
                Arc::new(CooldownCondition::new()),
            ],
            hooks: Vec::new(),
            failure_handler: Arc::new(DefaultFailureHandler),
            exception_handler: Arc::new(DefaultExceptionHandler),
            response_handler: Arc::new(DefaultResponseHandler),
        }
    }

    /// Sets the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: DispatcherSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the resolver pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ResolverPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Adds a condition after the existing ones.
    #[must_use]
    pub fn with_condition(mut self, condition: impl CommandCondition + 'static) -> Self {
        self.conditions.push(Arc::new(condition));
        self
    }

    /// Removes every condition, including the defaults.
    #[must_use]
    pub fn without_conditions(mut self) -> Self {
        self.conditions.clear();
        self
    }

    /// Adds lifecycle hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl CommandHooks + 'static) -> Self {
        self.hooks.push(Arc::new(hooks));
        self
    }

    /// Replaces the failure handler.
    #[must_use]
    pub fn with_failure_handler(mut self, handler: impl FailureHandler + 'static) -> Self {
        self.failure_handler = Arc::new(handler);
        self
    }

    /// Replaces the exception handler.
    #[must_use]
    pub fn with_exception_handler(mut self, handler: impl ExceptionHandler + 'static) -> Self {
        self.exception_handler = Arc::new(handler);
        self
    }

    /// Replaces the response handler.
    #[must_use]
    pub fn with_response_handler(mut self, handler: impl ResponseHandler + 'static) -> Self {
        self.response_handler = Arc::new(handler);
        self
    }

    /// Builds the dispatcher.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            settings: self.settings,
            pipeline: self.pipeline,
            executions: RwLock::new(Vector::new()),
            conditions: self.conditions,
            hooks: self.hooks,
            failure_handler: self.failure_handler,
            exception_handler: self.exception_handler,
            response_handler: self.response_handler,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
