//! Failure, exception, and response handlers.

use lantern_foundation::{ActionError, Actor, CommandError, ErrorContext, Value};
use lantern_tree::ExecutionContext;
use tracing::{debug, warn};

use crate::potential::Potential;

/// Decides which error to report when no candidate succeeds.
pub trait FailureHandler: Send + Sync {
    /// Called with every failed trial when at least one candidate existed.
    fn handle_failures(&self, actor: &dyn Actor, input: &str, failures: &[Potential<'_>]) -> CommandError;

    /// Called when no registered command starts with the input's first word.
    fn handle_unknown_command(&self, actor: &dyn Actor, input: &str) -> CommandError {
        let word = input.split_whitespace().next().unwrap_or_default();
        warn!(actor = %actor.id(), input, "unknown command");
        CommandError::unknown_command(word).with_context(ErrorContext::UnknownCommand {
            input: input.to_string(),
        })
    }
}

/// Returns the failed trial that got furthest through its grammar.
///
/// Ties go to the candidate with the better static rank.
#[must_use]
pub fn furthest_failure<'p, 'a>(failures: &'p [Potential<'a>]) -> Option<&'p Potential<'a>> {
    failures
        .iter()
        .filter(|potential| !potential.is_successful())
        .min_by(|a, b| {
            b.furthest_node()
                .cmp(&a.furthest_node())
                .then_with(|| a.execution().rank(b.execution()))
        })
}

/// Reports the error of the failure that got furthest.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFailureHandler;

impl FailureHandler for DefaultFailureHandler {
    fn handle_failures(&self, actor: &dyn Actor, input: &str, failures: &[Potential<'_>]) -> CommandError {
        match furthest_failure(failures).and_then(Potential::error) {
            Some(error) => {
                warn!(actor = %actor.id(), input, %error, candidates = failures.len(), "command failed");
                error.clone()
            }
            None => self.handle_unknown_command(actor, input),
        }
    }
}

/// Receives errors returned by a command's action.
pub trait ExceptionHandler: Send + Sync {
    /// Handles an action error.
    fn handle_exception(&self, context: &ExecutionContext<'_>, error: &ActionError);
}

impl<F> ExceptionHandler for F
where
    F: Fn(&ExecutionContext<'_>, &ActionError) + Send + Sync,
{
    fn handle_exception(&self, context: &ExecutionContext<'_>, error: &ActionError) {
        self(context, error);
    }
}

/// Logs action errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultExceptionHandler;

impl ExceptionHandler for DefaultExceptionHandler {
    fn handle_exception(&self, context: &ExecutionContext<'_>, error: &ActionError) {
        warn!(
            actor = %context.actor().id(),
            path = context.execution().path(),
            %error,
            "command action failed"
        );
    }
}

/// Receives the non-nil values returned by actions.
pub trait ResponseHandler: Send + Sync {
    /// Handles a response.
    fn handle_response(&self, context: &ExecutionContext<'_>, response: &Value);
}

impl<F> ResponseHandler for F
where
    F: Fn(&ExecutionContext<'_>, &Value) + Send + Sync,
{
    fn handle_response(&self, context: &ExecutionContext<'_>, response: &Value) {
        self(context, response);
    }
}

/// Logs responses at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultResponseHandler;

impl ResponseHandler for DefaultResponseHandler {
    fn handle_response(&self, context: &ExecutionContext<'_>, response: &Value) {
        debug!(
            actor = %context.actor().id(),
            path = context.execution().path(),
            %response,
            "command response"
        );
    }
}
