//! Trial parsing.
//!
//! A [`Potential`] is the outcome of trying one execution against the
//! input: the resolved arguments on success, or the error that eliminated
//! the candidate. Successful potentials are ranked to pick the one to run.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use lantern_foundation::{Actor, CommandError, ErrorContext, InputFormatCause};
use lantern_stream::StringStream;
use lantern_tree::{CommandNode, Execution, ExecutionContext, ResolvedArguments};

use crate::condition::CommandCondition;
use crate::flags::extract_flags;
use crate::settings::DispatcherSettings;

/// The outcome of one trial parse.
pub struct Potential<'a> {
    execution: &'a Arc<Execution>,
    context: ExecutionContext<'a>,
    error: Option<CommandError>,
    consumed_all: bool,
    furthest_node: usize,
}

impl<'a> Potential<'a> {
    /// Tries `execution` against `input`, then runs `conditions` on success.
    ///
    /// A failed trial keeps its error and discards any partial arguments.
    #[must_use]
    pub fn trial(
        execution: &'a Arc<Execution>,
        actor: &'a dyn Actor,
        input: &'a str,
        settings: &DispatcherSettings,
        conditions: &[Arc<dyn CommandCondition>],
    ) -> Self {
        let mut potential = Self {
            execution,
            context: ExecutionContext::new(actor, execution, input),
            error: None,
            consumed_all: false,
            furthest_node: 0,
        };
        if let Err(error) = potential.run(settings, conditions) {
            potential.context.arguments_mut().clear();
            potential.error = Some(error);
        }
        potential
    }

    fn run(
        &mut self,
        settings: &DispatcherSettings,
        conditions: &[Arc<dyn CommandCondition>],
    ) -> Result<(), CommandError> {
        let execution: &'a Execution = self.execution;
        let mut input = StringStream::new(self.context.input());
        if execution.contains_flags() {
            input = extract_flags(settings, &input, &mut self.context)?;
        }

        for (index, node) in execution.nodes().iter().enumerate() {
            if node.is_flag_or_switch() {
                continue;
            }
            self.furthest_node = index;
            input.skip_whitespace();
            let start = input.position();
            let remaining = input.peek_remaining().to_string();
            let context = || node_context(execution, index, node, &remaining);

            match node {
                CommandNode::Literal(literal) => {
                    let word = input.read_unquoted();
                    if !literal.matches(&word) {
                        input.set_position(start);
                        return Err(
                            CommandError::structural_mismatch(literal.name(), word).with_context(context())
                        );
                    }
                }
                CommandNode::Parameter(parameter) => match parameter.parse(&mut input, &self.context) {
                    Ok(value) => self.context.arguments_mut().insert(parameter.name(), value),
                    Err(error) => {
                        input.set_position(start);
                        return Err(error.with_context(context()));
                    }
                },
            }

            if input.has_remaining() && !input.at_whitespace() {
                return Err(
                    CommandError::input_format(InputFormatCause::ExpectedWhitespace).with_context(context())
                );
            }
        }

        for condition in conditions {
            condition.test(&self.context).map_err(|error| {
                error.with_context(ErrorContext::ExecutingFunction {
                    path: execution.path().to_string(),
                })
            })?;
        }

        input.skip_whitespace();
        self.consumed_all = input.has_finished();
        self.furthest_node = execution.len();
        Ok(())
    }

    /// The execution that was tried.
    #[must_use]
    pub fn execution(&self) -> &'a Arc<Execution> {
        self.execution
    }

    /// Whether every node parsed and every condition passed.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.error.is_none()
    }

    /// The error that eliminated this candidate, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&CommandError> {
        self.error.as_ref()
    }

    /// The resolved arguments. Empty for failed trials.
    #[must_use]
    pub fn arguments(&self) -> &ResolvedArguments {
        self.context.arguments()
    }

    /// The trial's context.
    #[must_use]
    pub const fn context(&self) -> &ExecutionContext<'a> {
        &self.context
    }

    /// Whether the trial left no unparsed input.
    #[must_use]
    pub const fn consumed_all_input(&self) -> bool {
        self.consumed_all
    }

    /// Index of the node the trial reached. Equals the node count on success.
    #[must_use]
    pub const fn furthest_node(&self) -> usize {
        self.furthest_node
    }

    /// Consumes the potential, returning its context for execution.
    #[must_use]
    pub fn into_context(self) -> ExecutionContext<'a> {
        self.context
    }

    /// Ranks two potentials. `Less` means `self` should run first.
    ///
    /// Successes beat failures. Between executions, explicit priority and
    /// the low-priority marker come first, then consuming all of the input,
    /// then structural specificity.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        other
            .is_successful()
            .cmp(&self.is_successful())
            .then_with(|| self.execution.precedence(other.execution))
            .then_with(|| other.consumed_all.cmp(&self.consumed_all))
            .then_with(|| self.execution.specificity(other.execution))
    }
}

fn node_context(execution: &Execution, index: usize, node: &CommandNode, remaining: &str) -> ErrorContext {
    let path = execution.path().to_string();
    match node {
        CommandNode::Literal(literal) => ErrorContext::ParsingLiteral {
            path,
            literal: literal.name().to_string(),
            node_index: index,
        },
        CommandNode::Parameter(parameter) => ErrorContext::ParsingParameter {
            path,
            parameter: parameter.name().to_string(),
            node_index: index,
            remaining: remaining.to_string(),
        },
    }
}

impl fmt::Debug for Potential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Potential")
            .field("execution", &self.execution.path())
            .field("error", &self.error)
            .field("consumed_all", &self.consumed_all)
            .field("furthest_node", &self.furthest_node)
            .field("arguments", self.context.arguments())
            .finish()
    }
}
