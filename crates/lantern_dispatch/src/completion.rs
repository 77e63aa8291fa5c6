//! Tab completion.
//!
//! The input is split into a head of complete words and the partial word
//! being typed. Each visible execution walks its positional nodes over the
//! head; if the walk succeeds, the next node supplies suggestions for the
//! partial word.

use std::collections::BTreeSet;
use std::sync::Arc;

use im::Vector;
use lantern_foundation::Actor;
use lantern_stream::StringStream;
use lantern_tree::{CommandNode, Execution, ExecutionContext, ParameterNode};

use crate::flags::{find_long, find_short, long_name, shorthands};
use crate::settings::DispatcherSettings;

/// Computes completions over a set of executions.
#[derive(Clone, Copy, Debug)]
pub struct AutoCompleter<'s> {
    settings: &'s DispatcherSettings,
}

impl<'s> AutoCompleter<'s> {
    /// Creates a completer using the flag prefixes in `settings`.
    #[must_use]
    pub const fn new(settings: &'s DispatcherSettings) -> Self {
        Self { settings }
    }

    /// Suggestions for the last word of `input`, sorted and deduplicated.
    ///
    /// Secret executions and executions the actor may not run are skipped.
    #[must_use]
    pub fn complete(&self, executions: &Vector<Arc<Execution>>, actor: &dyn Actor, input: &str) -> Vec<String> {
        let (head, partial) = split_partial(input);
        let mut suggestions = BTreeSet::new();
        for execution in executions {
            if execution.is_secret() {
                continue;
            }
            if execution
                .permission()
                .is_some_and(|permission| !permission.is_executable_by(actor))
            {
                continue;
            }
            suggestions.extend(self.complete_one(execution, actor, input, head, partial));
        }
        suggestions.into_iter().collect()
    }

    fn complete_one(
        &self,
        execution: &Execution,
        actor: &dyn Actor,
        input: &str,
        head: &str,
        partial: &str,
    ) -> Vec<String> {
        let mut context = ExecutionContext::new(actor, execution, input);
        let nodes: Vec<&CommandNode> = execution.positional().collect();
        let mut stream = StringStream::new(head);
        let mut index = 0;
        let mut flags_ended = false;

        loop {
            stream.skip_whitespace();
            if stream.has_finished() {
                break;
            }
            if !flags_ended && self.skip_flag(execution, &mut stream, &mut flags_ended) {
                continue;
            }
            let Some(node) = nodes.get(index) else {
                return Vec::new();
            };
            match node {
                CommandNode::Literal(literal) => {
                    if !literal.matches(&stream.read_unquoted()) {
                        return Vec::new();
                    }
                }
                CommandNode::Parameter(parameter) => {
                    if parameter.is_greedy() {
                        return Vec::new();
                    }
                    match parameter.parse(&mut stream, &context) {
                        Ok(value) => context.arguments_mut().insert(parameter.name(), value),
                        Err(_) => return Vec::new(),
                    }
                }
            }
            index += 1;
        }

        if partial.starts_with(self.settings.long_prefix.as_str()) {
            return execution
                .flags()
                .filter_map(ParameterNode::long_name)
                .map(|name| format!("{}{name}", self.settings.long_prefix))
                .filter(|flag| starts_with_ignore_case(flag, partial))
                .collect();
        }

        match nodes.get(index) {
            Some(CommandNode::Literal(literal)) if starts_with_ignore_case(literal.name(), partial) => {
                vec![literal.name().to_string()]
            }
            Some(CommandNode::Parameter(parameter)) => suggest_parameter(parameter, partial, &context),
            _ => Vec::new(),
        }
    }

    /// Skips a flag, a switch, or a shorthand cluster in the head, along
    /// with the values its flags take. A bare long prefix ends flag scanning.
    fn skip_flag(&self, execution: &Execution, stream: &mut StringStream, flags_ended: &mut bool) -> bool {
        let word = stream.peek_unquoted();
        let values = if word == self.settings.long_prefix {
            *flags_ended = true;
            0
        } else if let Some(name) = long_name(self.settings, word) {
            usize::from(find_long(execution, name).is_some_and(|node| !node.is_switch()))
        } else if let Some(cluster) = shorthands(self.settings, word) {
            cluster
                .chars()
                .filter_map(|shorthand| find_short(execution, shorthand))
                .filter(|node| !node.is_switch())
                .count()
        } else {
            return false;
        };
        stream.read_unquoted();
        for _ in 0..values {
            stream.skip_whitespace();
            let start = stream.position();
            if stream.read_string().is_err() {
                stream.set_position(start);
                stream.read_unquoted();
            }
        }
        true
    }
}

fn suggest_parameter(parameter: &ParameterNode, partial: &str, context: &ExecutionContext<'_>) -> Vec<String> {
    if !parameter.permission().is_executable_by(context.actor()) {
        return Vec::new();
    }
    let candidates = match parameter.suggestions() {
        Some(provider) => provider.suggest(partial, context),
        None => parameter.parameter_type().default_suggestions(),
    };
    candidates
        .into_iter()
        .filter(|candidate| starts_with_ignore_case(candidate, partial))
        .collect()
}

/// Splits `input` into its complete words and the word being typed.
fn split_partial(input: &str) -> (&str, &str) {
    if input.is_empty() || input.ends_with(char::is_whitespace) {
        return (input, "");
    }
    let start = input
        .rfind(char::is_whitespace)
        .map_or(0, |index| index + input[index..].chars().next().map_or(1, char::len_utf8));
    (&input[..start], &input[start..])
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
