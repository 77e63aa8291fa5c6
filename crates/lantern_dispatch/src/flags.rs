//! Flag and switch extraction.
//!
//! Flags and switches may appear anywhere in the input, so they are pulled
//! out in one left-to-right pass before positional parsing. Every matched
//! span is excised and the residual text is returned for the node walk.

use std::collections::HashSet;
use std::ops::Range;

use lantern_foundation::{CommandError, ErrorContext, InputFormatCause, Value};
use lantern_stream::{StringStream, excise};
use lantern_tree::{Execution, ExecutionContext, ParameterNode};

use crate::settings::DispatcherSettings;

/// Extracts every flag and switch of the context's execution from `input`.
///
/// Resolved values are stored in the context's arguments. Flags absent from
/// the input resolve to their defaults and switches to false. When a flag
/// appears more than once, the last occurrence wins. A bare long prefix
/// (`--`) ends the scan, and words that parse as numbers are not treated
/// as shorthands when negative numbers are values.
///
/// # Errors
///
/// Returns an unknown parameter error for an unrecognised flag name or
/// shorthand, a missing argument error for an absent required flag, or the
/// parse error of a flag value.
pub fn extract_flags(
    settings: &DispatcherSettings,
    input: &StringStream,
    context: &mut ExecutionContext<'_>,
) -> Result<StringStream, CommandError> {
    let execution = context.execution();
    let mut scan = input.clone();
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut matched: HashSet<&str> = HashSet::new();

    loop {
        scan.skip_whitespace();
        if scan.has_finished() {
            break;
        }
        let start = scan.position();
        let word = scan.peek_unquoted().to_string();

        if word == settings.long_prefix {
            scan.read_unquoted();
            ranges.push(start..scan.position());
            break;
        }

        if let Some(name) = long_name(settings, &word) {
            scan.read_unquoted();
            let node = find_long(execution, name).ok_or_else(|| unknown(execution, name, false))?;
            parse_next(node, &mut scan, context)?;
            matched.insert(node.name());
            ranges.push(start..scan.position());
        } else if let Some(shorthands) = shorthands(settings, &word) {
            scan.read_unquoted();
            for shorthand in shorthands.chars() {
                let node = find_short(execution, shorthand)
                    .ok_or_else(|| unknown(execution, &shorthand.to_string(), true))?;
                parse_next(node, &mut scan, context)?;
                matched.insert(node.name());
            }
            ranges.push(start..scan.position());
        } else if word.starts_with('"') {
            if scan.read_string().is_err() {
                scan.set_position(start);
                scan.read_unquoted();
            }
        } else {
            scan.read_unquoted();
        }
    }

    for node in execution.flags().filter(|node| !matched.contains(node.name())) {
        let value = node
            .resolve_absent(context)
            .map_err(|err| err.with_context(parameter_context(execution, node, "")))?;
        context.arguments_mut().insert(node.name(), value);
    }

    Ok(StringStream::new(excise(scan.source(), &ranges)))
}

pub(crate) fn long_name<'w>(settings: &DispatcherSettings, word: &'w str) -> Option<&'w str> {
    word.strip_prefix(settings.long_prefix.as_str())
        .filter(|name| !name.is_empty())
}

/// The shorthand cluster of `word`, unless `word` is a number such as `-5`
/// or `-.5` and negative numbers are values.
pub(crate) fn shorthands<'w>(settings: &DispatcherSettings, word: &'w str) -> Option<&'w str> {
    let rest = word
        .strip_prefix(settings.short_prefix.as_str())
        .filter(|rest| !rest.is_empty())?;
    let numeric = rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') && word.parse::<f64>().is_ok();
    if settings.negative_numbers_are_values && numeric {
        return None;
    }
    Some(rest)
}

pub(crate) fn find_long<'e>(execution: &'e Execution, name: &str) -> Option<&'e ParameterNode> {
    execution
        .flags()
        .find(|node| node.long_name().is_some_and(|long| long.eq_ignore_ascii_case(name)))
}

pub(crate) fn find_short(execution: &Execution, shorthand: char) -> Option<&ParameterNode> {
    execution
        .flags()
        .find(|node| node.shorthand() == Some(shorthand))
}

fn unknown(execution: &Execution, name: &str, shorthand: bool) -> CommandError {
    CommandError::unknown_parameter(name, shorthand).with_context(ErrorContext::UnknownParameter {
        path: execution.path().to_string(),
    })
}

fn parameter_context(execution: &Execution, node: &ParameterNode, remaining: &str) -> ErrorContext {
    ErrorContext::ParsingParameter {
        path: execution.path().to_string(),
        parameter: node.name().to_string(),
        node_index: execution.node_index(node.name()).unwrap_or_default(),
        remaining: remaining.to_string(),
    }
}

/// Resolves one matched flag or switch at the scan position.
fn parse_next(
    node: &ParameterNode,
    scan: &mut StringStream,
    context: &mut ExecutionContext<'_>,
) -> Result<(), CommandError> {
    let execution = context.execution();
    let remaining = scan.peek_remaining().to_string();
    let value = if node.is_switch() {
        if node.permission().is_executable_by(context.actor()) {
            Ok(Value::Bool(true))
        } else {
            Err(CommandError::no_permission(node.name()))
        }
    } else if scan.has_remaining() && !scan.at_whitespace() {
        Err(CommandError::input_format(InputFormatCause::ExpectedWhitespace))
    } else {
        scan.skip_whitespace();
        node.parse(scan, context)
    };
    let value = value.map_err(|err| err.with_context(parameter_context(execution, node, &remaining)))?;
    context.arguments_mut().insert(node.name(), value);
    Ok(())
}
