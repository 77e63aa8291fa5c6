//! Error types for the Lantern system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! There are three families:
//! - [`ConfigError`] aborts registration of a command grammar.
//! - [`CommandError`] eliminates one candidate during dispatch.
//! - [`ActionError`] is raised by a command's action after a successful parse.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result alias for per-trial operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// A grammar or registration error.
///
/// These are programmer errors: they surface when a command is registered,
/// never during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The command path contains no tokens.
    #[error("command path is empty")]
    EmptyPath,

    /// A command function was declared without any path.
    #[error("command function has no paths")]
    NoPaths,

    /// A placeholder such as `<>` has no name.
    #[error("placeholder at byte {position} of '{path}' has no name")]
    EmptyPlaceholder {
        /// The full path being parsed.
        path: String,
        /// Byte offset of the placeholder.
        position: usize,
    },

    /// A placeholder was opened but never closed.
    #[error("unterminated placeholder in '{path}'")]
    UnterminatedPlaceholder {
        /// The full path being parsed.
        path: String,
    },

    /// A placeholder names a parameter the function does not declare.
    #[error("no parameter named '{name}' (available: {available})")]
    UnknownPlaceholder {
        /// The placeholder name.
        name: String,
        /// Comma-separated names still available.
        available: String,
    },

    /// The same placeholder appears twice in one path.
    #[error("placeholder '{name}' appears more than once")]
    DuplicatePlaceholder {
        /// The repeated name.
        name: String,
    },

    /// A placeholder binds a parameter that resolves from context.
    #[error("placeholder '{name}' resolves from context and cannot consume input")]
    ContextPlaceholder {
        /// The parameter name.
        name: String,
    },

    /// The grammar does not start with a literal.
    #[error("first node must be a literal, found parameter '{name}'")]
    LeadingParameter {
        /// The offending parameter.
        name: String,
    },

    /// A literal appears after an optional parameter.
    #[error(
        "literal '{literal}' sits between optional parameters in '{path}'; \
         optional parameters must all come at the end"
    )]
    LiteralAfterOptional {
        /// The literal.
        literal: String,
        /// The full path.
        path: String,
    },

    /// A required parameter appears after an optional parameter.
    #[error(
        "required parameter '{name}' sits between optional parameters in '{path}'; \
         optional parameters must all come at the end"
    )]
    RequiredAfterOptional {
        /// The parameter.
        name: String,
        /// The full path.
        path: String,
    },

    /// A greedy parameter is not the final positional node.
    #[error("greedy parameter '{name}' must be the last positional parameter")]
    GreedyNotLast {
        /// The greedy parameter.
        name: String,
    },

    /// More than one greedy parameter was declared.
    #[error("found more than one greedy parameter ('{first}' and '{second}')")]
    MultipleGreedy {
        /// The first greedy parameter.
        first: String,
        /// The second greedy parameter.
        second: String,
    },

    /// No resolver factory accepts the parameter.
    #[error("no resolver for parameter '{name}' of type {ty}")]
    UnresolvableType {
        /// The parameter.
        name: String,
        /// The declared type.
        ty: String,
    },

    /// Two flags or switches share a long name.
    #[error("duplicate flag name '{0}'")]
    DuplicateFlagName(String),

    /// Two flags or switches share a shorthand.
    #[error("duplicate flag shorthand '{0}'")]
    DuplicateShorthand(char),

    /// A parameter is declared as both a flag and a switch.
    #[error("parameter '{name}' cannot be both a flag and a switch")]
    FlagAndSwitch {
        /// The parameter.
        name: String,
    },

    /// A command has both an explicit priority and the low-priority marker.
    #[error("'{path}' cannot have both an explicit priority and the low-priority marker")]
    ConflictingPriority {
        /// The command path.
        path: String,
    },
}

/// A per-trial dispatch failure.
///
/// A failed trial eliminates one candidate; the dispatcher keeps trying the
/// others. The context identifies the node that caused the failure.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct CommandError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Where the error occurred.
    pub context: Option<ErrorContext>,
}

impl CommandError {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error, keeping any context already present.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    /// Creates an unknown command error.
    #[must_use]
    pub fn unknown_command(input: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownCommand {
            input: input.into(),
        })
    }

    /// Creates a literal mismatch error.
    #[must_use]
    pub fn structural_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::new(ErrorKind::StructuralMismatch {
            expected: expected.into(),
            found: found.into(),
        })
    }

    /// Creates a missing argument error.
    #[must_use]
    pub fn missing_argument(parameter: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingArgument {
            parameter: parameter.into(),
        })
    }

    /// Creates a parameter parse error.
    #[must_use]
    pub fn parameter_parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParameterParse {
            input: input.into(),
            message: message.into(),
        })
    }

    /// Creates an unknown flag or switch error.
    #[must_use]
    pub fn unknown_parameter(name: impl Into<String>, shorthand: bool) -> Self {
        Self::new(ErrorKind::UnknownParameter {
            name: name.into(),
            shorthand,
        })
    }

    /// Creates an input format error.
    #[must_use]
    pub fn input_format(cause: InputFormatCause) -> Self {
        Self::new(ErrorKind::InputFormat(cause))
    }

    /// Creates a permission error.
    #[must_use]
    pub fn no_permission(target: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoPermission {
            target: target.into(),
        })
    }

    /// Creates a condition failure.
    #[must_use]
    pub fn condition(reason: ConditionReason) -> Self {
        Self::new(ErrorKind::ConditionFailure(reason))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// No registered command starts with the first input word.
    #[error("unknown command: {input}")]
    UnknownCommand {
        /// The first word of the input.
        input: String,
    },

    /// A literal in the input does not match the expected literal node.
    #[error("expected '{expected}', found '{found}'")]
    StructuralMismatch {
        /// The literal the grammar expects.
        expected: String,
        /// What the input contained.
        found: String,
    },

    /// A required parameter is absent and has no default.
    #[error("missing argument: {parameter}")]
    MissingArgument {
        /// The parameter name.
        parameter: String,
    },

    /// A parameter type rejected the input.
    #[error("invalid value '{input}': {message}")]
    ParameterParse {
        /// The rejected text.
        input: String,
        /// Why it was rejected.
        message: String,
    },

    /// A flag or switch token names nothing the command declares.
    #[error("unknown flag or switch '{name}'")]
    UnknownParameter {
        /// The name or shorthand used.
        name: String,
        /// Whether the short form was used.
        shorthand: bool,
    },

    /// Malformed quoting or whitespace.
    #[error("malformed input: {0}")]
    InputFormat(InputFormatCause),

    /// The actor may not use this command or parameter.
    #[error("no permission to use {target}")]
    NoPermission {
        /// The command path or parameter name.
        target: String,
    },

    /// A command condition vetoed execution.
    #[error("{0}")]
    ConditionFailure(ConditionReason),
}

/// Why input could not be tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputFormatCause {
    /// A backslash precedes a character that cannot be escaped.
    #[error("invalid escape character")]
    InvalidEscapeCharacter,
    /// A quoted string was never closed.
    #[error("unclosed quote")]
    UnclosedQuote,
    /// Two tokens were not separated by whitespace.
    #[error("expected whitespace")]
    ExpectedWhitespace,
}

/// Why a command condition failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionReason {
    /// The actor is still on cooldown.
    Cooldown {
        /// Time left before the command may run again.
        remaining: Duration,
    },
    /// A custom condition failed with a message.
    Custom(String),
}

impl fmt::Display for ConditionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooldown { remaining } => {
                write!(f, "on cooldown for another {}ms", remaining.as_millis())
            }
            Self::Custom(message) => write!(f, "{message}"),
        }
    }
}

/// Where a per-trial error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// No command matched the first word.
    UnknownCommand {
        /// The raw input.
        input: String,
    },
    /// Parsing a literal node failed.
    ParsingLiteral {
        /// Path of the command being tried.
        path: String,
        /// The expected literal.
        literal: String,
        /// Index of the node in the chain.
        node_index: usize,
    },
    /// Parsing a parameter node failed.
    ParsingParameter {
        /// Path of the command being tried.
        path: String,
        /// The parameter name.
        parameter: String,
        /// Index of the node in the chain.
        node_index: usize,
        /// Input left when parsing started.
        remaining: String,
    },
    /// A flag or switch token was not recognised.
    UnknownParameter {
        /// Path of the command being tried.
        path: String,
    },
    /// A condition or the action itself failed.
    ExecutingFunction {
        /// Path of the command.
        path: String,
    },
}

impl ErrorContext {
    /// Returns the command path this context refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownCommand { .. } => None,
            Self::ParsingLiteral { path, .. }
            | Self::ParsingParameter { path, .. }
            | Self::UnknownParameter { path }
            | Self::ExecutingFunction { path } => Some(path),
        }
    }

    /// Returns the index of the node that failed, if a node was involved.
    #[must_use]
    pub fn node_index(&self) -> Option<usize> {
        match self {
            Self::ParsingLiteral { node_index, .. } | Self::ParsingParameter { node_index, .. } => {
                Some(*node_index)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { input } => write!(f, "while dispatching '{input}'"),
            Self::ParsingLiteral {
                path,
                literal,
                node_index,
            } => write!(f, "at literal '{literal}' (node {node_index}) of '{path}'"),
            Self::ParsingParameter {
                path,
                parameter,
                node_index,
                remaining,
            } => {
                write!(f, "at parameter '{parameter}' (node {node_index}) of '{path}'")?;
                if !remaining.is_empty() {
                    write!(f, " with input '{remaining}'")?;
                }
                Ok(())
            }
            Self::UnknownParameter { path } => write!(f, "while reading flags of '{path}'"),
            Self::ExecutingFunction { path } => write!(f, "while executing '{path}'"),
        }
    }
}

/// An error raised by a command's action, or by resolving its context
/// parameters, after the input parsed successfully.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A plain failure message.
    #[error("{0}")]
    Message(String),

    /// A context parameter could not be resolved.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Any other error raised by the action.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    /// Creates an action error from a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
