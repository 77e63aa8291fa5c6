//! Command path tokenization.
//!
//! A path is a space-separated list of literal words and placeholders.
//! `<name>` binds a parameter as declared; `[name]` binds it and forces it
//! optional.

use std::fmt;

use lantern_foundation::ConfigError;

use crate::stream::StringStream;

/// A token from a command path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathToken {
    /// A literal word that must appear in the input.
    Literal(String),
    /// A reference to a named parameter.
    Parameter {
        /// The parameter name.
        name: String,
        /// Whether the placeholder used square brackets.
        optional: bool,
    },
}

impl PathToken {
    /// Returns the literal word or parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Literal(name) | Self::Parameter { name, .. } => name,
        }
    }

    /// Returns true for literal tokens.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => write!(f, "{name}"),
            Self::Parameter {
                name,
                optional: false,
            } => write!(f, "<{name}>"),
            Self::Parameter {
                name,
                optional: true,
            } => write!(f, "[{name}]"),
        }
    }
}

/// Reads tokens from a command path one at a time.
pub struct PathTokenizer {
    stream: StringStream,
}

impl PathTokenizer {
    /// Creates a tokenizer over `path`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            stream: StringStream::new(path),
        }
    }

    /// Returns true if another token follows.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        !self.stream.peek_remaining().trim_start().is_empty()
    }

    /// Returns the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns the same error [`PathTokenizer::read_token`] would.
    pub fn peek_token(&mut self) -> Result<Option<PathToken>, ConfigError> {
        let saved = self.stream.position();
        let token = self.read_token();
        self.stream.set_position(saved);
        token
    }

    /// Consumes the next token, or returns `None` at the end of the path.
    ///
    /// # Errors
    ///
    /// Returns a config error for an empty or unterminated placeholder.
    pub fn read_token(&mut self) -> Result<Option<PathToken>, ConfigError> {
        self.stream.skip_whitespace();
        let start = self.stream.position();
        let close = match self.stream.peek() {
            None => return Ok(None),
            Some('<') => '>',
            Some('[') => ']',
            Some(_) => return Ok(Some(PathToken::Literal(self.stream.read_unquoted()))),
        };

        self.stream.move_forward();
        let name = self.stream.read_while(|c| c != close && !c.is_whitespace());
        if self.stream.read_char() != Some(close) {
            return Err(ConfigError::UnterminatedPlaceholder {
                path: self.stream.source().to_string(),
            });
        }
        if name.is_empty() {
            return Err(ConfigError::EmptyPlaceholder {
                path: self.stream.source().to_string(),
                position: start,
            });
        }
        Ok(Some(PathToken::Parameter {
            name,
            optional: close == ']',
        }))
    }
}

impl Iterator for PathTokenizer {
    type Item = Result<PathToken, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_token().transpose()
    }
}

/// Tokenizes a whole path.
///
/// # Errors
///
/// Returns [`ConfigError::EmptyPath`] for a blank path, or the first
/// placeholder error.
pub fn tokenize_path(path: &str) -> Result<Vec<PathToken>, ConfigError> {
    let tokens = PathTokenizer::new(path).collect::<Result<Vec<_>, _>>()?;
    if tokens.is_empty() {
        return Err(ConfigError::EmptyPath);
    }
    Ok(tokens)
}
