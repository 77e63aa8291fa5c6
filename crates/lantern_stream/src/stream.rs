//! A backtracking cursor over command text.
//!
//! Positions are byte offsets into the source and always sit on a `char`
//! boundary. Trial parsing saves a position with [`StringStream::position`]
//! and rolls back with [`StringStream::set_position`].

use std::ops::Range;

use lantern_foundation::{CommandError, InputFormatCause, Result};

const ESCAPE: char = '\\';
const DOUBLE_QUOTE: char = '"';

/// A cursor over a string with save/restore support.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringStream {
    source: String,
    pos: usize,
}

impl StringStream {
    /// Creates a stream positioned at the start of `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pos: 0,
        }
    }

    /// Returns the whole source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to `pos`, clamped to the source length.
    pub fn set_position(&mut self, pos: usize) {
        let mut pos = pos.min(self.source.len());
        while !self.source.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
    }

    /// Returns true if the source is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Returns true if there is at least one character left.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.pos < self.source.len()
    }

    /// Returns true if the cursor is at the end.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        !self.has_remaining()
    }

    /// Returns the unread text without consuming it.
    #[must_use]
    pub fn peek_remaining(&self) -> &str {
        &self.source[self.pos..]
    }

    /// Returns the next character without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.peek_remaining().chars().next()
    }

    /// Returns true if the next character is whitespace.
    #[must_use]
    pub fn at_whitespace(&self) -> bool {
        self.peek().is_some_and(char::is_whitespace)
    }

    /// Returns the next unquoted word without consuming it.
    #[must_use]
    pub fn peek_unquoted(&self) -> &str {
        let rest = self.peek_remaining();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Consumes and returns the next character.
    pub fn read_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advances past one character, if any.
    pub fn move_forward(&mut self) {
        self.read_char();
    }

    /// Skips all whitespace at the cursor.
    pub fn skip_whitespace(&mut self) {
        while self.at_whitespace() {
            self.move_forward();
        }
    }

    /// Skips a single whitespace character if one is at the cursor.
    pub fn skip_separator(&mut self) {
        if self.at_whitespace() {
            self.move_forward();
        }
    }

    /// Reads characters while `predicate` holds.
    pub fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.move_forward();
        }
        self.source[start..self.pos].to_string()
    }

    /// Reads up to the next whitespace.
    pub fn read_unquoted(&mut self) -> String {
        self.read_while(|c| !c.is_whitespace())
    }

    /// Reads until `delimiter`, honouring backslash escapes of the delimiter
    /// and of the backslash itself. The delimiter is consumed.
    ///
    /// # Errors
    ///
    /// Returns an input format error for an invalid escape or if the
    /// delimiter never appears.
    pub fn read_until(&mut self, delimiter: char) -> Result<String> {
        let mut result = String::new();
        let mut escaped = false;
        while let Some(c) = self.read_char() {
            if escaped {
                if c == delimiter || c == ESCAPE {
                    result.push(c);
                    escaped = false;
                } else {
                    self.pos -= c.len_utf8();
                    return Err(CommandError::input_format(
                        InputFormatCause::InvalidEscapeCharacter,
                    ));
                }
            } else if c == ESCAPE {
                escaped = true;
            } else if c == delimiter {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
        Err(CommandError::input_format(InputFormatCause::UnclosedQuote))
    }

    /// Reads a quoted string if the cursor is at a double quote, otherwise
    /// an unquoted word.
    ///
    /// # Errors
    ///
    /// Returns an input format error for a malformed quoted string.
    pub fn read_string(&mut self) -> Result<String> {
        if self.peek() == Some(DOUBLE_QUOTE) {
            self.move_forward();
            self.read_until(DOUBLE_QUOTE)
        } else {
            Ok(self.read_unquoted())
        }
    }

    /// Consumes and returns everything left.
    pub fn consume_remaining(&mut self) -> String {
        let rest = self.peek_remaining().to_string();
        self.pos = self.source.len();
        rest
    }

    /// Reads a signed 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns a parameter parse error if the word is not an integer.
    pub fn read_int(&mut self) -> Result<i64> {
        let word = self.read_unquoted();
        word.parse::<i64>()
            .map_err(|_| CommandError::parameter_parse(&word, "expected an integer"))
    }

    /// Reads a finite 64-bit float.
    ///
    /// # Errors
    ///
    /// Returns a parameter parse error if the word is not a finite number.
    pub fn read_float(&mut self) -> Result<f64> {
        let word = self.read_unquoted();
        match word.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(CommandError::parameter_parse(&word, "expected a decimal number")),
        }
    }

    /// Reads a boolean: `true`/`yes` or `false`/`no`/`nope`, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns a parameter parse error for any other word.
    pub fn read_bool(&mut self) -> Result<bool> {
        let word = self.read_string()?;
        match word.to_lowercase().as_str() {
            "true" | "yes" => Ok(true),
            "false" | "no" | "nope" => Ok(false),
            _ => Err(CommandError::parameter_parse(&word, "expected true or false")),
        }
    }

    /// Appends text to the source. Used to substitute default values for
    /// absent optional parameters.
    pub fn extend(&mut self, text: &str) {
        self.source.push_str(text);
    }
}

/// Removes the given byte ranges from `source`.
///
/// Ranges may arrive in any order and may overlap. Runs of whitespace left
/// behind at a seam collapse to a single space, and the result is trimmed.
#[must_use]
pub fn excise(source: &str, ranges: &[Range<usize>]) -> String {
    let mut sorted: Vec<Range<usize>> = ranges
        .iter()
        .map(|r| r.start.min(source.len())..r.end.min(source.len()))
        .filter(|r| r.start < r.end)
        .collect();
    sorted.sort_by_key(|r| r.start);

    let mut kept = String::with_capacity(source.len());
    let mut cursor = 0;
    for range in sorted {
        if range.start > cursor {
            push_collapsed(&mut kept, &source[cursor..range.start]);
        }
        cursor = cursor.max(range.end);
    }
    if cursor < source.len() {
        push_collapsed(&mut kept, &source[cursor..]);
    }
    kept.trim().to_string()
}

fn push_collapsed(out: &mut String, piece: &str) {
    if out.ends_with(char::is_whitespace) {
        out.push_str(piece.trim_start());
    } else if out.is_empty() || piece.starts_with(char::is_whitespace) {
        out.push_str(piece);
    } else {
        out.push(' ');
        out.push_str(piece);
    }
}
