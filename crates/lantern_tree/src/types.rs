//! Parameter types.
//!
//! A [`ParameterType`] consumes text from the input stream and produces a
//! [`Value`]. The built-in types cover integers, floats, booleans,
//! characters, strings, lists, and enums. Hosts add their own by
//! implementing the trait and registering it with the resolver pipeline.

use std::sync::Arc;

use im::Vector;
use lantern_foundation::{CommandError, InputFormatCause, Result, Value};
use lantern_stream::StringStream;

use crate::context::ExecutionContext;
use crate::parameter::EnumSpec;

/// Tie-break order between parameter types when two otherwise equal
/// executions both match.
///
/// Ordered from most to least preferred, so `Highest < Lowest`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParsePriority {
    /// Preferred over everything else.
    Highest,
    /// The usual priority.
    #[default]
    Default,
    /// Tried last; used by free-form strings.
    Lowest,
}

/// Parses a value from input.
pub trait ParameterType: Send + Sync {
    /// A short name used in diagnostics.
    fn name(&self) -> &str;

    /// Consumes input and produces a value.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the input is not a valid value.
    fn parse(&self, input: &mut StringStream, context: &ExecutionContext<'_>) -> Result<Value>;

    /// Suggestions offered when no explicit provider is configured.
    fn default_suggestions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether this type consumes the rest of the input.
    fn is_greedy(&self) -> bool {
        false
    }

    /// A greedy replacement used when this type ends a command.
    fn greedy_variant(&self) -> Option<Arc<dyn ParameterType>> {
        None
    }

    /// The tie-break priority.
    fn parse_priority(&self) -> ParsePriority {
        ParsePriority::Default
    }
}

/// Signed 64-bit integers.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntType;

impl ParameterType for IntType {
    fn name(&self) -> &str {
        "int"
    }

    fn parse(&self, input: &mut StringStream, _context: &ExecutionContext<'_>) -> Result<Value> {
        input.read_int().map(Value::Int)
    }
}

/// Finite 64-bit floats.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatType;

impl ParameterType for FloatType {
    fn name(&self) -> &str {
        "float"
    }

    fn parse(&self, input: &mut StringStream, _context: &ExecutionContext<'_>) -> Result<Value> {
        input.read_float().map(Value::Float)
    }
}

/// Booleans.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolType;

impl ParameterType for BoolType {
    fn name(&self) -> &str {
        "bool"
    }

    fn parse(&self, input: &mut StringStream, _context: &ExecutionContext<'_>) -> Result<Value> {
        input.read_bool().map(Value::Bool)
    }

    fn default_suggestions(&self) -> Vec<String> {
        vec!["true".to_string(), "false".to_string()]
    }
}

/// A single character.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharType;

impl ParameterType for CharType {
    fn name(&self) -> &str {
        "char"
    }

    fn parse(&self, input: &mut StringStream, _context: &ExecutionContext<'_>) -> Result<Value> {
        let word = input.read_unquoted();
        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err(CommandError::parameter_parse(
                word,
                "expected a single character",
            )),
        }
    }
}

/// A word or quoted string, or with `greedy` the rest of the input.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringType {
    greedy: bool,
}

impl StringType {
    /// A single word or quoted string.
    #[must_use]
    pub const fn single() -> Self {
        Self { greedy: false }
    }

    /// Everything left in the input.
    #[must_use]
    pub const fn greedy() -> Self {
        Self { greedy: true }
    }
}

impl ParameterType for StringType {
    fn name(&self) -> &str {
        if self.greedy { "text" } else { "string" }
    }

    fn parse(&self, input: &mut StringStream, _context: &ExecutionContext<'_>) -> Result<Value> {
        if self.greedy {
            Ok(Value::from(input.consume_remaining()))
        } else {
            input.read_string().map(Value::from)
        }
    }

    fn is_greedy(&self) -> bool {
        self.greedy
    }

    fn greedy_variant(&self) -> Option<Arc<dyn ParameterType>> {
        (!self.greedy).then(|| Arc::new(Self::greedy()) as Arc<dyn ParameterType>)
    }

    fn parse_priority(&self) -> ParsePriority {
        ParsePriority::Lowest
    }
}

/// Whitespace-separated values of an inner type. Always greedy.
#[derive(Clone)]
pub struct ListType {
    inner: Arc<dyn ParameterType>,
    name: String,
}

impl ListType {
    /// Creates a list of `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn ParameterType>) -> Self {
        let name = format!("list<{}>", inner.name());
        Self { inner, name }
    }
}

impl ParameterType for ListType {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, input: &mut StringStream, context: &ExecutionContext<'_>) -> Result<Value> {
        let mut items = Vector::new();
        loop {
            input.skip_whitespace();
            if input.has_finished() {
                break;
            }
            items.push_back(self.inner.parse(input, context)?);
            if input.has_remaining() && !input.at_whitespace() {
                return Err(CommandError::input_format(
                    InputFormatCause::ExpectedWhitespace,
                ));
            }
        }
        Ok(Value::List(items))
    }

    fn default_suggestions(&self) -> Vec<String> {
        self.inner.default_suggestions()
    }

    fn is_greedy(&self) -> bool {
        true
    }
}

/// A lookup of enum variant names.
#[derive(Clone, Debug)]
pub struct EnumType {
    spec: EnumSpec,
    case_sensitive: bool,
}

impl EnumType {
    /// Creates a lookup over `spec`.
    #[must_use]
    pub const fn new(spec: EnumSpec, case_sensitive: bool) -> Self {
        Self {
            spec,
            case_sensitive,
        }
    }
}

impl ParameterType for EnumType {
    fn name(&self) -> &str {
        self.spec.name()
    }

    fn parse(&self, input: &mut StringStream, _context: &ExecutionContext<'_>) -> Result<Value> {
        let word = input.read_unquoted();
        let found = self.spec.variants().iter().find(|v| {
            let v: &str = v;
            if self.case_sensitive {
                v == word
            } else {
                v.eq_ignore_ascii_case(&word)
            }
        });
        match found {
            Some(variant) => Ok(Value::Variant(Arc::clone(variant))),
            None => {
                let expected: Vec<&str> = self.spec.variants().iter().map(|v| &**v).collect();
                Err(CommandError::parameter_parse(
                    word,
                    format!("expected one of: {}", expected.join(", ")),
                ))
            }
        }
    }

    fn default_suggestions(&self) -> Vec<String> {
        self.spec
            .variants()
            .iter()
            .map(|v| {
                if self.case_sensitive {
                    v.to_string()
                } else {
                    v.to_lowercase()
                }
            })
            .collect()
    }
}

/// Wraps a numeric type and rejects values outside an inclusive range.
#[derive(Clone)]
pub struct RangeChecked {
    inner: Arc<dyn ParameterType>,
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeChecked {
    /// Wraps `inner` with optional bounds.
    #[must_use]
    pub fn new(inner: Arc<dyn ParameterType>, min: Option<f64>, max: Option<f64>) -> Self {
        Self { inner, min, max }
    }
}

impl ParameterType for RangeChecked {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn parse(&self, input: &mut StringStream, context: &ExecutionContext<'_>) -> Result<Value> {
        let value = self.inner.parse(input, context)?;
        let Some(n) = value.as_number() else {
            return Ok(value);
        };
        if let Some(min) = self.min.filter(|min| n < *min) {
            return Err(CommandError::parameter_parse(
                value.to_string(),
                format!("must be at least {min}"),
            ));
        }
        if let Some(max) = self.max.filter(|max| n > *max) {
            return Err(CommandError::parameter_parse(
                value.to_string(),
                format!("must be at most {max}"),
            ));
        }
        Ok(value)
    }

    fn default_suggestions(&self) -> Vec<String> {
        self.inner.default_suggestions()
    }

    fn is_greedy(&self) -> bool {
        self.inner.is_greedy()
    }

    fn parse_priority(&self) -> ParsePriority {
        self.inner.parse_priority()
    }
}
