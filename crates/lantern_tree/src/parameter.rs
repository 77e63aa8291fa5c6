//! Parameter descriptors.
//!
//! A [`ParameterDescriptor`] is the registration-time view of one parameter
//! of a command function: its name, declared [`TypeRef`], and options. The
//! tree builder turns descriptors into parameter nodes or deferred context
//! parameters.

use std::fmt;
use std::sync::Arc;

use crate::permission::CommandPermission;
use crate::suggestion::SuggestionProvider;

/// The declared type of a parameter.
///
/// The resolver pipeline maps a `TypeRef` to a parameter type or a context
/// resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    /// A signed integer.
    Int,
    /// A finite decimal number.
    Float,
    /// A boolean.
    Bool,
    /// A single character.
    Char,
    /// A single word or quoted string.
    String,
    /// One of a fixed set of names.
    Enum(EnumSpec),
    /// Whitespace-separated values of the inner type.
    List(Box<TypeRef>),
    /// A type registered by name, such as `"player"` or `"actor"`.
    Named(Arc<str>),
}

impl TypeRef {
    /// Creates a named type reference.
    #[must_use]
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(Arc::from(name.as_ref()))
    }

    /// Creates a list type reference.
    #[must_use]
    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    /// Returns true for numeric types.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Char => write!(f, "char"),
            Self::String => write!(f, "string"),
            Self::Enum(spec) => write!(f, "enum {}", spec.name()),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// An enumerated value set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumSpec {
    name: Arc<str>,
    variants: Arc<[Arc<str>]>,
}

impl EnumSpec {
    /// Creates an enum with the given canonical variant names.
    pub fn new<I, S>(name: impl AsRef<str>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: Arc::from(name.as_ref()),
            variants: variants
                .into_iter()
                .map(|v| Arc::from(v.as_ref()))
                .collect(),
        }
    }

    /// The enum's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical variant names, in declaration order.
    #[must_use]
    pub fn variants(&self) -> &[Arc<str>] {
        &self.variants
    }
}

/// Long and short names of a flag or switch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagSpec {
    /// Long name, used as `--name`. Defaults to the parameter name.
    pub long: Option<String>,
    /// Shorthand, used as `-x`. Defaults to the long name's first character.
    pub short: Option<char>,
}

impl FlagSpec {
    /// Resolves the long name against the parameter name.
    #[must_use]
    pub fn long_name<'a>(&'a self, parameter: &'a str) -> &'a str {
        self.long.as_deref().unwrap_or(parameter)
    }

    /// Resolves the shorthand against the parameter name.
    #[must_use]
    pub fn shorthand(&self, parameter: &str) -> Option<char> {
        self.short
            .or_else(|| self.long_name(parameter).chars().next())
    }
}

/// How a parameter is matched in input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ParameterKind {
    /// Matched by position.
    #[default]
    Positional,
    /// Matched by `--name value` or `-x value` anywhere in input.
    Flag(FlagSpec),
    /// A boolean set by `--name` or `-x` anywhere in input.
    Switch(FlagSpec),
}

/// Describes one parameter of a command function.
#[derive(Clone)]
pub struct ParameterDescriptor {
    name: String,
    ty: TypeRef,
    optional: bool,
    default: Option<String>,
    kind: ParameterKind,
    both_flag_and_switch: bool,
    single: bool,
    range: Option<(Option<f64>, Option<f64>)>,
    length: Option<(usize, usize)>,
    size: Option<(usize, usize)>,
    description: Option<String>,
    permission: Option<Arc<dyn CommandPermission>>,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
}

impl ParameterDescriptor {
    /// Creates a required positional parameter.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            default: None,
            kind: ParameterKind::Positional,
            both_flag_and_switch: false,
            single: false,
            range: None,
            length: None,
            size: None,
            description: None,
            permission: None,
            suggestions: None,
        }
    }

    /// Marks the parameter optional. Absent optional parameters resolve to nil.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets default input text used when the parameter is absent.
    /// Implies optional.
    #[must_use]
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default = Some(text.into());
        self.optional = true;
        self
    }

    /// Makes this a flag named after the parameter.
    #[must_use]
    pub fn flag(self) -> Self {
        self.flag_named(FlagSpec::default())
    }

    /// Makes this a flag with explicit names.
    #[must_use]
    pub fn flag_named(mut self, spec: FlagSpec) -> Self {
        self.both_flag_and_switch |= matches!(self.kind, ParameterKind::Switch(_));
        self.kind = ParameterKind::Flag(spec);
        self
    }

    /// Makes this a switch named after the parameter.
    #[must_use]
    pub fn switch(self) -> Self {
        self.switch_named(FlagSpec::default())
    }

    /// Makes this a switch with explicit names.
    #[must_use]
    pub fn switch_named(mut self, spec: FlagSpec) -> Self {
        self.both_flag_and_switch |= matches!(self.kind, ParameterKind::Flag(_));
        self.kind = ParameterKind::Switch(spec);
        self
    }

    /// Opts a trailing string parameter out of greedy promotion.
    #[must_use]
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Restricts a numeric parameter to an inclusive range.
    #[must_use]
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Bounds the character count of a string parameter, inclusive.
    #[must_use]
    pub fn with_length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    /// Bounds the number of entries in a list parameter, inclusive.
    #[must_use]
    pub fn with_size(mut self, min: usize, max: usize) -> Self {
        self.size = Some((min, max));
        self
    }

    /// Sets a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Requires a permission to supply this parameter.
    #[must_use]
    pub fn with_permission<P>(mut self, permission: P) -> Self
    where
        P: Fn(&dyn lantern_foundation::Actor) -> bool + Send + Sync + 'static,
    {
        self.permission = Some(Arc::new(permission));
        self
    }

    /// Sets an explicit suggestion source.
    #[must_use]
    pub fn with_suggestions(mut self, provider: impl SuggestionProvider + 'static) -> Self {
        self.suggestions = Some(Arc::new(provider));
        self
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub const fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    /// Returns a copy of this descriptor with another declared type.
    #[must_use]
    pub fn with_type(&self, ty: TypeRef) -> Self {
        Self {
            ty,
            range: None,
            size: None,
            ..self.clone()
        }
    }

    /// Whether the parameter may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// The default input text, if any.
    #[must_use]
    pub fn default_text(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// How the parameter is matched.
    #[must_use]
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Whether the parameter was declared both a flag and a switch.
    #[must_use]
    pub const fn is_flag_and_switch(&self) -> bool {
        self.both_flag_and_switch
    }

    /// Whether this is a flag or a switch.
    #[must_use]
    pub const fn is_flag_or_switch(&self) -> bool {
        !matches!(self.kind, ParameterKind::Positional)
    }

    /// Whether greedy promotion is disabled.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        self.single
    }

    /// The numeric range, if any.
    #[must_use]
    pub const fn range(&self) -> Option<(Option<f64>, Option<f64>)> {
        self.range
    }

    /// The string length bounds, if any.
    #[must_use]
    pub const fn length(&self) -> Option<(usize, usize)> {
        self.length
    }

    /// The list size bounds, if any.
    #[must_use]
    pub const fn size(&self) -> Option<(usize, usize)> {
        self.size
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The parameter permission, if any.
    #[must_use]
    pub fn permission(&self) -> Option<&Arc<dyn CommandPermission>> {
        self.permission.as_ref()
    }

    /// The explicit suggestion source, if any.
    #[must_use]
    pub fn suggestions(&self) -> Option<&Arc<dyn SuggestionProvider>> {
        self.suggestions.as_ref()
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("kind", &self.kind)
            .field("single", &self.single)
            .field("range", &self.range)
            .field("length", &self.length)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
