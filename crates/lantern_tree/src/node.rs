//! Grammar nodes.
//!
//! An execution is a chain of [`CommandNode`]s. Literal nodes match a fixed
//! word; parameter nodes consume input through their parameter type. Nodes
//! are immutable once the tree builder produces them.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use lantern_foundation::{CommandError, Result, Value};
use lantern_stream::StringStream;

use crate::action::BoundAction;
use crate::context::ExecutionContext;
use crate::parameter::{FlagSpec, ParameterDescriptor, ParameterKind};
use crate::permission::{AlwaysPermitted, CommandPermission};
use crate::suggestion::SuggestionProvider;
use crate::types::{ParameterType, ParsePriority};

/// One segment of a command grammar.
#[derive(Clone, Debug)]
pub enum CommandNode {
    /// A fixed word.
    Literal(LiteralNode),
    /// A typed value.
    Parameter(ParameterNode),
}

impl CommandNode {
    /// The literal word or parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Literal(node) => node.name(),
            Self::Parameter(node) => node.name(),
        }
    }

    /// Returns true for literal nodes.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns the parameter node, if this is one.
    #[must_use]
    pub const fn as_parameter(&self) -> Option<&ParameterNode> {
        match self {
            Self::Parameter(node) => Some(node),
            Self::Literal(_) => None,
        }
    }

    /// Returns true for optional parameter nodes.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.as_parameter().is_some_and(ParameterNode::is_optional)
    }

    /// Returns true for flag and switch nodes.
    #[must_use]
    pub fn is_flag_or_switch(&self) -> bool {
        self.as_parameter().is_some_and(ParameterNode::is_flag_or_switch)
    }

    /// Whether this is the final node of its chain.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        match self {
            Self::Literal(node) => node.is_last,
            Self::Parameter(node) => node.is_last,
        }
    }

    /// The action, present on the final node and on optional nodes.
    #[must_use]
    pub fn action(&self) -> Option<&Arc<BoundAction>> {
        match self {
            Self::Literal(node) => node.action.as_ref(),
            Self::Parameter(node) => node.action.as_ref(),
        }
    }

    /// How the node appears in usage strings.
    #[must_use]
    pub fn representation(&self) -> String {
        match self {
            Self::Literal(node) => node.name.clone(),
            Self::Parameter(node) => node.representation(),
        }
    }

    /// Tie-break between two terminal nodes. `Less` means `self` is preferred.
    ///
    /// Literals beat parameters; required parameters beat optional ones;
    /// otherwise the parameter types' parse priorities decide.
    #[must_use]
    pub fn precedence(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Literal(_), Self::Literal(_)) => Ordering::Equal,
            (Self::Literal(_), Self::Parameter(_)) => Ordering::Less,
            (Self::Parameter(_), Self::Literal(_)) => Ordering::Greater,
            (Self::Parameter(a), Self::Parameter(b)) => a
                .optional
                .cmp(&b.optional)
                .then_with(|| a.parse_priority().cmp(&b.parse_priority())),
        }
    }

    pub(crate) fn mark_last(&mut self) {
        match self {
            Self::Literal(node) => node.is_last = true,
            Self::Parameter(node) => node.is_last = true,
        }
    }

    pub(crate) fn set_action(&mut self, action: Arc<BoundAction>) {
        match self {
            Self::Literal(node) => node.action = Some(action),
            Self::Parameter(node) => node.action = Some(action),
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.representation())
    }
}

/// A node that matches a fixed word, case-insensitively.
#[derive(Clone, Debug)]
pub struct LiteralNode {
    name: String,
    is_last: bool,
    action: Option<Arc<BoundAction>>,
}

impl LiteralNode {
    /// Creates a literal node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_last: false,
            action: None,
        }
    }

    /// The literal word.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `word` matches this literal.
    #[must_use]
    pub fn matches(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
    }
}

/// A node that consumes and parses a typed value.
#[derive(Clone)]
pub struct ParameterNode {
    descriptor: ParameterDescriptor,
    ty: Arc<dyn ParameterType>,
    permission: Arc<dyn CommandPermission>,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
    optional: bool,
    is_last: bool,
    action: Option<Arc<BoundAction>>,
}

impl ParameterNode {
    /// Creates a parameter node from a descriptor and its resolved type.
    #[must_use]
    pub fn new(descriptor: ParameterDescriptor, ty: Arc<dyn ParameterType>) -> Self {
        let permission = descriptor
            .permission()
            .cloned()
            .unwrap_or_else(|| Arc::new(AlwaysPermitted));
        let suggestions = descriptor.suggestions().cloned();
        let optional = descriptor.is_optional();
        Self {
            descriptor,
            ty,
            permission,
            suggestions,
            optional,
            is_last: false,
            action: None,
        }
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The descriptor this node was built from.
    #[must_use]
    pub const fn descriptor(&self) -> &ParameterDescriptor {
        &self.descriptor
    }

    /// The parameter type.
    #[must_use]
    pub fn parameter_type(&self) -> &Arc<dyn ParameterType> {
        &self.ty
    }

    /// The permission required to supply this parameter.
    #[must_use]
    pub fn permission(&self) -> &Arc<dyn CommandPermission> {
        &self.permission
    }

    /// The explicit suggestion source, if any.
    #[must_use]
    pub fn suggestions(&self) -> Option<&Arc<dyn SuggestionProvider>> {
        self.suggestions.as_ref()
    }

    /// Whether the parameter may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the parameter type consumes the rest of the input.
    #[must_use]
    pub fn is_greedy(&self) -> bool {
        self.ty.is_greedy()
    }

    /// The parameter type's tie-break priority.
    #[must_use]
    pub fn parse_priority(&self) -> ParsePriority {
        self.ty.parse_priority()
    }

    /// Returns true for flags.
    #[must_use]
    pub const fn is_flag(&self) -> bool {
        matches!(self.descriptor.kind(), ParameterKind::Flag(_))
    }

    /// Returns true for switches.
    #[must_use]
    pub const fn is_switch(&self) -> bool {
        matches!(self.descriptor.kind(), ParameterKind::Switch(_))
    }

    /// Returns true for flags and switches.
    #[must_use]
    pub const fn is_flag_or_switch(&self) -> bool {
        self.descriptor.is_flag_or_switch()
    }

    fn flag_spec(&self) -> Option<&FlagSpec> {
        match self.descriptor.kind() {
            ParameterKind::Flag(spec) | ParameterKind::Switch(spec) => Some(spec),
            ParameterKind::Positional => None,
        }
    }

    /// The `--long` name of a flag or switch.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.flag_spec().map(|spec| spec.long_name(self.name()))
    }

    /// The `-x` shorthand of a flag or switch.
    #[must_use]
    pub fn shorthand(&self) -> Option<char> {
        self.flag_spec().and_then(|spec| spec.shorthand(self.name()))
    }

    /// Parses this parameter from `input`.
    ///
    /// Checks the parameter permission first. At the end of input an
    /// optional parameter parses its default text, or yields nil without a
    /// default; a required one fails with a missing argument error.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] for a denied permission, a missing
    /// argument, or input the parameter type rejects.
    pub fn parse(&self, input: &mut StringStream, context: &ExecutionContext<'_>) -> Result<Value> {
        if !self.permission.is_executable_by(context.actor()) {
            return Err(CommandError::no_permission(self.name()));
        }
        if input.has_finished() {
            if !self.optional {
                return Err(CommandError::missing_argument(self.name()));
            }
            match self.descriptor.default_text() {
                Some(text) => input.extend(text),
                None => return Ok(Value::Nil),
            }
        }
        self.ty.parse(input, context)
    }

    /// Resolves the value of a parameter that does not appear in the input.
    ///
    /// Switches are false. Otherwise the default text is parsed, or nil is
    /// returned for an optional parameter without one. No permission is
    /// required to leave a parameter out.
    ///
    /// # Errors
    ///
    /// Returns a missing argument error for a required parameter, or the
    /// type's error if the default text does not parse.
    pub fn resolve_absent(&self, context: &ExecutionContext<'_>) -> Result<Value> {
        if self.is_switch() {
            return Ok(Value::Bool(false));
        }
        match self.descriptor.default_text() {
            Some(text) => self.ty.parse(&mut StringStream::new(text), context),
            None if self.optional => Ok(Value::Nil),
            None => Err(CommandError::missing_argument(self.name())),
        }
    }

    fn representation(&self) -> String {
        let name = self.name();
        let body = match (self.long_name(), self.is_switch()) {
            (Some(long), true) => format!("--{long}"),
            (Some(long), false) => format!("--{long} <{name}>"),
            (None, _) => format!("<{name}>"),
        };
        if self.optional || self.is_switch() {
            if self.is_flag_or_switch() {
                format!("[{body}]")
            } else {
                format!("[{name}]")
            }
        } else {
            body
        }
    }

    pub(crate) fn promote_to(&mut self, ty: Arc<dyn ParameterType>) {
        self.ty = ty;
    }

    pub(crate) fn force_optional(&mut self) {
        self.optional = true;
    }
}

impl fmt::Debug for ParameterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterNode")
            .field("name", &self.name())
            .field("type", &self.ty.name())
            .field("optional", &self.optional)
            .field("is_last", &self.is_last)
            .finish_non_exhaustive()
    }
}
