//! Compiled command grammars.
//!
//! An [`Execution`] is one immutable node chain plus the metadata the
//! dispatcher needs to rank it against other candidates.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use crate::action::BoundAction;
use crate::node::{CommandNode, ParameterNode};
use crate::permission::CommandPermission;

static NEXT_EXECUTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a compiled execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(u64);

impl ExecutionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_EXECUTION_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution#{}", self.0)
    }
}

/// Metadata copied from the command function into each execution.
#[derive(Clone, Default)]
pub(crate) struct ExecutionMeta {
    pub description: Option<String>,
    pub usage: Option<String>,
    pub priority: Option<i32>,
    pub low_priority: bool,
    pub secret: bool,
    pub cooldown: Option<Duration>,
    pub permission: Option<Arc<dyn CommandPermission>>,
}

/// One compiled command grammar.
pub struct Execution {
    id: ExecutionId,
    nodes: Vec<CommandNode>,
    parameters: HashMap<String, usize>,
    path: String,
    usage: String,
    sibling_path: String,
    optional_count: usize,
    required_count: usize,
    contains_flags: bool,
    meta: ExecutionMeta,
}

impl Execution {
    pub(crate) fn new(nodes: Vec<CommandNode>, meta: ExecutionMeta) -> Self {
        let parameters = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_literal())
            .map(|(index, node)| (node.name().to_string(), index))
            .collect();
        let path = nodes
            .iter()
            .map(CommandNode::representation)
            .collect::<Vec<_>>()
            .join(" ");
        let last_literal = nodes.iter().rposition(CommandNode::is_literal).unwrap_or(0);
        let sibling_path = nodes[..last_literal]
            .iter()
            .map(CommandNode::representation)
            .collect::<Vec<_>>()
            .join(" ");
        let optional_count = nodes.iter().filter(|n| n.is_optional()).count();
        let usage = meta.usage.clone().unwrap_or_else(|| path.clone());
        Self {
            id: ExecutionId::next(),
            optional_count,
            required_count: nodes.len() - optional_count,
            contains_flags: nodes.iter().any(CommandNode::is_flag_or_switch),
            nodes,
            parameters,
            path,
            usage,
            sibling_path,
            meta,
        }
    }

    /// The execution's unique id.
    #[must_use]
    pub const fn id(&self) -> ExecutionId {
        self.id
    }

    /// All nodes, literals first, flags and switches last.
    #[must_use]
    pub fn nodes(&self) -> &[CommandNode] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: an execution has at least its leading literal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The leading literal.
    #[must_use]
    pub fn name(&self) -> &str {
        self.nodes.first().map_or("", CommandNode::name)
    }

    /// The rendered grammar, e.g. `foo <a> [b]`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The usage string; defaults to the path.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    /// The explicit priority, if any. Lower values win.
    #[must_use]
    pub const fn priority(&self) -> Option<i32> {
        self.meta.priority
    }

    /// Whether the execution carries the low-priority marker.
    #[must_use]
    pub const fn is_low_priority(&self) -> bool {
        self.meta.low_priority
    }

    /// Whether the execution is hidden from listings and completion.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        self.meta.secret
    }

    /// The cooldown between uses by one actor, if any.
    #[must_use]
    pub const fn cooldown(&self) -> Option<Duration> {
        self.meta.cooldown
    }

    /// The command-level permission, if any.
    #[must_use]
    pub fn permission(&self) -> Option<&Arc<dyn CommandPermission>> {
        self.meta.permission.as_ref()
    }

    /// Number of optional parameter nodes.
    #[must_use]
    pub const fn optional_count(&self) -> usize {
        self.optional_count
    }

    /// Number of literal and required parameter nodes.
    #[must_use]
    pub const fn required_count(&self) -> usize {
        self.required_count
    }

    /// Whether any node is a flag or switch.
    #[must_use]
    pub const fn contains_flags(&self) -> bool {
        self.contains_flags
    }

    /// Looks up a parameter node by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterNode> {
        self.parameters
            .get(name)
            .and_then(|&index| self.nodes[index].as_parameter())
    }

    /// Index of the node for parameter `name`.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.parameters.get(name).copied()
    }

    /// Iterates over the flag and switch nodes.
    pub fn flags(&self) -> impl Iterator<Item = &ParameterNode> {
        self.nodes
            .iter()
            .filter_map(CommandNode::as_parameter)
            .filter(|p| p.is_flag_or_switch())
    }

    /// Iterates over literal and positional parameter nodes.
    pub fn positional(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.iter().filter(|n| !n.is_flag_or_switch())
    }

    /// The final positional node, used for ranking.
    #[must_use]
    pub fn last_positional(&self) -> Option<&CommandNode> {
        self.positional().last()
    }

    /// The terminal action.
    #[must_use]
    pub fn action(&self) -> Option<&Arc<BoundAction>> {
        self.nodes.last().and_then(CommandNode::action)
    }

    /// Whether this execution shares everything but its last literal and
    /// what follows with `other`.
    #[must_use]
    pub fn is_sibling_of(&self, other: &Self) -> bool {
        self.id != other.id && self.sibling_path.eq_ignore_ascii_case(&other.sibling_path)
    }

    /// Whether this execution's path extends `other`'s path by whole words.
    #[must_use]
    pub fn is_child_of(&self, other: &Self) -> bool {
        self.id != other.id
            && self.path.len() > other.path.len()
            && self.path.starts_with(&other.path)
            && self.path[other.path.len()..].starts_with(' ')
    }

    /// Compares explicit priorities and the low-priority marker.
    ///
    /// `Less` means `self` ranks higher. Priorities are compared only when
    /// both executions carry one.
    #[must_use]
    pub fn precedence(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.priority(), other.priority()) {
            if a != b {
                return a.cmp(&b);
            }
        }
        self.is_low_priority().cmp(&other.is_low_priority())
    }

    /// Compares structural specificity. `Less` means `self` ranks higher.
    ///
    /// More nodes win, then a required final node beats an optional one,
    /// then the final nodes' own precedence decides.
    #[must_use]
    pub fn specificity(&self, other: &Self) -> Ordering {
        other.len().cmp(&self.len()).then_with(|| {
            match (self.last_positional(), other.last_positional()) {
                (Some(a), Some(b)) => a
                    .is_optional()
                    .cmp(&b.is_optional())
                    .then_with(|| a.precedence(b)),
                _ => Ordering::Equal,
            }
        })
    }

    /// Full static ranking: precedence, then specificity.
    #[must_use]
    pub fn rank(&self, other: &Self) -> Ordering {
        self.precedence(other).then_with(|| self.specificity(other))
    }
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("nodes", &self.nodes)
            .field("priority", &self.meta.priority)
            .field("low_priority", &self.meta.low_priority)
            .field("secret", &self.meta.secret)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}
