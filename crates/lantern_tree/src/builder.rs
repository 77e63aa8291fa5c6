//! Grammar tree construction.
//!
//! The [`TreeBuilder`] compiles a [`CommandFunction`] path into an
//! [`Execution`]:
//!
//! 1. The path is tokenized into literals and placeholders.
//! 2. Each placeholder pops the parameter it names and resolves its type.
//! 3. Parameters the path never mentions are appended in declaration order,
//!    except context-resolved ones, which are deferred to the action.
//! 4. Flags and switches are moved after the positional nodes.
//! 5. A trailing single-word string parameter is promoted to greedy.
//!
//! Any invariant violation aborts with a [`ConfigError`].

use std::collections::HashSet;
use std::sync::Arc;

use lantern_foundation::ConfigError;
use lantern_stream::{PathToken, tokenize_path};
use tracing::debug;

use crate::action::BoundAction;
use crate::execution::Execution;
use crate::function::CommandFunction;
use crate::node::{CommandNode, LiteralNode, ParameterNode};
use crate::parameter::ParameterDescriptor;
use crate::resolver::{Resolver, ResolverPipeline};

/// Compiles command functions into executions.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilder<'a> {
    pipeline: &'a ResolverPipeline,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder resolving parameters through `pipeline`.
    #[must_use]
    pub const fn new(pipeline: &'a ResolverPipeline) -> Self {
        Self { pipeline }
    }

    /// Compiles every path of `function`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] any path produces.
    pub fn build_all(&self, function: &CommandFunction) -> Result<Vec<Execution>, ConfigError> {
        if function.paths().is_empty() {
            return Err(ConfigError::NoPaths);
        }
        function
            .paths()
            .iter()
            .map(|path| self.build(function, path))
            .collect()
    }

    /// Compiles `function` at one path.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a malformed path, an unknown or
    /// repeated placeholder, an unresolvable type, or a chain that breaks
    /// ordering, greedy, or flag naming rules.
    pub fn build(&self, function: &CommandFunction, path: &str) -> Result<Execution, ConfigError> {
        let meta = function.meta();
        if meta.priority.is_some() && meta.low_priority {
            return Err(ConfigError::ConflictingPriority {
                path: path.to_string(),
            });
        }
        for parameter in function.parameters() {
            if parameter.is_flag_and_switch() {
                return Err(ConfigError::FlagAndSwitch {
                    name: parameter.name().to_string(),
                });
            }
        }

        let mut chain = Chain::new(path);
        let mut remaining: Vec<ParameterDescriptor> = function.parameters().to_vec();
        let mut placeholders: HashSet<String> = HashSet::new();

        for token in tokenize_path(path)? {
            match token {
                PathToken::Literal(name) => chain.push_literal(name)?,
                PathToken::Parameter { name, optional } => {
                    if !placeholders.insert(name.clone()) {
                        return Err(ConfigError::DuplicatePlaceholder { name });
                    }
                    let descriptor = pop_parameter(&mut remaining, &name)?;
                    let Resolver::Value(ty) = self.pipeline.resolve(&descriptor)? else {
                        return Err(ConfigError::ContextPlaceholder { name });
                    };
                    let mut node = ParameterNode::new(descriptor, ty);
                    if optional {
                        node.force_optional();
                    }
                    chain.push_parameter(node)?;
                }
            }
        }

        let mut action = BoundAction::new(Arc::clone(function.action()));
        for descriptor in remaining {
            match self.pipeline.resolve(&descriptor)? {
                Resolver::Value(ty) => chain.push_parameter(ParameterNode::new(descriptor, ty))?,
                Resolver::Context(resolver) => action.add_context_parameter(descriptor, resolver),
            }
        }

        let execution = Execution::new(chain.finish(Arc::new(action))?, meta.clone());
        debug!(
            id = %execution.id(),
            path = execution.path(),
            nodes = execution.len(),
            "compiled command"
        );
        Ok(execution)
    }
}

fn pop_parameter(
    remaining: &mut Vec<ParameterDescriptor>,
    name: &str,
) -> Result<ParameterDescriptor, ConfigError> {
    match remaining.iter().position(|p| p.name() == name) {
        Some(index) => Ok(remaining.remove(index)),
        None => Err(ConfigError::UnknownPlaceholder {
            name: name.to_string(),
            available: remaining
                .iter()
                .map(ParameterDescriptor::name)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Nodes accumulated while building one execution.
struct Chain<'p> {
    path: &'p str,
    positional: Vec<CommandNode>,
    flags: Vec<CommandNode>,
    long_names: HashSet<String>,
    short_names: HashSet<char>,
    requires_optional: bool,
}

impl<'p> Chain<'p> {
    fn new(path: &'p str) -> Self {
        Self {
            path,
            positional: Vec::new(),
            flags: Vec::new(),
            long_names: HashSet::new(),
            short_names: HashSet::new(),
            requires_optional: false,
        }
    }

    fn push_literal(&mut self, name: String) -> Result<(), ConfigError> {
        if self.requires_optional {
            return Err(ConfigError::LiteralAfterOptional {
                literal: name,
                path: self.path.to_string(),
            });
        }
        self.positional.push(CommandNode::Literal(LiteralNode::new(name)));
        Ok(())
    }

    fn push_parameter(&mut self, node: ParameterNode) -> Result<(), ConfigError> {
        if self.positional.is_empty() {
            return Err(ConfigError::LeadingParameter {
                name: node.name().to_string(),
            });
        }
        if node.is_flag_or_switch() {
            self.check_flag_names(&node)?;
            self.flags.push(CommandNode::Parameter(node));
            return Ok(());
        }
        if node.is_optional() {
            self.requires_optional = true;
        } else if self.requires_optional {
            return Err(ConfigError::RequiredAfterOptional {
                name: node.name().to_string(),
                path: self.path.to_string(),
            });
        }
        self.positional.push(CommandNode::Parameter(node));
        Ok(())
    }

    fn check_flag_names(&mut self, node: &ParameterNode) -> Result<(), ConfigError> {
        if let Some(long) = node.long_name() {
            if !self.long_names.insert(long.to_string()) {
                return Err(ConfigError::DuplicateFlagName(long.to_string()));
            }
        }
        if let Some(short) = node.shorthand() {
            if !self.short_names.insert(short) {
                return Err(ConfigError::DuplicateShorthand(short));
            }
        }
        Ok(())
    }

    fn finish(mut self, action: Arc<BoundAction>) -> Result<Vec<CommandNode>, ConfigError> {
        if let Some(CommandNode::Parameter(last)) = self.positional.last_mut() {
            if !last.descriptor().is_single() {
                if let Some(greedy) = last.parameter_type().greedy_variant() {
                    last.promote_to(greedy);
                }
            }
        }

        let greedy: Vec<(usize, &str)> = self
            .positional
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                node.as_parameter()
                    .filter(|p| p.is_greedy())
                    .map(|p| (index, p.name()))
            })
            .collect();
        if let [(_, first), (_, second), ..] = greedy.as_slice() {
            return Err(ConfigError::MultipleGreedy {
                first: (*first).to_string(),
                second: (*second).to_string(),
            });
        }
        if let Some(&(index, name)) = greedy.first() {
            if index + 1 != self.positional.len() {
                return Err(ConfigError::GreedyNotLast {
                    name: name.to_string(),
                });
            }
        }

        let mut nodes = self.positional;
        nodes.append(&mut self.flags);
        for node in &mut nodes {
            if node.is_optional() {
                node.set_action(Arc::clone(&action));
            }
        }
        if let Some(last) = nodes.last_mut() {
            last.mark_last();
            last.set_action(action);
        }
        Ok(nodes)
    }
}
