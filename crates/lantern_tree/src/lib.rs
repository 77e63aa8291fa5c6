//! Command grammar compilation for Lantern.
//!
//! A [`CommandFunction`] pairs one or more path strings with typed
//! [`ParameterDescriptor`]s and an action. The [`TreeBuilder`] compiles each
//! path into an immutable [`Execution`]: an ordered chain of
//! [`CommandNode`]s whose parameter nodes carry a [`ParameterType`] chosen by
//! the [`ResolverPipeline`].
//!
//! # Example
//!
//! ```
//! use lantern_foundation::Value;
//! use lantern_tree::{CommandFunction, ParameterDescriptor, ResolverPipeline, TreeBuilder, TypeRef};
//!
//! let pipeline = ResolverPipeline::builder().build();
//! let function = CommandFunction::new("foo <a> [b]", |_ctx| Ok(Value::Nil))
//!     .with_parameter(ParameterDescriptor::new("a", TypeRef::Int))
//!     .with_parameter(ParameterDescriptor::new("b", TypeRef::String).with_default("x"));
//!
//! let executions = TreeBuilder::new(&pipeline).build_all(&function).unwrap();
//! assert_eq!(executions[0].len(), 3);
//! assert_eq!(executions[0].usage(), "foo <a> [b]");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod builder;
pub mod context;
pub mod execution;
pub mod function;
pub mod node;
pub mod parameter;
pub mod permission;
pub mod resolver;
pub mod suggestion;
pub mod types;
pub mod validator;


pub use action::{BoundAction, CommandAction};
pub use builder::TreeBuilder;
pub use context::{ExecutionContext, ResolvedArguments};
pub use execution::{Execution, ExecutionId};
pub use function::CommandFunction;
pub use node::{CommandNode, LiteralNode, ParameterNode};
pub use parameter::{EnumSpec, FlagSpec, ParameterDescriptor, ParameterKind, TypeRef};
pub use permission::{AlwaysPermitted, CommandPermission};
pub use resolver::{
    ContextParameter, NextResolver, PipelineBuilder, Resolver, ResolverFactory, ResolverPipeline,
};
pub use suggestion::{StaticSuggestions, SuggestionProvider};
pub use types::{
    BoolType, CharType, EnumType, FloatType, IntType, ListType, ParameterType, ParsePriority,
    RangeChecked, StringType,
};
pub use validator::{LengthValidator, ParameterValidator, SizeValidator, Validated};
