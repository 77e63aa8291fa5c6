//! Overload-aware command dispatch for Lantern.
//!
//! The [`Dispatcher`] holds compiled executions and matches raw input
//! against every execution whose leading literal equals the first word.
//! Each candidate is trial-parsed into a [`Potential`]; successful
//! potentials are ranked and the best one runs.
//!
//! # Example
//!
//! ```
//! use lantern_dispatch::Dispatcher;
//! use lantern_foundation::{Actor, ActorId, Value};
//! use lantern_tree::{CommandFunction, ParameterDescriptor, TypeRef};
//!
//! struct Console;
//!
//! impl Actor for Console {
//!     fn id(&self) -> ActorId {
//!         ActorId::new(0)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "console"
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher
//!     .register_function(
//!         &CommandFunction::new("add <a> <b>", |ctx| {
//!             let a = ctx.get("a").and_then(Value::as_int).unwrap_or_default();
//!             let b = ctx.get("b").and_then(Value::as_int).unwrap_or_default();
//!             Ok(Value::Int(a + b))
//!         })
//!         .with_parameter(ParameterDescriptor::new("a", TypeRef::Int))
//!         .with_parameter(ParameterDescriptor::new("b", TypeRef::Int)),
//!     )
//!     .unwrap();
//!
//! let dispatched = dispatcher.dispatch(&Console, "add 2 -3").unwrap();
//! assert_eq!(dispatched.response, Value::Int(-1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod completion;
pub mod condition;
pub mod flags;
pub mod handler;
pub mod hooks;
pub mod potential;
pub mod registry;
pub mod settings;


pub use completion::AutoCompleter;
pub use condition::{CommandCondition, CooldownCondition, PermissionCondition};
pub use flags::extract_flags;
pub use handler::{
    DefaultExceptionHandler, DefaultFailureHandler, DefaultResponseHandler, ExceptionHandler,
    FailureHandler, ResponseHandler, furthest_failure,
};
pub use hooks::CommandHooks;
pub use potential::Potential;
pub use registry::{DispatchError, Dispatched, Dispatcher, DispatcherBuilder};
pub use settings::DispatcherSettings;
