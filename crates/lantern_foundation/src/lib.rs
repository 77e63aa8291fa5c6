//! Core values, actors, and error types for Lantern.
//!
//! This crate provides:
//! - [`Value`] - The value type produced by parameter resolution
//! - [`Actor`] and [`ActorId`] - The opaque identity issuing a command
//! - [`CommandError`] - Per-trial failures with diagnostic context
//! - [`ConfigError`] - Grammar and registration errors
//! - [`ActionError`] - Failures raised by a command's terminal action

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actor;
pub mod error;
pub mod value;

pub use actor::{Actor, ActorId};
pub use error::{
    ActionError, CommandError, ConditionReason, ConfigError, ErrorContext, ErrorKind,
    InputFormatCause, Result,
};
pub use value::{Opaque, Value};
