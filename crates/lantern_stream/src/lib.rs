//! Text cursors for Lantern.
//!
//! This crate provides:
//! - [`StringStream`] - A backtracking cursor over command input
//! - [`PathTokenizer`] - Splits a command path into literals and placeholders
//! - [`excise`] - Removes byte ranges from a string (used for flag extraction)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod stream;
pub mod token;

pub use stream::{StringStream, excise};
pub use token::{PathToken, PathTokenizer, tokenize_path};
