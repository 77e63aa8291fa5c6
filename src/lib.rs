//! Lantern - declarative command grammars and overload-aware dispatch
//!
//! This crate re-exports all layers of the Lantern system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: lantern_dispatch    - Registry, trial parsing, ranking, completion
//! Layer 2: lantern_tree        - Parameter types, resolver pipeline, grammar builder
//! Layer 1: lantern_stream      - Input cursor, path tokenizer
//! Layer 0: lantern_foundation  - Core types (Value, ActorId, errors)
//! ```

pub use lantern_dispatch as dispatch;
pub use lantern_foundation as foundation;
pub use lantern_stream as stream;
pub use lantern_tree as tree;
