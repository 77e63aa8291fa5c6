//! Integration tests for Layer 2: Tree
//!
//! Tests for grammar compilation, parameter types, and the resolver pipeline.

mod builder;
mod resolver;
mod types;

use lantern_foundation::{Actor, ActorId};

/// An actor for tests; `id` doubles as a permission level.
pub struct Player(pub u64);

impl Actor for Player {
    fn id(&self) -> ActorId {
        ActorId::new(self.0)
    }

    fn name(&self) -> &str {
        "player"
    }
}
