//! The identity issuing a command.
//!
//! The dispatcher never inspects an actor beyond its id and display name;
//! permissions, conditions, and context resolvers interpret it.

use std::fmt;

/// Stable identifier for an actor.
///
/// Cooldowns and other per-actor state are keyed by this id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates an actor id from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Something that can issue commands.
pub trait Actor: Send + Sync {
    /// The actor's stable id.
    fn id(&self) -> ActorId;

    /// A human-readable name, used in diagnostics.
    fn name(&self) -> &str;
}
