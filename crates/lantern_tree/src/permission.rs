//! Permission checks on commands and parameters.

use lantern_foundation::Actor;

/// Decides whether an actor may use a command or parameter.
///
/// Any `Fn(&dyn Actor) -> bool` closure is a permission.
pub trait CommandPermission: Send + Sync {
    /// Returns true if `actor` may proceed.
    fn is_executable_by(&self, actor: &dyn Actor) -> bool;
}

impl<F> CommandPermission for F
where
    F: Fn(&dyn Actor) -> bool + Send + Sync,
{
    fn is_executable_by(&self, actor: &dyn Actor) -> bool {
        self(actor)
    }
}

/// A permission every actor holds.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysPermitted;

impl CommandPermission for AlwaysPermitted {
    fn is_executable_by(&self, _actor: &dyn Actor) -> bool {
        true
    }
}
