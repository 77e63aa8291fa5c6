//! Lifecycle hooks.

use lantern_tree::{Execution, ExecutionContext};

/// Observes registration and execution. Every method has a no-op default.
///
/// All registered hooks are notified; a single veto is enough to cancel.
pub trait CommandHooks: Send + Sync {
    /// Called before an execution is added. Return false to cancel.
    fn on_registered(&self, _execution: &Execution) -> bool {
        true
    }

    /// Called after an execution has been removed.
    fn on_unregistered(&self, _execution: &Execution) {}

    /// Called before the winning candidate's action runs. Return false to
    /// cancel the execution.
    fn on_executed(&self, _context: &ExecutionContext<'_>) -> bool {
        true
    }
}
