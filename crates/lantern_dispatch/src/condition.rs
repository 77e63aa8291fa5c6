//! Command conditions.
//!
//! Conditions run after a trial has parsed every node. A failing condition
//! eliminates the candidate like any parse error. The winning candidate is
//! then offered to [`CommandCondition::acquire`], which may claim shared
//! state atomically before the action runs. Once the action returns, every
//! condition hears about it through [`CommandCondition::executed`] or
//! [`CommandCondition::released`].

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use lantern_foundation::{ActorId, CommandError, ConditionReason};
use lantern_tree::{ExecutionContext, ExecutionId};
use parking_lot::RwLock;

/// A check run against a fully parsed trial.
pub trait CommandCondition: Send + Sync {
    /// Tests the trial.
    ///
    /// # Errors
    ///
    /// Returns the error that eliminates the candidate.
    fn test(&self, context: &ExecutionContext<'_>) -> Result<(), CommandError>;

    /// Claims the winning candidate just before its action runs.
    ///
    /// # Errors
    ///
    /// Returns the error that stops the winner. Conditions acquired before
    /// this one are released.
    fn acquire(&self, _context: &ExecutionContext<'_>) -> Result<(), CommandError> {
        Ok(())
    }

    /// Called after the winning candidate's action has run successfully.
    fn executed(&self, _context: &ExecutionContext<'_>) {}

    /// Called when an acquired candidate is cancelled or its action fails.
    fn released(&self, _context: &ExecutionContext<'_>) {}
}

impl<F> CommandCondition for F
where
    F: Fn(&ExecutionContext<'_>) -> Result<(), CommandError> + Send + Sync,
{
    fn test(&self, context: &ExecutionContext<'_>) -> Result<(), CommandError> {
        self(context)
    }
}

/// Checks the command-level permission.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissionCondition;

impl CommandCondition for PermissionCondition {
    fn test(&self, context: &ExecutionContext<'_>) -> Result<(), CommandError> {
        let execution = context.execution();
        match execution.permission() {
            Some(permission) if !permission.is_executable_by(context.actor()) => {
                Err(CommandError::no_permission(execution.path()))
            }
            _ => Ok(()),
        }
    }
}

/// Enforces per-actor cooldowns declared on commands.
///
/// State is keyed by actor and execution, so aliases of one function cool
/// down independently. Each entry holds the instant its cooldown ends and
/// is dropped once that instant passes.
#[derive(Default)]
pub struct CooldownCondition {
    expires: RwLock<HashMap<ActorId, HashMap<ExecutionId, Instant>>>,
}

impl CooldownCondition {
    /// Creates a condition with no recorded uses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `actor` may run `execution` again, if any.
    #[must_use]
    pub fn remaining(&self, actor: ActorId, execution: ExecutionId) -> Option<Duration> {
        let until = *self.expires.read().get(&actor)?.get(&execution)?;
        left_until(until, Instant::now())
    }

    /// Number of actors with a cooldown still on record.
    #[must_use]
    pub fn tracked_actors(&self) -> usize {
        self.expires.read().len()
    }

    /// Forgets every recorded use.
    pub fn reset(&self) {
        self.expires.write().clear();
    }

    /// Drops every entry whose cooldown has ended.
    fn prune(expires: &mut HashMap<ActorId, HashMap<ExecutionId, Instant>>, now: Instant) {
        expires.retain(|_, executions| {
            executions.retain(|_, until| *until > now);
            !executions.is_empty()
        });
    }
}

fn left_until(until: Instant, now: Instant) -> Option<Duration> {
    Some(until.saturating_duration_since(now)).filter(|left| !left.is_zero())
}

fn cooldown_error(remaining: Duration) -> CommandError {
    CommandError::condition(ConditionReason::Cooldown { remaining })
}

impl CommandCondition for CooldownCondition {
    fn test(&self, context: &ExecutionContext<'_>) -> Result<(), CommandError> {
        let execution = context.execution();
        if execution.cooldown().is_none() {
            return Ok(());
        }
        match self.remaining(context.actor().id(), execution.id()) {
            Some(remaining) => Err(cooldown_error(remaining)),
            None => Ok(()),
        }
    }

    fn acquire(&self, context: &ExecutionContext<'_>) -> Result<(), CommandError> {
        let execution = context.execution();
        let Some(cooldown) = execution.cooldown() else {
            return Ok(());
        };
        let now = Instant::now();
        let mut expires = self.expires.write();
        Self::prune(&mut expires, now);
        let slots = expires.entry(context.actor().id()).or_default();
        if let Some(remaining) = slots.get(&execution.id()).and_then(|until| left_until(*until, now)) {
            return Err(cooldown_error(remaining));
        }
        slots.insert(execution.id(), now + cooldown);
        Ok(())
    }

    fn executed(&self, context: &ExecutionContext<'_>) {
        let execution = context.execution();
        let Some(cooldown) = execution.cooldown() else {
            return;
        };
        let now = Instant::now();
        let mut expires = self.expires.write();
        Self::prune(&mut expires, now);
        expires
            .entry(context.actor().id())
            .or_default()
            .insert(execution.id(), now + cooldown);
    }

    fn released(&self, context: &ExecutionContext<'_>) {
        let execution = context.execution();
        if execution.cooldown().is_none() {
            return;
        }
        let actor = context.actor().id();
        let mut expires = self.expires.write();
        if let Some(slots) = expires.get_mut(&actor) {
            slots.remove(&execution.id());
            if slots.is_empty() {
                expires.remove(&actor);
            }
        }
    }
}

impl fmt::Debug for CooldownCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CooldownCondition")
            .field("actors", &self.tracked_actors())
            .finish()
    }
}
