//! Table-driven finite state machine
//!
//! Transitions are declared up front as `(from, on) -> to` rows with optional
//! guards and actions. At dispatch time the machine looks up every row
//! registered for the current state and event and takes the first one whose
//! guard accepts the context.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

/// Guard predicate evaluated against the machine context
pub type Guard<C> = fn(&C) -> bool;

/// Side effect run on the context when a transition is taken
pub type Action<C> = fn(&mut C);

/// Error type for dispatch failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("No transition for {event} from {state}")]
    NoTransition { state: String, event: String },
    #[error("All guards blocked {event} from {state}")]
    GuardsBlocked { state: String, event: String },
}

/// One row of the transition table
pub struct Transition<S, E, C> {
    pub from: S,
    pub on: E,
    pub to: S,
    pub guard: Option<Guard<C>>,
    pub action: Option<Action<C>>,
}

impl<S, E, C> Transition<S, E, C> {
    /// Unconditional transition with no action
    pub fn new(from: S, on: E, to: S) -> Self {
        Self {
            from,
            on,
            to,
            guard: None,
            action: None,
        }
    }

    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn action(mut self, action: Action<C>) -> Self {
        self.action = Some(action);
        self
    }

    fn allows(&self, ctx: &C) -> bool {
        self.guard.map_or(true, |guard| guard(ctx))
    }
}

impl<S: Clone, E: Clone, C> Clone for Transition<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            on: self.on.clone(),
            to: self.to.clone(),
            guard: self.guard,
            action: self.action,
        }
    }
}

impl<S: fmt::Debug, E: fmt::Debug, C> fmt::Debug for Transition<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("on", &self.on)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// State machine driven by a transition table
///
/// `S` and `E` are small copyable enums. `C` is the context the guards
/// inspect and the actions mutate; it is owned by the caller and passed in on
/// each dispatch so the machine itself stays a pure lookup structure.
pub struct StateMachine<S, E, C> {
    initial: S,
    state: S,
    table: HashMap<(S, E), Vec<Transition<S, E, C>>>,
}

impl<S, E, C> StateMachine<S, E, C>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: Copy + Eq + Hash + fmt::Debug,
{
    /// Build a machine from its transition rows
    ///
    /// Rows sharing a `(from, on)` pair keep their declaration order, which
    /// is the order guards are tried in.
    pub fn new(initial: S, transitions: impl IntoIterator<Item = Transition<S, E, C>>) -> Self {
        let mut table: HashMap<(S, E), Vec<Transition<S, E, C>>> = HashMap::new();
        for transition in transitions {
            table
                .entry((transition.from, transition.on))
                .or_default()
                .push(transition);
        }

        Self {
            initial,
            state: initial,
            table,
        }
    }

    /// Current state
    pub fn state(&self) -> S {
        self.state
    }

    /// State the machine was built with
    pub fn initial(&self) -> S {
        self.initial
    }

    /// Whether `event` would be accepted in the current state
    pub fn can_dispatch(&self, event: E, ctx: &C) -> bool {
        self.select(event, ctx).is_ok()
    }

    /// Like `can_dispatch`, but reports why the event would be refused
    pub fn check(&self, event: E, ctx: &C) -> Result<S, MachineError> {
        self.select(event, ctx).map(|row| row.to)
    }

    /// Fire `event`, returning the new state
    ///
    /// # Errors
    ///
    /// Returns `MachineError::NoTransition` when no row exists for the
    /// current state and event, and `MachineError::GuardsBlocked` when rows
    /// exist but every guard rejects the context. The state is unchanged in
    /// both cases.
    pub fn dispatch(&mut self, event: E, ctx: &mut C) -> Result<S, MachineError> {
        let (to, action) = {
            let chosen = self.select(event, ctx)?;
            (chosen.to, chosen.action)
        };

        if let Some(action) = action {
            action(ctx);
        }

        debug!(from = ?self.state, event = ?event, to = ?to, "transition");
        self.state = to;
        Ok(self.state)
    }

    fn select(&self, event: E, ctx: &C) -> Result<&Transition<S, E, C>, MachineError> {
        let rows = self
            .table
            .get(&(self.state, event))
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| MachineError::NoTransition {
                state: format!("{:?}", self.state),
                event: format!("{:?}", event),
            })?;

        rows.iter()
            .find(|row| row.allows(ctx))
            .ok_or_else(|| MachineError::GuardsBlocked {
                state: format!("{:?}", self.state),
                event: format!("{:?}", event),
            })
    }

    /// Jump to `state` without consulting the table
    pub fn force(&mut self, state: S) {
        debug!(from = ?self.state, to = ?state, "forced transition");
        self.state = state;
    }

    /// Return to the initial state
    pub fn restart(&mut self) {
        self.force(self.initial);
    }
}

impl<S: fmt::Debug, E, C> fmt::Debug for StateMachine<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.state)
            .field("rows", &self.table.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
