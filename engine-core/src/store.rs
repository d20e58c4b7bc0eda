//! Single-owner store driven by a reducer
//!
//! A `Store` owns one state value and changes it only through `dispatch`.
//! The reducer runs against a working copy; the copy replaces the stored
//! state only when the reducer succeeds, so a rejected action leaves the
//! state exactly as it was. Listeners are notified after each committed
//! action.

use std::fmt;

use tracing::debug;

use crate::notify::{Listener, Listeners, SubscriptionId};

/// Reducer applying one action to the state
pub type Reducer<S, A, E> = fn(&mut S, A) -> Result<(), E>;

pub struct Store<S, A, E> {
    state: S,
    reducer: Reducer<S, A, E>,
    listeners: Listeners<S>,
}

impl<S: Clone, A: fmt::Debug, E: fmt::Display> Store<S, A, E> {
    pub fn new(state: S, reducer: Reducer<S, A, E>) -> Self {
        Self {
            state,
            reducer,
            listeners: Listeners::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Run `action` through the reducer and commit the result
    ///
    /// # Errors
    ///
    /// Returns the reducer's error unchanged. The stored state is not
    /// modified and listeners are not called.
    pub fn dispatch(&mut self, action: A) -> Result<(), E> {
        debug!(action = ?action, "dispatch");
        let mut next = self.state.clone();
        if let Err(err) = (self.reducer)(&mut next, action) {
            debug!(error = %err, "action rejected");
            return Err(err);
        }
        self.state = next;
        self.listeners.notify(&self.state);
        Ok(())
    }

    /// Replace the state wholesale and notify listeners
    pub fn replace(&mut self, state: S) {
        self.state = state;
        self.listeners.notify(&self.state);
    }

    pub fn subscribe(&mut self, listener: Listener<S>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl<S: fmt::Debug, A, E> fmt::Debug for Store<S, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners)
            .finish()
    }
}
