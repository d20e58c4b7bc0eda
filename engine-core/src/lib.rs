//! Core state-management building blocks for the tic-tac-toe engines
//!
//! This crate provides the generic machinery the game variants are built on:
//! - `StateMachine`: table-driven transitions with guards and actions
//! - `Store`: single-owner state changed only through a reducer
//! - `Listeners`: ordered change-notification callbacks
//! - `Registry`: named factories for picking an implementation at runtime

pub mod machine;
pub mod notify;
pub mod registry;
pub mod store;

// Re-export main types for convenience
pub use machine::{MachineError, StateMachine, Transition};
pub use notify::{Listener, Listeners, SubscriptionId};
pub use registry::Registry;
pub use store::Store;
