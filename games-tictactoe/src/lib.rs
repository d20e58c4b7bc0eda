//! Tic-tac-toe game engine
//!
//! Board, rules and the heuristic computer opponent are shared; turn and
//! result management comes in three interchangeable architectures behind
//! the `GameAdapter` trait:
//!
//! - `fsm::Game`: an explicit phase enum matched by hand
//! - `table::TableGame`: an `engine_core::StateMachine` transition table
//! - `store::StoreGame`: an `engine_core::Store` driven by a pure reducer
//!
//! Two modes are supported. In standard mode player one is bound to X and
//! player two to O; in wild mode either player picks X or O on every move
//! and whoever completes a line of either symbol wins for that symbol.
//!
//! Computer moves are applied immediately when `EngineConfig::think_delay`
//! is zero. Otherwise the engine records a `PendingAi` ticket and the caller
//! applies it with `resolve_ai` once the delay has elapsed; a reset makes
//! outstanding tickets stale.

pub mod adapter;
pub mod ai;
pub mod board;
pub mod error;
pub mod fsm;
pub mod rules;
pub mod snapshot;
pub mod store;
pub mod table;
pub mod turn;
pub mod variants;

pub use adapter::GameAdapter;
pub use ai::{choose_move, AiMove, HeuristicPolicy, MovePolicy};
pub use board::{Board, Symbol, CELLS};
pub use error::{GameError, MoveError, ParseError};
pub use rules::{Mode, Player, PlayerId, PlayerKind};
pub use snapshot::Snapshot;
pub use turn::{AiReplay, EngineConfig, Outcome, PendingAi, Status};
pub use variants::{create_variant, list_variants};
