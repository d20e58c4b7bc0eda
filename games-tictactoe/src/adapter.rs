//! Call surface shared by every engine variant
//!
//! A front-end drives the game exclusively through `GameAdapter`, so the
//! explicit state machine, the transition table and the reducer store are
//! interchangeable behind a `Box<dyn GameAdapter>`.
//!
//! # Example
//!
//! ```rust
//! use games_tictactoe::{fsm::Game, EngineConfig, GameAdapter, Outcome, Status, Symbol};
//!
//! let mut game = Game::new(EngineConfig::seeded(1));
//! game.start().unwrap();
//! for index in [0, 3, 1, 4, 2] {
//!     game.play(index, None).unwrap();
//! }
//! assert_eq!(game.snapshot().status, Status::Terminal(Outcome::Winner(Symbol::X)));
//! ```

use engine_core::{Listener, SubscriptionId};

use crate::board::Symbol;
use crate::error::GameError;
use crate::rules::{Mode, PlayerId, PlayerKind};
use crate::snapshot::Snapshot;
use crate::turn::PendingAi;

/// Game engine as seen by a presentation layer
///
/// Commands that fail leave the board, turn and status untouched; the error
/// is returned and also kept as `last_error` until the next successful
/// command or `clear_error`. Listeners receive a fresh snapshot after every
/// command, including rejected ones.
pub trait GameAdapter {
    /// Short identifier of the variant (`fsm`, `table`, `store`)
    fn name(&self) -> &'static str;

    /// Choose the mode; only while awaiting setup
    fn set_mode(&mut self, mode: Mode) -> Result<(), GameError>;

    /// Choose who controls a seat; only while awaiting setup
    fn set_player_kind(&mut self, player: PlayerId, kind: PlayerKind) -> Result<(), GameError>;

    /// Leave setup with an empty board and player one to move
    fn start(&mut self) -> Result<(), GameError>;

    /// Move on behalf of `player`, who must be the human whose turn it is
    fn play_as(
        &mut self,
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    ) -> Result<(), GameError>;

    /// Move on behalf of whoever is to move; fails with `InvalidState` when
    /// no game is in progress
    fn play(&mut self, index: usize, symbol: Option<Symbol>) -> Result<(), GameError>;

    /// Clear the board and give player one the turn, cancelling any pending
    /// computer move. From setup this starts the game.
    fn reset(&mut self) -> Result<(), GameError>;

    /// Return to setup with default mode and players
    fn reset_to_setup(&mut self);

    /// Computer move waiting for its delay, if any
    fn pending_ai(&self) -> Option<PendingAi>;

    /// Apply the pending computer move identified by `ticket`
    ///
    /// Returns `Ok(false)` when the ticket is stale (the move was cancelled
    /// by a reset or already applied).
    fn resolve_ai(&mut self, ticket: u64) -> Result<bool, GameError>;

    fn snapshot(&self) -> Snapshot;

    fn subscribe(&mut self, listener: Listener<Snapshot>) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    fn last_error(&self) -> Option<String> {
        self.snapshot().last_error
    }

    fn clear_error(&mut self);
}
