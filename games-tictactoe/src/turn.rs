//! Turn bookkeeping shared by every engine variant
//!
//! The variants differ in how they represent "whose turn is it"; the rules
//! for applying a move and deciding the result live here as free functions
//! so they cannot drift apart.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{HeuristicPolicy, MovePolicy};
use crate::board::{Board, Symbol, CELLS};
use crate::error::{GameError, MoveError, ParseError};
use crate::rules::{resolve_symbol, rules_for, Mode, Player, PlayerId};

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Winner(Symbol),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(symbol) => write!(f, "{} wins", symbol),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

/// Coarse lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    AwaitingSetup,
    InProgress,
    Terminal(Outcome),
}

/// An automated move waiting for its thinking delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAi {
    /// Identifies this particular wait; stale tickets are ignored
    pub ticket: u64,
    pub player: PlayerId,
    pub delay: Duration,
}

/// How a computer move reaches the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiReplay {
    /// Through the same turn and rule checks as a human move
    #[default]
    Validated,
    /// Straight onto the board, skipping turn and rule checks
    Direct,
}

impl FromStr for AiReplay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "validated" => Ok(AiReplay::Validated),
            "direct" => Ok(AiReplay::Direct),
            _ => Err(ParseError::new("replay policy", s)),
        }
    }
}

/// Engine configuration shared by all variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Pause before a computer move; zero applies it immediately
    pub think_delay: Duration,
    pub ai_replay: AiReplay,
    /// Seed for the computer's random choices; entropy when `None`
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn with_delay(think_delay: Duration) -> Self {
        Self {
            think_delay,
            ..Self::default()
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Whether computer moves wait for `resolve_ai`
    pub fn defers_ai(&self) -> bool {
        !self.think_delay.is_zero()
    }

    /// Move policy matching this configuration
    pub fn policy(&self) -> Box<dyn MovePolicy> {
        match self.seed {
            Some(seed) => Box::new(HeuristicPolicy::with_seed(seed)),
            None => Box::new(HeuristicPolicy::new()),
        }
    }
}

/// Result of the board after a move: a win, a draw, or neither
pub fn evaluate(board: &Board) -> Option<Outcome> {
    if let Some(symbol) = rules_for(Mode::Standard).check_winner(board) {
        return Some(Outcome::Winner(symbol));
    }
    if board.is_full() {
        return Some(Outcome::Draw);
    }
    None
}

/// Validate and apply a move by `player`
///
/// Checks the index range, the mode's rule strategy and the symbol choice
/// before touching the board, so the board is unchanged on error. Returns
/// the placed symbol and the resulting outcome, if the game ended.
pub fn apply_move(
    board: &mut Board,
    mode: Mode,
    player: &Player,
    index: usize,
    requested: Option<Symbol>,
) -> Result<(Symbol, Option<Outcome>), GameError> {
    if index >= CELLS {
        return Err(MoveError::OutOfRange(index).into());
    }
    if !rules_for(mode).is_move_valid(board, index) {
        return Err(MoveError::Occupied(index).into());
    }
    let symbol = resolve_symbol(player, mode, requested)?;

    board.place(index, symbol)?;
    let outcome = evaluate(board);
    debug!(player = %player.id, index, symbol = %symbol, outcome = ?outcome, "move applied");
    Ok((symbol, outcome))
}

/// Place a computer move without turn or rule checks
///
/// Only the board's own occupancy check applies. The symbol comes from the
/// selector in wild mode and from the player's binding otherwise.
pub fn apply_direct(
    board: &mut Board,
    player: &Player,
    index: usize,
    chosen: Option<Symbol>,
) -> Result<(Symbol, Option<Outcome>), GameError> {
    let symbol = chosen
        .or(player.symbol)
        .ok_or(MoveError::SymbolRequired)?;
    board.place(index, symbol)?;
    let outcome = evaluate(board);
    debug!(player = %player.id, index, symbol = %symbol, outcome = ?outcome, "direct move applied");
    Ok((symbol, outcome))
}
