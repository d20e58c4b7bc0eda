//! Rule-based opponent
//!
//! The selector never searches beyond one ply. In standard mode it plays, in
//! order of preference: a winning cell, a blocking cell, the center, a
//! corner, any free cell. In wild mode it looks for a cell that completes a
//! line with either symbol, then for a threat to block with the other
//! symbol, and otherwise plays a random cell with a random symbol. Ties
//! within a rule are broken uniformly at random.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::board::{Board, Symbol, CENTER, CORNERS};
use crate::error::GameError;
use crate::rules::Mode;

/// Move chosen by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMove {
    pub index: usize,
    /// Symbol to place; only set in wild mode
    pub symbol: Option<Symbol>,
}

/// Cells where placing `symbol` completes a line
pub fn winning_moves(board: &Board, symbol: Symbol) -> Vec<usize> {
    board
        .empty_cells()
        .into_iter()
        .filter(|&index| board.completes_line(index, symbol))
        .collect()
}

/// Choose the next move for the computer player
///
/// `acting` is the symbol the computer plays in standard mode (O when not
/// given) and is ignored in wild mode.
///
/// # Errors
///
/// Returns `GameError::NoLegalMove` when the board is full.
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    mode: Mode,
    acting: Option<Symbol>,
    rng: &mut R,
) -> Result<AiMove, GameError> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return Err(GameError::NoLegalMove);
    }

    let chosen = match mode {
        Mode::Standard => AiMove {
            index: choose_standard(board, acting.unwrap_or(Symbol::O), &empty, rng)?,
            symbol: None,
        },
        Mode::Wild => {
            let (index, symbol) = choose_wild(board, &empty, rng)?;
            AiMove {
                index,
                symbol: Some(symbol),
            }
        }
    };
    Ok(chosen)
}

fn choose_standard<R: Rng + ?Sized>(
    board: &Board,
    symbol: Symbol,
    empty: &[usize],
    rng: &mut R,
) -> Result<usize, GameError> {
    if let Some(&index) = winning_moves(board, symbol).choose(rng) {
        debug!(index, symbol = %symbol, "selector: win");
        return Ok(index);
    }

    if let Some(&index) = winning_moves(board, symbol.opponent()).choose(rng) {
        debug!(index, symbol = %symbol, "selector: block");
        return Ok(index);
    }

    if board.is_empty_at(CENTER) {
        debug!(index = CENTER, symbol = %symbol, "selector: center");
        return Ok(CENTER);
    }

    let corners: Vec<usize> = CORNERS
        .iter()
        .copied()
        .filter(|&corner| board.is_empty_at(corner))
        .collect();
    if let Some(&index) = corners.choose(rng) {
        debug!(index, symbol = %symbol, "selector: corner");
        return Ok(index);
    }

    let index = *empty.choose(rng).ok_or(GameError::NoLegalMove)?;
    debug!(index, symbol = %symbol, "selector: random");
    Ok(index)
}

fn choose_wild<R: Rng + ?Sized>(
    board: &Board,
    empty: &[usize],
    rng: &mut R,
) -> Result<(usize, Symbol), GameError> {
    for symbol in Symbol::ALL {
        if let Some(&index) = winning_moves(board, symbol).choose(rng) {
            debug!(index, symbol = %symbol, "selector: wild win");
            return Ok((index, symbol));
        }
    }

    for threat in Symbol::ALL {
        if let Some(&index) = winning_moves(board, threat).choose(rng) {
            let symbol = threat.opponent();
            debug!(index, symbol = %symbol, "selector: wild block");
            return Ok((index, symbol));
        }
    }

    let index = *empty.choose(rng).ok_or(GameError::NoLegalMove)?;
    let symbol = *Symbol::ALL.choose(rng).ok_or(GameError::NoLegalMove)?;
    debug!(index, symbol = %symbol, "selector: wild random");
    Ok((index, symbol))
}

/// Source of computer moves
pub trait MovePolicy {
    fn choose_move(
        &mut self,
        board: &Board,
        mode: Mode,
        acting: Option<Symbol>,
    ) -> Result<AiMove, GameError>;
}

/// The heuristic selector backed by its own random number generator
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    rng: ChaCha20Rng,
}

impl HeuristicPolicy {
    /// Policy seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Policy with a fixed seed for reproducible games
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl MovePolicy for HeuristicPolicy {
    fn choose_move(
        &mut self,
        board: &Board,
        mode: Mode,
        acting: Option<Symbol>,
    ) -> Result<AiMove, GameError> {
        choose_move(board, mode, acting, &mut self.rng)
    }
}
