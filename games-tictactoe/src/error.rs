//! Error types for the tic-tac-toe engine

use engine_core::MachineError;

use crate::board::Symbol;

/// Why a particular move was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cell {0} is outside the board")]
    OutOfRange(usize),
    #[error("cell {0} is already occupied")]
    Occupied(usize),
    #[error("a symbol must be chosen in wild mode")]
    SymbolRequired,
    #[error("symbol {0} is not available to this player")]
    SymbolNotAvailable(Symbol),
}

/// Error type for engine operations
///
/// Every variant is recoverable: the engine state is left untouched when one
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] MoveError),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("No legal move: the board is full")]
    NoLegalMove,
}

impl GameError {
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        GameError::InvalidState(reason.into())
    }

    pub(crate) fn no_game() -> Self {
        Self::invalid_state("no game in progress")
    }
}

impl From<MachineError> for GameError {
    fn from(err: MachineError) -> Self {
        GameError::InvalidState(err.to_string())
    }
}

/// Error returned when text cannot be parsed into a game value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_converts() {
        let err: GameError = MoveError::Occupied(4).into();
        assert_eq!(err, GameError::InvalidMove(MoveError::Occupied(4)));
        assert_eq!(err.to_string(), "Invalid move: cell 4 is already occupied");
    }

    #[test]
    fn test_machine_error_is_invalid_state() {
        let err: GameError = MachineError::NoTransition {
            state: "Finished".to_string(),
            event: "P1Done".to_string(),
        }
        .into();
        assert_eq!(
            err,
            GameError::InvalidState("No transition for P1Done from Finished".to_string())
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            GameError::invalid_state("game is over").to_string(),
            "Invalid state: game is over"
        );
        assert_eq!(
            MoveError::SymbolNotAvailable(Symbol::O).to_string(),
            "symbol O is not available to this player"
        );
        assert_eq!(
            ParseError::new("mode", "blitz").to_string(),
            "Unknown mode: 'blitz'"
        );
    }
}
