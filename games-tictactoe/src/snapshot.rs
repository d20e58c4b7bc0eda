//! Read model handed to the presentation layer

use crate::board::{Board, Symbol};
use crate::rules::{available_symbols, Mode, Player, PlayerId};
use crate::turn::{Outcome, PendingAi, Status};

/// Everything a front-end needs to draw the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub mode: Mode,
    pub players: [Player; 2],
    pub status: Status,
    /// Player to move; `None` during setup and after the game ends
    pub current: Option<PlayerId>,
    pub pending: Option<PendingAi>,
    pub last_error: Option<String>,
}

impl Snapshot {
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.map(|id| self.player(id))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            Status::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the player to move is computer-controlled
    pub fn is_ai_turn(&self) -> bool {
        self.pending.is_some() || self.current_player().is_some_and(Player::is_computer)
    }

    /// Symbols the player to move may choose from
    pub fn available_symbols(&self) -> Vec<Symbol> {
        self.current_player()
            .map(|player| available_symbols(player, self.mode))
            .unwrap_or_default()
    }

    /// One-line description of where the game stands
    pub fn status_text(&self) -> String {
        match self.status {
            Status::AwaitingSetup => "Set up your game".to_string(),
            Status::Terminal(Outcome::Draw) => "It's a draw!".to_string(),
            Status::Terminal(Outcome::Winner(symbol)) => format!("Winner: {}", symbol),
            Status::InProgress if self.is_ai_turn() => "AI is thinking...".to_string(),
            Status::InProgress => match self.current_player() {
                Some(player) => format!(
                    "{} ({})'s turn",
                    self.mode.player_label(player.id),
                    player.kind
                ),
                None => String::new(),
            },
        }
    }
}
