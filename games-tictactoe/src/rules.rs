//! Players, game modes and the per-mode rule strategies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Symbol};
use crate::error::{MoveError, ParseError};

/// Which symbols a player may place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Each player owns one symbol for the whole game (X vs O)
    #[default]
    Standard,
    /// Either player may place either symbol on their turn
    Wild,
}

impl Mode {
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Standard => "Standard",
            Mode::Wild => "Wild",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Standard => "X vs O",
            Mode::Wild => "Choose X or O each turn",
        }
    }

    /// Label shown for a player, including the bound symbol in standard mode
    pub fn player_label(self, id: PlayerId) -> String {
        match self {
            Mode::Standard => format!("{} ({})", id, id.standard_symbol()),
            Mode::Wild => id.to_string(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "fixed" => Ok(Mode::Standard),
            "wild" | "free" => Ok(Mode::Wild),
            _ => Err(ParseError::new("mode", s)),
        }
    }
}

/// Seat at the table; player one always moves first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Symbol the seat plays in standard mode
    pub fn standard_symbol(self) -> Symbol {
        match self {
            PlayerId::One => Symbol::X,
            PlayerId::Two => Symbol::O,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => f.write_str("Player 1"),
            PlayerId::Two => f.write_str("Player 2"),
        }
    }
}

impl FromStr for PlayerId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "one" | "player1" => Ok(PlayerId::One),
            "2" | "two" | "player2" => Ok(PlayerId::Two),
            _ => Err(ParseError::new("player", s)),
        }
    }
}

/// Who decides a player's moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    #[default]
    Human,
    Computer,
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKind::Human => f.write_str("Human"),
            PlayerKind::Computer => f.write_str("Computer"),
        }
    }
}

impl FromStr for PlayerKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(PlayerKind::Human),
            "computer" | "ai" | "cpu" => Ok(PlayerKind::Computer),
            _ => Err(ParseError::new("player kind", s)),
        }
    }
}

/// A seat, who controls it, and its symbol when the mode binds one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Player {
    pub id: PlayerId,
    pub kind: PlayerKind,
    pub symbol: Option<Symbol>,
}

impl Player {
    /// Player as configured for `mode`
    pub fn new(id: PlayerId, kind: PlayerKind, mode: Mode) -> Self {
        let symbol = match mode {
            Mode::Standard => Some(id.standard_symbol()),
            Mode::Wild => None,
        };
        Self { id, kind, symbol }
    }

    pub fn is_computer(&self) -> bool {
        self.kind == PlayerKind::Computer
    }
}

/// Default seats: two humans in standard mode
pub fn default_players() -> [Player; 2] {
    [
        Player::new(PlayerId::One, PlayerKind::Human, Mode::Standard),
        Player::new(PlayerId::Two, PlayerKind::Human, Mode::Standard),
    ]
}

/// Per-mode move policy
pub trait RuleStrategy: Send + Sync {
    /// Mode this strategy implements
    fn mode(&self) -> Mode;

    /// Whether `index` may be played; range checking is left to the caller
    fn is_move_valid(&self, board: &Board, index: usize) -> bool;

    /// Symbols `player` may place in `mode`
    fn available_symbols(&self, player: &Player, mode: Mode) -> Vec<Symbol>;

    fn check_winner(&self, board: &Board) -> Option<Symbol> {
        board.winner()
    }
}

/// Fixed-symbol rules
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RuleStrategy for StandardRules {
    fn mode(&self) -> Mode {
        Mode::Standard
    }

    fn is_move_valid(&self, board: &Board, index: usize) -> bool {
        cell_is_free(board, index)
    }

    fn available_symbols(&self, player: &Player, mode: Mode) -> Vec<Symbol> {
        if mode != Mode::Standard {
            return Vec::new();
        }
        player.symbol.into_iter().collect()
    }
}

/// Free-symbol rules
#[derive(Debug, Clone, Copy, Default)]
pub struct WildRules;

impl RuleStrategy for WildRules {
    fn mode(&self) -> Mode {
        Mode::Wild
    }

    fn is_move_valid(&self, board: &Board, index: usize) -> bool {
        cell_is_free(board, index)
    }

    fn available_symbols(&self, _player: &Player, mode: Mode) -> Vec<Symbol> {
        if mode != Mode::Wild {
            return Vec::new();
        }
        Symbol::ALL.to_vec()
    }
}

fn cell_is_free(board: &Board, index: usize) -> bool {
    board.is_empty_at(index)
}

static STANDARD: StandardRules = StandardRules;
static WILD: WildRules = WildRules;

/// Strategy for `mode`
pub fn rules_for(mode: Mode) -> &'static dyn RuleStrategy {
    match mode {
        Mode::Standard => &STANDARD,
        Mode::Wild => &WILD,
    }
}

/// Symbols `player` may place in `mode`
pub fn available_symbols(player: &Player, mode: Mode) -> Vec<Symbol> {
    rules_for(mode).available_symbols(player, mode)
}

/// Decide which symbol a move by `player` places
///
/// In standard mode the bound symbol is used and `requested` may only repeat
/// it. In wild mode `requested` is mandatory.
pub fn resolve_symbol(
    player: &Player,
    mode: Mode,
    requested: Option<Symbol>,
) -> Result<Symbol, MoveError> {
    let allowed = available_symbols(player, mode);
    match (mode, requested) {
        (_, Some(symbol)) if allowed.contains(&symbol) => Ok(symbol),
        (_, Some(symbol)) => Err(MoveError::SymbolNotAvailable(symbol)),
        (Mode::Standard, None) => allowed
            .first()
            .copied()
            .ok_or(MoveError::SymbolRequired),
        (Mode::Wild, None) => Err(MoveError::SymbolRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_valid_only_on_empty_cell() {
        let mut board = Board::new();
        board.place(3, Symbol::O).unwrap();

        for mode in [Mode::Standard, Mode::Wild] {
            let rules = rules_for(mode);
            assert_eq!(rules.mode(), mode);
            assert!(rules.is_move_valid(&board, 0));
            assert!(!rules.is_move_valid(&board, 3));
            assert!(!rules.is_move_valid(&board, 9));
        }
    }

    #[test]
    fn test_available_symbols_standard() {
        let one = Player::new(PlayerId::One, PlayerKind::Human, Mode::Standard);
        let two = Player::new(PlayerId::Two, PlayerKind::Computer, Mode::Standard);

        assert_eq!(available_symbols(&one, Mode::Standard), vec![Symbol::X]);
        assert_eq!(available_symbols(&two, Mode::Standard), vec![Symbol::O]);
        assert!(StandardRules.available_symbols(&one, Mode::Wild).is_empty());
    }

    #[test]
    fn test_available_symbols_wild() {
        let one = Player::new(PlayerId::One, PlayerKind::Human, Mode::Wild);
        assert_eq!(one.symbol, None);
        assert_eq!(available_symbols(&one, Mode::Wild), vec![Symbol::X, Symbol::O]);
        assert!(WildRules.available_symbols(&one, Mode::Standard).is_empty());
    }

    #[test]
    fn test_resolve_symbol() {
        let two = Player::new(PlayerId::Two, PlayerKind::Human, Mode::Standard);
        assert_eq!(resolve_symbol(&two, Mode::Standard, None), Ok(Symbol::O));
        assert_eq!(resolve_symbol(&two, Mode::Standard, Some(Symbol::O)), Ok(Symbol::O));
        assert_eq!(
            resolve_symbol(&two, Mode::Standard, Some(Symbol::X)),
            Err(MoveError::SymbolNotAvailable(Symbol::X))
        );

        let wild = Player::new(PlayerId::Two, PlayerKind::Human, Mode::Wild);
        assert_eq!(resolve_symbol(&wild, Mode::Wild, None), Err(MoveError::SymbolRequired));
        assert_eq!(resolve_symbol(&wild, Mode::Wild, Some(Symbol::X)), Ok(Symbol::X));
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(Mode::Standard.player_label(PlayerId::One), "Player 1 (X)");
        assert_eq!(Mode::Standard.player_label(PlayerId::Two), "Player 2 (O)");
        assert_eq!(Mode::Wild.player_label(PlayerId::Two), "Player 2");
        assert_eq!(Mode::Wild.description(), "Choose X or O each turn");
    }

    #[test]
    fn test_parsing() {
        assert_eq!("Wild".parse::<Mode>().unwrap(), Mode::Wild);
        assert_eq!("2".parse::<PlayerId>().unwrap(), PlayerId::Two);
        assert_eq!("AI".parse::<PlayerKind>().unwrap(), PlayerKind::Computer);
        assert!("robot".parse::<PlayerKind>().is_err());
    }
}
