//! The 3x3 board and line-based win detection

use std::fmt;
use std::str::FromStr;

use crate::error::{MoveError, ParseError};

/// Number of cells on the board
pub const CELLS: usize = 9;

/// Index of the center cell
pub const CENTER: usize = 4;

/// Indices of the four corner cells
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Winning positions (rows, columns, diagonals)
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // columns
    [0, 4, 8], [2, 4, 6],            // diagonals
];

/// A mark placed on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// Both symbols, X first
    pub const ALL: [Symbol; 2] = [Symbol::X, Symbol::O];

    /// The other symbol
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::X => f.write_str("X"),
            Symbol::O => f.write_str("O"),
        }
    }
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Symbol::X),
            "o" | "O" => Ok(Symbol::O),
            other => Err(ParseError::new("symbol", other)),
        }
    }
}

/// Fixed 9-cell grid, indexed row-major from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [Option<Symbol>; CELLS],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from explicit cell contents
    pub fn from_cells(cells: [Option<Symbol>; CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Symbol>; CELLS] {
        &self.cells
    }

    /// Symbol at `index`, `None` when empty or out of range
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.cells.get(index).copied().flatten()
    }

    /// Whether `index` is on the board and unoccupied
    pub fn is_empty_at(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    /// Place `symbol` at `index`
    ///
    /// # Errors
    ///
    /// `MoveError::OutOfRange` if `index >= 9`, `MoveError::Occupied` if the
    /// cell already holds a symbol. The board is unchanged on error.
    pub fn place(&mut self, index: usize, symbol: Symbol) -> Result<(), MoveError> {
        match self.cells.get_mut(index) {
            None => Err(MoveError::OutOfRange(index)),
            Some(Some(_)) => Err(MoveError::Occupied(index)),
            Some(cell) => {
                *cell = Some(symbol);
                Ok(())
            }
        }
    }

    /// Whether placing `symbol` at `index` would win for `symbol`
    pub fn completes_line(&self, index: usize, symbol: Symbol) -> bool {
        let mut probe = *self;
        probe.place(index, symbol).is_ok() && probe.winner() == Some(symbol)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Indices of unoccupied cells in ascending order
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELLS).filter(|&index| self.cells[index].is_none()).collect()
    }

    /// Number of occupied cells
    pub fn move_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Symbol owning a complete line, if any
    pub fn winner(&self) -> Option<Symbol> {
        self.winning_line().and_then(|[a, _, _]| self.cells[a])
    }

    /// First complete line found, in `WINNING_LINES` order
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        WINNING_LINES.iter().copied().find(|&[a, b, c]| {
            self.cells[a].is_some() && self.cells[a] == self.cells[b] && self.cells[b] == self.cells[c]
        })
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells = [None; CELLS];
    }
}

impl fmt::Display for Board {
    /// Renders the grid with free cells shown by their index
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let line: Vec<String> = (0..3)
                .map(|col| {
                    let index = row * 3 + col;
                    match self.cells[index] {
                        Some(symbol) => format!(" {} ", symbol),
                        None => format!(" {} ", index),
                    }
                })
                .collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(xs: &[usize], os: &[usize]) -> Board {
        let mut board = Board::new();
        for &i in xs {
            board.place(i, Symbol::X).unwrap();
        }
        for &i in os {
            board.place(i, Symbol::O).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert_eq!(board.cells(), &[None; 9]);
        assert_eq!(board.empty_cells(), (0..9).collect::<Vec<_>>());
        assert!(!board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_place_rejects_out_of_range() {
        let mut board = Board::new();
        assert_eq!(board.place(9, Symbol::X), Err(MoveError::OutOfRange(9)));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_place_rejects_occupied() {
        let mut board = Board::new();
        board.place(4, Symbol::X).unwrap();
        let before = board;

        assert_eq!(board.place(4, Symbol::O), Err(MoveError::Occupied(4)));
        assert_eq!(board, before);
        assert_eq!(board.get(4), Some(Symbol::X));
    }

    #[test]
    fn test_diagonal_winner() {
        let board = board_with(&[0, 4, 8], &[1, 2]);
        assert_eq!(board.winner(), Some(Symbol::X));
        assert_eq!(board.winning_line(), Some([0, 4, 8]));
    }

    #[test]
    fn test_every_line_wins() {
        for line in WINNING_LINES {
            let board = board_with(&[], &line);
            assert_eq!(board.winner(), Some(Symbol::O), "line {:?}", line);
        }
    }

    #[test]
    fn test_full_board_without_winner() {
        // X O X / X O O / O X X
        let board = board_with(&[0, 2, 3, 7, 8], &[1, 4, 5, 6]);
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
        assert_eq!(board.move_count(), 9);
    }

    #[test]
    fn test_completes_line() {
        let board = board_with(&[0, 1], &[4]);
        assert!(board.completes_line(2, Symbol::X));
        assert!(!board.completes_line(2, Symbol::O));
        assert!(!board.completes_line(0, Symbol::X));
        assert!(!board.completes_line(12, Symbol::X));
    }

    #[test]
    fn test_clear() {
        let mut board = board_with(&[0, 4], &[8]);
        board.clear();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_display() {
        let board = board_with(&[0], &[4]);
        let rendered = board.to_string();
        assert_eq!(
            rendered,
            " X | 1 | 2 \n---+---+---\n 3 | O | 5 \n---+---+---\n 6 | 7 | 8 \n"
        );
    }

    #[test]
    fn test_symbol_parse() {
        assert_eq!("x".parse::<Symbol>().unwrap(), Symbol::X);
        assert_eq!(" O ".parse::<Symbol>().unwrap(), Symbol::O);
        assert!("Z".parse::<Symbol>().is_err());
        assert_eq!(Symbol::X.opponent(), Symbol::O);
    }
}
