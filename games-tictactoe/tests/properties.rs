//! Property tests over random move sequences, run against every variant
//!
//! Invariants covered:
//! - `winner()` names a symbol exactly when some line is full of it.
//! - A terminal winner always matches a completed line on the board.
//! - A game in progress has neither a completed line nor a full board.
//! - A rejected move changes nothing but the error message.
//! - Reset empties the board, gives player one the turn and cancels any
//!   pending computer move.
//! - The selector only ever picks empty cells and takes immediate wins.

use std::time::Duration;

use games_tictactoe::ai::winning_moves;
use games_tictactoe::board::WINNING_LINES;
use games_tictactoe::{
    choose_move, create_variant, Board, EngineConfig, GameAdapter, Mode, Outcome, PlayerId,
    PlayerKind, Snapshot, Status, Symbol,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const VARIANTS: [&str; 3] = ["fsm", "table", "store"];

fn new_game(variant: &str, config: EngineConfig, mode: Mode) -> Box<dyn GameAdapter> {
    let mut game = create_variant(variant, config).unwrap();
    game.set_mode(mode).unwrap();
    game
}

fn symbol_for(mode: Mode, use_x: bool) -> Option<Symbol> {
    match mode {
        Mode::Standard => None,
        Mode::Wild if use_x => Some(Symbol::X),
        Mode::Wild => Some(Symbol::O),
    }
}

fn assert_consistent(snapshot: &Snapshot) {
    match snapshot.status {
        Status::Terminal(Outcome::Winner(symbol)) => {
            assert_eq!(snapshot.board.winner(), Some(symbol));
            assert_eq!(snapshot.current, None);
        }
        Status::Terminal(Outcome::Draw) => {
            assert!(snapshot.board.is_full());
            assert_eq!(snapshot.board.winner(), None);
        }
        Status::InProgress => {
            assert_eq!(snapshot.board.winner(), None);
            assert!(!snapshot.board.is_full());
            assert!(snapshot.current.is_some());
        }
        Status::AwaitingSetup => panic!("left setup after start"),
    }
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Standard), Just(Mode::Wild)]
}

fn board_strategy() -> impl Strategy<Value = Board> {
    prop::array::uniform9(prop_oneof![
        Just(None),
        Just(Some(Symbol::X)),
        Just(Some(Symbol::O)),
    ])
    .prop_map(Board::from_cells)
}

proptest! {
    #[test]
    fn random_play_keeps_status_consistent(
        variant in prop::sample::select(VARIANTS.to_vec()),
        mode in mode_strategy(),
        moves in prop::collection::vec((0usize..11, any::<bool>()), 1..40),
    ) {
        let mut game = new_game(variant, EngineConfig::seeded(3), mode);
        game.start().unwrap();

        for (index, use_x) in moves {
            if matches!(game.snapshot().status, Status::Terminal(_)) {
                break;
            }
            let before = game.snapshot();
            match game.play(index, symbol_for(mode, use_x)) {
                Ok(()) => {
                    let after = game.snapshot();
                    prop_assert_eq!(after.board.move_count(), before.board.move_count() + 1);
                    prop_assert!(after.last_error.is_none());
                }
                Err(err) => {
                    let after = game.snapshot();
                    prop_assert_eq!(after.board, before.board);
                    prop_assert_eq!(after.current, before.current);
                    prop_assert_eq!(after.status, before.status);
                    prop_assert_eq!(after.last_error, Some(err.to_string()));
                }
            }
            assert_consistent(&game.snapshot());
        }
    }

    #[test]
    fn occupied_cells_are_rejected(
        variant in prop::sample::select(VARIANTS.to_vec()),
        first in 0usize..9,
    ) {
        let mut game = new_game(variant, EngineConfig::seeded(1), Mode::Standard);
        game.start().unwrap();
        game.play(first, None).unwrap();
        let before = game.snapshot();

        prop_assert!(game.play(first, None).is_err());
        let after = game.snapshot();
        prop_assert_eq!(after.board, before.board);
        prop_assert_eq!(after.current, Some(PlayerId::Two));
    }

    #[test]
    fn computer_opponent_never_breaks_invariants(
        variant in prop::sample::select(VARIANTS.to_vec()),
        mode in mode_strategy(),
        seed in any::<u64>(),
        moves in prop::collection::vec((0usize..9, any::<bool>()), 1..20),
    ) {
        let mut game = create_variant(variant, EngineConfig::seeded(seed)).unwrap();
        game.set_mode(mode).unwrap();
        game.set_player_kind(PlayerId::Two, PlayerKind::Computer).unwrap();
        game.start().unwrap();

        for (index, use_x) in moves {
            let snapshot = game.snapshot();
            if matches!(snapshot.status, Status::Terminal(_)) {
                break;
            }
            prop_assert_eq!(snapshot.current, Some(PlayerId::One));
            let _ = game.play(index, symbol_for(mode, use_x));
            assert_consistent(&game.snapshot());
        }
    }

    #[test]
    fn reset_restores_fresh_game(
        variant in prop::sample::select(VARIANTS.to_vec()),
        moves in prop::collection::vec(0usize..9, 0..5),
    ) {
        let config = EngineConfig::with_delay(Duration::from_millis(50));
        let mut game = create_variant(variant, config).unwrap();
        game.set_player_kind(PlayerId::Two, PlayerKind::Computer).unwrap();
        game.start().unwrap();
        for index in moves {
            let _ = game.play(index, None);
            if let Some(pending) = game.pending_ai() {
                game.resolve_ai(pending.ticket).unwrap();
            }
        }
        let _ = game.play(4, None);
        let stale = game.pending_ai();

        game.reset().unwrap();
        let snapshot = game.snapshot();
        prop_assert_eq!(snapshot.board, Board::new());
        prop_assert_eq!(snapshot.current, Some(PlayerId::One));
        prop_assert_eq!(snapshot.status, Status::InProgress);
        prop_assert_eq!(snapshot.pending, None);
        if let Some(pending) = stale {
            prop_assert!(!game.resolve_ai(pending.ticket).unwrap());
            prop_assert_eq!(game.snapshot().board, Board::new());
        }
    }

    #[test]
    fn selector_picks_empty_cells(
        board in board_strategy(),
        mode in mode_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let acting = match mode {
            Mode::Standard => Some(Symbol::O),
            Mode::Wild => None,
        };
        match choose_move(&board, mode, acting, &mut rng) {
            Ok(chosen) => {
                prop_assert!(board.is_empty_at(chosen.index));
                prop_assert_eq!(chosen.symbol.is_some(), mode == Mode::Wild);
            }
            Err(_) => prop_assert!(board.is_full()),
        }
    }

    #[test]
    fn selector_takes_immediate_wins(board in board_strategy(), seed in any::<u64>()) {
        prop_assume!(!board.is_full());
        let wins = winning_moves(&board, Symbol::O);
        prop_assume!(!wins.is_empty());

        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let chosen = choose_move(&board, Mode::Standard, Some(Symbol::O), &mut rng).unwrap();
        prop_assert!(wins.contains(&chosen.index));
    }

    #[test]
    fn winner_matches_a_completed_line(board in board_strategy()) {
        let completed: Vec<Symbol> = WINNING_LINES
            .iter()
            .filter_map(|&[a, b, c]| match board.get(a) {
                Some(symbol) if board.get(b) == Some(symbol) && board.get(c) == Some(symbol) => {
                    Some(symbol)
                }
                _ => None,
            })
            .collect();

        match board.winner() {
            Some(symbol) => prop_assert!(completed.contains(&symbol)),
            None => prop_assert!(completed.is_empty()),
        }
    }
}

#[test]
fn full_board_without_line_is_a_draw() {
    for variant in VARIANTS {
        let mut game = new_game(variant, EngineConfig::default(), Mode::Standard);
        game.start().unwrap();
        for index in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            game.play(index, None).unwrap();
        }
        assert_eq!(game.snapshot().status, Status::Terminal(Outcome::Draw), "{}", variant);
    }
}
