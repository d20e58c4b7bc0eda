//! Cross-variant conformance
//!
//! The three architectures are driven with the same scripts and must end up
//! in the same observable state after every step. Phase errors from the
//! transition table are worded differently, so error messages are compared
//! by presence only.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use games_tictactoe::{
    create_variant, list_variants, AiReplay, Board, EngineConfig, GameAdapter, GameError, Mode,
    MoveError, Outcome, PlayerId, PlayerKind, Snapshot, Status, Symbol,
};

#[derive(Debug, Clone, Copy)]
enum Step {
    ChooseMode(Mode),
    Kind(PlayerId, PlayerKind),
    Start,
    Play(usize, Option<Symbol>),
    Reset,
    Setup,
    /// Apply whatever computer move is pending
    Resolve,
}

fn run(game: &mut dyn GameAdapter, step: Step) -> Result<(), GameError> {
    match step {
        Step::ChooseMode(mode) => game.set_mode(mode),
        Step::Kind(player, kind) => game.set_player_kind(player, kind),
        Step::Start => game.start(),
        Step::Play(index, symbol) => game.play(index, symbol),
        Step::Reset => game.reset(),
        Step::Setup => {
            game.reset_to_setup();
            Ok(())
        }
        Step::Resolve => match game.pending_ai() {
            Some(pending) => game.resolve_ai(pending.ticket).map(|_| ()),
            None => Ok(()),
        },
    }
}

fn comparable(mut snapshot: Snapshot) -> Snapshot {
    snapshot.last_error = snapshot.last_error.map(|_| String::new());
    snapshot
}

/// Run `script` on every variant, checking they agree after each step
fn assert_conforms(config: EngineConfig, script: &[Step]) -> Snapshot {
    let mut games: Vec<Box<dyn GameAdapter>> = ["fsm", "table", "store"]
        .iter()
        .map(|name| create_variant(name, config).unwrap())
        .collect();

    for (i, step) in script.iter().enumerate() {
        let results: Vec<bool> = games
            .iter_mut()
            .map(|game| run(game.as_mut(), *step).is_ok())
            .collect();
        let reference = comparable(games[0].snapshot());
        for (game, ok) in games.iter().zip(&results).skip(1) {
            assert_eq!(*ok, results[0], "step {} {:?} on {}", i, step, game.name());
            assert_eq!(
                comparable(game.snapshot()),
                reference,
                "step {} {:?} on {}",
                i,
                step,
                game.name()
            );
        }
    }
    games[0].snapshot()
}

#[test]
fn test_all_variants_registered() {
    assert!(list_variants().len() >= 3);
}

#[test]
fn test_standard_game_with_mistakes() {
    use Step::*;
    let last = assert_conforms(
        EngineConfig::default(),
        &[
            Play(0, None),
            Start,
            Play(4, None),
            Play(4, None),
            Play(9, None),
            Play(0, None),
            ChooseMode(Mode::Wild),
            Play(3, None),
            Play(8, None),
            Play(5, None),
            Play(1, None),
        ],
    );
    assert_eq!(last.status, Status::Terminal(Outcome::Winner(Symbol::X)));
    assert_eq!(last.board.winning_line(), Some([3, 4, 5]));
}

#[test]
fn test_wild_game() {
    use Step::*;
    let last = assert_conforms(
        EngineConfig::default(),
        &[
            ChooseMode(Mode::Wild),
            Start,
            Play(0, None),
            Play(0, Some(Symbol::O)),
            Play(1, Some(Symbol::O)),
            Play(2, Some(Symbol::O)),
        ],
    );
    assert_eq!(last.status, Status::Terminal(Outcome::Winner(Symbol::O)));
}

#[test]
fn test_seeded_computer_games_agree() {
    use Step::*;
    for seed in 0..20 {
        for mode in [Mode::Standard, Mode::Wild] {
            let last = assert_conforms(
                EngineConfig::seeded(seed),
                &[
                    ChooseMode(mode),
                    Kind(PlayerId::One, PlayerKind::Computer),
                    Kind(PlayerId::Two, PlayerKind::Computer),
                    Start,
                ],
            );
            assert!(matches!(last.status, Status::Terminal(_)));
        }
    }
}

#[test]
fn test_direct_replay_agrees() {
    use Step::*;
    let config = EngineConfig {
        ai_replay: AiReplay::Direct,
        seed: Some(11),
        ..EngineConfig::default()
    };
    assert_conforms(
        config,
        &[
            ChooseMode(Mode::Wild),
            Kind(PlayerId::Two, PlayerKind::Computer),
            Start,
            Play(4, Some(Symbol::X)),
            Play(0, Some(Symbol::O)),
            Reset,
            Play(8, Some(Symbol::O)),
        ],
    );
}

#[test]
fn test_delayed_computer_moves_agree() {
    use Step::*;
    let config = EngineConfig {
        think_delay: Duration::from_millis(300),
        seed: Some(5),
        ..EngineConfig::default()
    };
    let last = assert_conforms(
        config,
        &[
            Kind(PlayerId::One, PlayerKind::Computer),
            Start,
            Play(0, None),
            Resolve,
            Play(0, None),
            Reset,
            Resolve,
            Setup,
            Start,
            Play(1, None),
        ],
    );
    assert_eq!(last.pending, None);
    assert_eq!(last.current, Some(PlayerId::Two));
    assert_eq!(last.board.get(1), Some(Symbol::X));
}

#[test]
fn test_pending_ticket_lifecycle() {
    let config = EngineConfig::with_delay(Duration::from_millis(100));
    for name in ["fsm", "table", "store"] {
        let mut game = create_variant(name, config).unwrap();
        game.set_player_kind(PlayerId::Two, PlayerKind::Computer).unwrap();
        game.start().unwrap();
        assert_eq!(game.pending_ai(), None, "{}", name);

        game.play(4, None).unwrap();
        let first = game.pending_ai().unwrap();
        assert_eq!(first.player, PlayerId::Two);
        assert_eq!(first.delay, Duration::from_millis(100));
        assert!(game.snapshot().is_ai_turn());

        let err = game.play(0, None).unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)), "{}", name);

        game.reset().unwrap();
        assert!(!game.resolve_ai(first.ticket).unwrap(), "{}", name);
        assert_eq!(game.snapshot().board, Board::new());

        game.play(4, None).unwrap();
        let second = game.pending_ai().unwrap();
        assert!(second.ticket > first.ticket);
        assert!(game.resolve_ai(second.ticket).unwrap());
        assert!(!game.resolve_ai(second.ticket).unwrap());
        assert_eq!(game.snapshot().board.move_count(), 2);
    }
}

#[test]
fn test_listeners_and_error_slot() {
    for name in ["fsm", "table", "store"] {
        let mut game = create_variant(name, EngineConfig::default()).unwrap();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        let id = game.subscribe(Box::new(move |s: &Snapshot| {
            sink.borrow_mut().push(s.last_error.clone())
        }));

        game.start().unwrap();
        game.play(4, None).unwrap();
        let err = game.play(4, None).unwrap_err();
        assert_eq!(err, GameError::InvalidMove(MoveError::Occupied(4)));
        assert_eq!(game.last_error(), Some(err.to_string()));
        assert_eq!(errors.borrow().last(), Some(&Some(err.to_string())));

        game.clear_error();
        assert_eq!(game.last_error(), None);
        assert_eq!(errors.borrow().last(), Some(&None), "{}", name);

        game.play(4, None).unwrap_err();
        game.play(0, None).unwrap();
        assert_eq!(game.last_error(), None);

        assert!(game.unsubscribe(id));
        let seen = errors.borrow().len();
        game.reset().unwrap();
        assert_eq!(errors.borrow().len(), seen);
    }
}
