//! Reducer-store variant
//!
//! The whole game is one plain `GameState` value owned by an
//! `engine_core::Store`. Every change is an `Action` run through the pure
//! `reduce` function; the adapter only decides which actions to send. The
//! move policy and the ticket counter live outside the state because they
//! are not part of what the game looks like.

use std::time::Duration;

use engine_core::{Listener, Store, SubscriptionId};
use tracing::{debug, info, warn};

use crate::adapter::GameAdapter;
use crate::ai::MovePolicy;
use crate::board::{Board, Symbol};
use crate::error::GameError;
use crate::rules::{default_players, Mode, Player, PlayerId, PlayerKind};
use crate::snapshot::Snapshot;
use crate::turn::{apply_direct, apply_move, AiReplay, EngineConfig, Outcome, PendingAi, Status};

pub const NAME: &str = "store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub mode: Mode,
    pub players: [Player; 2],
    /// Player to move; `None` in setup and after the game ends
    pub current: Option<PlayerId>,
    pub winner: Option<Outcome>,
    pub is_setup: bool,
    pub pending: Option<PendingAi>,
    pub error_message: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: Board::new(),
            mode: Mode::Standard,
            players: default_players(),
            current: None,
            winner: None,
            is_setup: true,
            pending: None,
            error_message: None,
        }
    }
}

impl GameState {
    pub fn status(&self) -> Status {
        match (self.is_setup, self.winner) {
            (true, _) => Status::AwaitingSetup,
            (false, Some(outcome)) => Status::Terminal(outcome),
            (false, None) => Status::InProgress,
        }
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            mode: self.mode,
            players: self.players,
            status: self.status(),
            current: self.current,
            pending: self.pending,
            last_error: self.error_message.clone(),
        }
    }

    fn player(&self, id: PlayerId) -> Player {
        self.players[id.index()]
    }

    fn require_setup(&self, what: &str) -> Result<(), GameError> {
        if self.is_setup {
            Ok(())
        } else {
            Err(GameError::invalid_state(format!(
                "cannot {} after the game has started",
                what
            )))
        }
    }

    fn require_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if self.is_setup {
            return Err(GameError::invalid_state("the game has not started"));
        }
        if self.winner.is_some() {
            return Err(GameError::invalid_state("the game is over"));
        }
        if self.pending.is_some() {
            return Err(GameError::invalid_state("a computer move is pending"));
        }
        if self.current != Some(player) {
            return Err(GameError::invalid_state(format!("it is not {}'s turn", player)));
        }
        Ok(())
    }

    fn settle(&mut self, mover: PlayerId, outcome: Option<Outcome>) {
        self.winner = outcome;
        self.current = match outcome {
            Some(_) => None,
            None => Some(mover.other()),
        };
    }

    fn restart(&mut self) {
        self.board.clear();
        self.winner = None;
        self.pending = None;
        self.is_setup = false;
        self.current = Some(PlayerId::One);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetMode(Mode),
    SetPlayerKind(PlayerId, PlayerKind),
    StartGame,
    MakeMove {
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    },
    /// Computer move placed without turn or rule checks
    PlaceDirect {
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    },
    BeginAiTurn {
        ticket: u64,
        delay: Duration,
    },
    EndAiTurn {
        ticket: u64,
    },
    ResetGame,
    ResetToSetup,
    SetError(String),
    ClearError,
}

/// Apply `action` to `state`
///
/// Any action other than `SetError` that succeeds clears the error message.
pub fn reduce(state: &mut GameState, action: Action) -> Result<(), GameError> {
    let clears_error = !matches!(action, Action::SetError(_));

    match action {
        Action::SetMode(mode) => {
            state.require_setup("change the mode")?;
            state.mode = mode;
            for player in state.players.iter_mut() {
                *player = Player::new(player.id, player.kind, mode);
            }
        }
        Action::SetPlayerKind(id, kind) => {
            state.require_setup("change players")?;
            state.players[id.index()].kind = kind;
        }
        Action::StartGame => {
            state.require_setup("start again")?;
            state.restart();
        }
        Action::MakeMove {
            player,
            index,
            symbol,
        } => {
            state.require_turn(player)?;
            let acting = state.player(player);
            let (_, outcome) = apply_move(&mut state.board, state.mode, &acting, index, symbol)?;
            state.settle(player, outcome);
        }
        Action::PlaceDirect {
            player,
            index,
            symbol,
        } => {
            let acting = state.player(player);
            let (_, outcome) = apply_direct(&mut state.board, &acting, index, symbol)?;
            state.settle(player, outcome);
        }
        Action::BeginAiTurn { ticket, delay } => {
            let player = state
                .current
                .filter(|id| state.player(*id).is_computer())
                .ok_or_else(|| GameError::invalid_state("no computer is to move"))?;
            state.pending = Some(PendingAi {
                ticket,
                player,
                delay,
            });
        }
        Action::EndAiTurn { ticket } => match state.pending {
            Some(pending) if pending.ticket == ticket => state.pending = None,
            _ => return Err(GameError::invalid_state(format!("ticket {} is not pending", ticket))),
        },
        Action::ResetGame => state.restart(),
        Action::ResetToSetup => *state = GameState::default(),
        Action::SetError(message) => state.error_message = Some(message),
        Action::ClearError => {}
    }

    if clears_error {
        state.error_message = None;
    }
    Ok(())
}

pub struct StoreGame {
    config: EngineConfig,
    store: Store<GameState, Action, GameError>,
    policy: Box<dyn MovePolicy>,
    last_ticket: u64,
}

impl StoreGame {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_policy(config, config.policy())
    }

    pub fn with_policy(config: EngineConfig, policy: Box<dyn MovePolicy>) -> Self {
        Self {
            config,
            store: Store::new(GameState::default(), reduce),
            policy,
            last_ticket: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    fn advance(&mut self) -> Result<(), GameError> {
        loop {
            let state = self.store.state();
            if state.pending.is_some() {
                return Ok(());
            }
            let Some(player) = state.current else {
                return Ok(());
            };
            if !state.player(player).is_computer() {
                return Ok(());
            }
            if self.config.defers_ai() {
                self.last_ticket += 1;
                self.store.dispatch(Action::BeginAiTurn {
                    ticket: self.last_ticket,
                    delay: self.config.think_delay,
                })?;
                debug!(player = %player, ticket = self.last_ticket, "computer move scheduled");
                return Ok(());
            }
            self.run_ai(player)?;
        }
    }

    fn run_ai(&mut self, player: PlayerId) -> Result<(), GameError> {
        let state = self.store.state();
        let acting = state.player(player);
        let chosen = self
            .policy
            .choose_move(&state.board, state.mode, acting.symbol)?;
        let action = match self.config.ai_replay {
            AiReplay::Validated => Action::MakeMove {
                player,
                index: chosen.index,
                symbol: chosen.symbol,
            },
            AiReplay::Direct => Action::PlaceDirect {
                player,
                index: chosen.index,
                symbol: chosen.symbol,
            },
        };
        self.store.dispatch(action)?;
        self.log_outcome();
        Ok(())
    }

    fn log_outcome(&self) {
        if let Some(outcome) = self.store.state().winner {
            info!(outcome = %outcome, "game finished");
        }
    }

    /// Run `command`, putting back the state it started from if it fails
    fn atomically<T>(
        &mut self,
        command: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let saved = self.store.state().clone();
        let result = command(self);
        if result.is_err() && self.store.state() != &saved {
            debug!("rolling back partially applied command");
            self.store.replace(saved);
        }
        self.complete(result)
    }

    /// Rejected commands leave their message in the state
    fn complete<T>(&mut self, result: Result<T, GameError>) -> Result<T, GameError> {
        if let Err(err) = &result {
            warn!(error = %err, "command rejected");
            self.record_error(err);
        }
        result
    }

    fn record_error(&mut self, err: &GameError) {
        if let Err(err) = self.store.dispatch(Action::SetError(err.to_string())) {
            warn!(error = %err, "recording error failed");
        }
    }
}

impl GameAdapter for StoreGame {
    fn name(&self) -> &'static str {
        NAME
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), GameError> {
        let result = self.store.dispatch(Action::SetMode(mode));
        self.complete(result)
    }

    fn set_player_kind(&mut self, player: PlayerId, kind: PlayerKind) -> Result<(), GameError> {
        let result = self.store.dispatch(Action::SetPlayerKind(player, kind));
        self.complete(result)
    }

    fn start(&mut self) -> Result<(), GameError> {
        self.atomically(|game| {
            game.store.dispatch(Action::StartGame)?;
            info!(mode = %game.store.state().mode, "game started");
            game.advance()
        })
    }

    fn play_as(
        &mut self,
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    ) -> Result<(), GameError> {
        self.atomically(|game| {
            if game.store.state().player(player).is_computer() {
                return Err(GameError::invalid_state(format!(
                    "{} is computer-controlled",
                    player
                )));
            }
            game.store.dispatch(Action::MakeMove {
                player,
                index,
                symbol,
            })?;
            game.log_outcome();
            game.advance()
        })
    }

    fn play(&mut self, index: usize, symbol: Option<Symbol>) -> Result<(), GameError> {
        match self.store.state().current {
            Some(player) => self.play_as(player, index, symbol),
            None => self.complete(Err(GameError::no_game())),
        }
    }

    fn reset(&mut self) -> Result<(), GameError> {
        self.atomically(|game| {
            game.store.dispatch(Action::ResetGame)?;
            game.advance()
        })
    }

    fn reset_to_setup(&mut self) {
        self.store.replace(GameState::default());
        info!("returned to setup");
    }

    fn pending_ai(&self) -> Option<PendingAi> {
        self.store.state().pending
    }

    fn resolve_ai(&mut self, ticket: u64) -> Result<bool, GameError> {
        let player = match self.store.state().pending {
            Some(pending) if pending.ticket == ticket => pending.player,
            _ => {
                debug!(ticket, "stale computer move ignored");
                return Ok(false);
            }
        };

        self.atomically(|game| {
            game.store.dispatch(Action::EndAiTurn { ticket })?;
            game.run_ai(player)?;
            game.advance()?;
            Ok(true)
        })
    }

    fn snapshot(&self) -> Snapshot {
        self.store.state().to_snapshot()
    }

    fn subscribe(&mut self, mut listener: Listener<Snapshot>) -> SubscriptionId {
        self.store
            .subscribe(Box::new(move |state: &GameState| listener(&state.to_snapshot())))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    fn clear_error(&mut self) {
        if self.store.state().error_message.is_some() {
            if let Err(err) = self.store.dispatch(Action::ClearError) {
                warn!(error = %err, "clearing error failed");
            }
        }
    }
}
