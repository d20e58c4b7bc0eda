//! Explicit finite-state machine
//!
//! The game's phase is a single enum and every command matches on it by
//! hand. This is the reference variant; the table and store variants must
//! behave identically.

use engine_core::{Listener, Listeners, SubscriptionId};
use tracing::{debug, info, warn};

use crate::adapter::GameAdapter;
use crate::ai::MovePolicy;
use crate::board::{Board, Symbol};
use crate::error::GameError;
use crate::rules::{default_players, Mode, Player, PlayerId, PlayerKind};
use crate::snapshot::Snapshot;
use crate::turn::{apply_direct, apply_move, AiReplay, EngineConfig, Outcome, PendingAi, Status};

pub const NAME: &str = "fsm";

/// Where the game currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    /// Waiting for this player's move
    Thinking(PlayerId),
    /// Computer move scheduled, waiting for its delay
    AiPending { player: PlayerId, ticket: u64 },
    Finished(Outcome),
}

pub struct Game {
    config: EngineConfig,
    board: Board,
    mode: Mode,
    players: [Player; 2],
    phase: Phase,
    last_ticket: u64,
    policy: Box<dyn MovePolicy>,
    listeners: Listeners<Snapshot>,
    last_error: Option<String>,
}

impl Game {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_policy(config, config.policy())
    }

    /// Game whose computer moves come from `policy`
    pub fn with_policy(config: EngineConfig, policy: Box<dyn MovePolicy>) -> Self {
        Self {
            config,
            board: Board::new(),
            mode: Mode::Standard,
            players: default_players(),
            phase: Phase::Setup,
            last_ticket: 0,
            policy,
            listeners: Listeners::new(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    fn require_setup(&self, what: &str) -> Result<(), GameError> {
        match self.phase {
            Phase::Setup => Ok(()),
            _ => Err(GameError::invalid_state(format!(
                "cannot {} after the game has started",
                what
            ))),
        }
    }

    /// Fresh board, player one to move, then let computers take their turns
    fn begin(&mut self) -> Result<(), GameError> {
        self.board.clear();
        self.phase = Phase::Thinking(PlayerId::One);
        info!(mode = %self.mode, "game started");
        self.advance()
    }

    /// Guarded move shared by humans and validated computer moves
    fn try_move(
        &mut self,
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    ) -> Result<(), GameError> {
        match self.phase {
            Phase::Thinking(current) if current == player => {}
            Phase::Thinking(_) => {
                return Err(GameError::invalid_state(format!("it is not {}'s turn", player)))
            }
            Phase::AiPending { .. } => {
                return Err(GameError::invalid_state("a computer move is pending"))
            }
            Phase::Setup => return Err(GameError::invalid_state("the game has not started")),
            Phase::Finished(_) => return Err(GameError::invalid_state("the game is over")),
        }

        let acting = self.players[player.index()];
        let (_, outcome) = apply_move(&mut self.board, self.mode, &acting, index, symbol)?;
        self.settle(player, outcome);
        Ok(())
    }

    fn settle(&mut self, mover: PlayerId, outcome: Option<Outcome>) {
        self.phase = match outcome {
            Some(outcome) => {
                info!(outcome = %outcome, "game finished");
                Phase::Finished(outcome)
            }
            None => Phase::Thinking(mover.other()),
        };
    }

    /// Run or schedule computer moves until a human is to move or the game ends
    fn advance(&mut self) -> Result<(), GameError> {
        while let Phase::Thinking(current) = self.phase {
            if !self.players[current.index()].is_computer() {
                break;
            }
            if self.config.defers_ai() {
                self.last_ticket += 1;
                self.phase = Phase::AiPending {
                    player: current,
                    ticket: self.last_ticket,
                };
                debug!(player = %current, ticket = self.last_ticket, "computer move scheduled");
                break;
            }
            self.run_ai(current)?;
        }
        Ok(())
    }

    fn run_ai(&mut self, player: PlayerId) -> Result<(), GameError> {
        let acting = self.players[player.index()];
        let chosen = self.policy.choose_move(&self.board, self.mode, acting.symbol)?;
        match self.config.ai_replay {
            AiReplay::Validated => self.try_move(player, chosen.index, chosen.symbol),
            AiReplay::Direct => {
                let (_, outcome) = apply_direct(&mut self.board, &acting, chosen.index, chosen.symbol)?;
                self.settle(player, outcome);
                Ok(())
            }
        }
    }

    /// Run `command`, putting the board and phase back if it fails
    fn atomically<T>(
        &mut self,
        command: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let (board, phase) = (self.board, self.phase);
        let result = command(self);
        if result.is_err() {
            self.board = board;
            self.phase = phase;
        }
        self.complete(result)
    }

    /// Record the command result and tell listeners
    fn complete<T>(&mut self, result: Result<T, GameError>) -> Result<T, GameError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => {
                warn!(error = %err, "command rejected");
                self.last_error = Some(err.to_string());
            }
        }
        self.notify();
        result
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.listeners.notify(&snapshot);
    }
}

impl GameAdapter for Game {
    fn name(&self) -> &'static str {
        NAME
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), GameError> {
        let result = self.require_setup("change the mode").map(|()| {
            self.mode = mode;
            for player in self.players.iter_mut() {
                *player = Player::new(player.id, player.kind, mode);
            }
        });
        self.complete(result)
    }

    fn set_player_kind(&mut self, player: PlayerId, kind: PlayerKind) -> Result<(), GameError> {
        let result = self.require_setup("change players").map(|()| {
            self.players[player.index()].kind = kind;
        });
        self.complete(result)
    }

    fn start(&mut self) -> Result<(), GameError> {
        self.atomically(|game| {
            game.require_setup("start again")?;
            game.begin()
        })
    }

    fn play_as(
        &mut self,
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    ) -> Result<(), GameError> {
        self.atomically(|game| {
            if game.players[player.index()].is_computer() {
                return Err(GameError::invalid_state(format!(
                    "{} is computer-controlled",
                    player
                )));
            }
            game.try_move(player, index, symbol)?;
            game.advance()
        })
    }

    fn play(&mut self, index: usize, symbol: Option<Symbol>) -> Result<(), GameError> {
        match self.snapshot().current {
            Some(player) => self.play_as(player, index, symbol),
            None => self.complete(Err(GameError::no_game())),
        }
    }

    fn reset(&mut self) -> Result<(), GameError> {
        self.atomically(|game| game.begin())
    }

    fn reset_to_setup(&mut self) {
        self.board.clear();
        self.mode = Mode::Standard;
        self.players = default_players();
        self.phase = Phase::Setup;
        self.last_error = None;
        info!("returned to setup");
        self.notify();
    }

    fn pending_ai(&self) -> Option<PendingAi> {
        match self.phase {
            Phase::AiPending { player, ticket } => Some(PendingAi {
                ticket,
                player,
                delay: self.config.think_delay,
            }),
            _ => None,
        }
    }

    fn resolve_ai(&mut self, ticket: u64) -> Result<bool, GameError> {
        let player = match self.phase {
            Phase::AiPending { player, ticket: pending } if pending == ticket => player,
            _ => {
                debug!(ticket, "stale computer move ignored");
                return Ok(false);
            }
        };

        self.atomically(|game| {
            game.phase = Phase::Thinking(player);
            game.run_ai(player)?;
            game.advance()?;
            Ok(true)
        })
    }

    fn snapshot(&self) -> Snapshot {
        let (status, current) = match self.phase {
            Phase::Setup => (Status::AwaitingSetup, None),
            Phase::Thinking(player) | Phase::AiPending { player, .. } => {
                (Status::InProgress, Some(player))
            }
            Phase::Finished(outcome) => (Status::Terminal(outcome), None),
        };
        Snapshot {
            board: self.board,
            mode: self.mode,
            players: self.players,
            status,
            current,
            pending: self.pending_ai(),
            last_error: self.last_error.clone(),
        }
    }

    fn subscribe(&mut self, listener: Listener<Snapshot>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.notify();
        }
    }
}
