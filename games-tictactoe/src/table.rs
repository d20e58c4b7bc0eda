//! Transition-table variant
//!
//! Turn order lives in an `engine_core::StateMachine`: each seat has a
//! thinking state and a pending state, and moves fire `P1Done`/`P2Done`
//! events whose guards route to the other seat or to `Finished`. Phase
//! errors come straight from the machine. Going back to setup restarts the
//! machine rather than firing an event.

use engine_core::{Listener, Listeners, StateMachine, SubscriptionId, Transition};
use tracing::{debug, info, warn};

use crate::adapter::GameAdapter;
use crate::ai::MovePolicy;
use crate::board::{Board, Symbol};
use crate::error::GameError;
use crate::rules::{default_players, Mode, Player, PlayerId, PlayerKind};
use crate::snapshot::Snapshot;
use crate::turn::{apply_direct, apply_move, AiReplay, EngineConfig, Outcome, PendingAi, Status};

pub const NAME: &str = "table";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    Setup,
    P1Thinking,
    P2Thinking,
    P1Pending,
    P2Pending,
    Finished,
}

impl TurnState {
    const ALL: [TurnState; 6] = [
        TurnState::Setup,
        TurnState::P1Thinking,
        TurnState::P2Thinking,
        TurnState::P1Pending,
        TurnState::P2Pending,
        TurnState::Finished,
    ];

    /// Seat the state belongs to, if any
    pub fn player(self) -> Option<PlayerId> {
        match self {
            TurnState::P1Thinking | TurnState::P1Pending => Some(PlayerId::One),
            TurnState::P2Thinking | TurnState::P2Pending => Some(PlayerId::Two),
            TurnState::Setup | TurnState::Finished => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnEvent {
    /// Setup-only configuration change
    Configure,
    Begin,
    P1Done,
    P2Done,
    Schedule,
    Resume,
    Reset,
}

fn done_event(player: PlayerId) -> TurnEvent {
    match player {
        PlayerId::One => TurnEvent::P1Done,
        PlayerId::Two => TurnEvent::P2Done,
    }
}

/// Data the transition guards and actions work on
#[derive(Debug, Clone)]
pub struct TableContext {
    pub board: Board,
    pub mode: Mode,
    pub players: [Player; 2],
    pub outcome: Option<Outcome>,
    /// Last ticket handed out; never reset
    pub last_ticket: u64,
}

impl Default for TableContext {
    fn default() -> Self {
        Self {
            board: Board::new(),
            mode: Mode::Standard,
            players: default_players(),
            outcome: None,
            last_ticket: 0,
        }
    }
}

fn ended(ctx: &TableContext) -> bool {
    ctx.outcome.is_some()
}

fn ongoing(ctx: &TableContext) -> bool {
    ctx.outcome.is_none()
}

fn p1_is_computer(ctx: &TableContext) -> bool {
    ctx.players[0].is_computer()
}

fn p2_is_computer(ctx: &TableContext) -> bool {
    ctx.players[1].is_computer()
}

fn clear_board(ctx: &mut TableContext) {
    ctx.board.clear();
    ctx.outcome = None;
}

fn issue_ticket(ctx: &mut TableContext) {
    ctx.last_ticket += 1;
}

fn restore_defaults(ctx: &mut TableContext) {
    *ctx = TableContext {
        last_ticket: ctx.last_ticket,
        ..TableContext::default()
    };
}

/// Every transition the game can take
pub fn transitions() -> Vec<Transition<TurnState, TurnEvent, TableContext>> {
    use TurnEvent::*;
    use TurnState::*;

    let mut rows = vec![
        Transition::new(Setup, Configure, Setup),
        Transition::new(Setup, Begin, P1Thinking).action(clear_board),
        Transition::new(P1Thinking, P1Done, Finished).guard(ended),
        Transition::new(P1Thinking, P1Done, P2Thinking).guard(ongoing),
        Transition::new(P2Thinking, P2Done, Finished).guard(ended),
        Transition::new(P2Thinking, P2Done, P1Thinking).guard(ongoing),
        Transition::new(P1Thinking, Schedule, P1Pending)
            .guard(p1_is_computer)
            .action(issue_ticket),
        Transition::new(P2Thinking, Schedule, P2Pending)
            .guard(p2_is_computer)
            .action(issue_ticket),
        Transition::new(P1Pending, Resume, P1Thinking),
        Transition::new(P2Pending, Resume, P2Thinking),
    ];
    for from in TurnState::ALL {
        rows.push(Transition::new(from, Reset, P1Thinking).action(clear_board));
    }
    rows
}

pub struct TableGame {
    config: EngineConfig,
    machine: StateMachine<TurnState, TurnEvent, TableContext>,
    ctx: TableContext,
    policy: Box<dyn MovePolicy>,
    listeners: Listeners<Snapshot>,
    last_error: Option<String>,
}

impl TableGame {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_policy(config, config.policy())
    }

    pub fn with_policy(config: EngineConfig, policy: Box<dyn MovePolicy>) -> Self {
        Self {
            config,
            machine: StateMachine::new(TurnState::Setup, transitions()),
            ctx: TableContext::default(),
            policy,
            listeners: Listeners::new(),
            last_error: None,
        }
    }

    pub fn state(&self) -> TurnState {
        self.machine.state()
    }

    pub fn context(&self) -> &TableContext {
        &self.ctx
    }

    fn fire(&mut self, event: TurnEvent) -> Result<TurnState, GameError> {
        Ok(self.machine.dispatch(event, &mut self.ctx)?)
    }

    fn configure(&mut self, change: impl FnOnce(&mut TableContext)) -> Result<(), GameError> {
        self.fire(TurnEvent::Configure)?;
        change(&mut self.ctx);
        Ok(())
    }

    fn try_move(
        &mut self,
        player: PlayerId,
        index: usize,
        symbol: Option<Symbol>,
    ) -> Result<(), GameError> {
        let event = done_event(player);
        self.machine.check(event, &self.ctx)?;

        let acting = self.ctx.players[player.index()];
        let (_, outcome) = apply_move(&mut self.ctx.board, self.ctx.mode, &acting, index, symbol)?;
        self.ctx.outcome = outcome;
        self.fire(event)?;
        if let Some(outcome) = outcome {
            info!(outcome = %outcome, "game finished");
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<(), GameError> {
        loop {
            let player = match self.machine.state() {
                TurnState::P1Thinking => PlayerId::One,
                TurnState::P2Thinking => PlayerId::Two,
                _ => return Ok(()),
            };
            if !self.ctx.players[player.index()].is_computer() {
                return Ok(());
            }
            if self.config.defers_ai() {
                self.fire(TurnEvent::Schedule)?;
                debug!(player = %player, ticket = self.ctx.last_ticket, "computer move scheduled");
                return Ok(());
            }
            self.run_ai(player)?;
        }
    }

    fn run_ai(&mut self, player: PlayerId) -> Result<(), GameError> {
        let acting = self.ctx.players[player.index()];
        let chosen = self
            .policy
            .choose_move(&self.ctx.board, self.ctx.mode, acting.symbol)?;
        match self.config.ai_replay {
            AiReplay::Validated => self.try_move(player, chosen.index, chosen.symbol),
            AiReplay::Direct => {
                let (_, outcome) =
                    apply_direct(&mut self.ctx.board, &acting, chosen.index, chosen.symbol)?;
                self.ctx.outcome = outcome;
                self.fire(done_event(player))?;
                Ok(())
            }
        }
    }

    /// Run `command`, rolling the machine and its context back if it fails
    fn atomically<T>(
        &mut self,
        command: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let state = self.machine.state();
        let ctx = self.ctx.clone();
        let result = command(self);
        if result.is_err() {
            self.machine.force(state);
            self.ctx = ctx;
        }
        self.complete(result)
    }

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

impl GameAdapter for TableGame {
    fn name(&self) -> &'static str {
        NAME
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), GameError> {
        let result = self.configure(|ctx| {
            ctx.mode = mode;
            for player in ctx.players.iter_mut() {
                *player = Player::new(player.id, player.kind, mode);
            }
        });
        self.complete(result)
    }

    fn set_player_kind(&mut self, player: PlayerId, kind: PlayerKind) -> Result<(), GameError> {
        let result = self.configure(|ctx| ctx.players[player.index()].kind = kind);
        self.complete(result)
    }

    fn start(&mut self) -> Result<(), GameError> {
        self.atomically(|game| {
            game.fire(TurnEvent::Begin)?;
            info!(mode = %game.ctx.mode, "game started");
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
            if game.ctx.players[player.index()].is_computer() {
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
        match self.machine.state().player() {
            Some(player) => self.play_as(player, index, symbol),
            None => self.complete(Err(GameError::no_game())),
        }
    }

    fn reset(&mut self) -> Result<(), GameError> {
        self.atomically(|game| {
            game.fire(TurnEvent::Reset)?;
            game.advance()
        })
    }

    fn reset_to_setup(&mut self) {
        self.machine.restart();
        restore_defaults(&mut self.ctx);
        self.last_error = None;
        info!("returned to setup");
        self.notify();
    }

    fn pending_ai(&self) -> Option<PendingAi> {
        match self.machine.state() {
            TurnState::P1Pending | TurnState::P2Pending => {
                self.machine.state().player().map(|player| PendingAi {
                    ticket: self.ctx.last_ticket,
                    player,
                    delay: self.config.think_delay,
                })
            }
            _ => None,
        }
    }

    fn resolve_ai(&mut self, ticket: u64) -> Result<bool, GameError> {
        let player = match self.pending_ai() {
            Some(pending) if pending.ticket == ticket => pending.player,
            _ => {
                debug!(ticket, "stale computer move ignored");
                return Ok(false);
            }
        };

        self.atomically(|game| {
            game.fire(TurnEvent::Resume)?;
            game.run_ai(player)?;
            game.advance()?;
            Ok(true)
        })
    }

    fn snapshot(&self) -> Snapshot {
        let state = self.machine.state();
        let status = match (state, self.ctx.outcome) {
            (TurnState::Setup, _) => Status::AwaitingSetup,
            (TurnState::Finished, Some(outcome)) => Status::Terminal(outcome),
            _ => Status::InProgress,
        };
        Snapshot {
            board: self.ctx.board,
            mode: self.ctx.mode,
            players: self.ctx.players,
            status,
            current: state.player(),
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
