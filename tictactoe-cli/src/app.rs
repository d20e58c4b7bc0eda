use anyhow::{anyhow, Result};
use games_tictactoe::{create_variant, GameAdapter, GameError, PlayerId, Snapshot, Status};
use std::io::Write;
use std::pin::Pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::time::Sleep;
use tracing::{debug, info, warn};

use crate::command::{Command, HELP};
use crate::config::GameSetup;

/// The one outstanding computer-move timer
struct Timer {
    ticket: u64,
    sleep: Pin<Box<Sleep>>,
}

enum Event {
    Line(std::io::Result<Option<String>>),
    Timer(u64),
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive game reading commands from `input` and drawing to `out`
pub struct Session<R, W> {
    game: Box<dyn GameAdapter>,
    input: Lines<R>,
    input_open: bool,
    out: W,
    timer: Option<Timer>,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(setup: &GameSetup, input: R, out: W) -> Result<Self> {
        let mut game = create_variant(&setup.variant, setup.engine)
            .ok_or_else(|| anyhow!("unknown variant '{}'", setup.variant))?;
        game.set_mode(setup.mode)?;
        game.set_player_kind(PlayerId::One, setup.player1)?;
        game.set_player_kind(PlayerId::Two, setup.player2)?;
        info!(variant = game.name(), mode = %setup.mode, "session created");

        Ok(Self {
            game,
            input: input.lines(),
            input_open: true,
            out,
            timer: None,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until `quit`, end of input with nothing pending, or Ctrl-C
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{}", HELP)?;
        self.render()?;

        loop {
            self.sync_timer();
            if !self.input_open && self.timer.is_none() {
                break;
            }

            let event = tokio::select! {
                line = self.input.next_line(), if self.input_open => Event::Line(line),
                ticket = expire(&mut self.timer) => Event::Timer(ticket),
                _ = tokio::signal::ctrl_c() => Event::Interrupt,
            };

            match event {
                Event::Line(line) => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        if self.handle(&line)? == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        debug!("input closed");
                        self.input_open = false;
                    }
                },
                Event::Timer(ticket) => {
                    self.timer = None;
                    match self.game.resolve_ai(ticket) {
                        Ok(true) => self.render()?,
                        Ok(false) => debug!(ticket, "timer for a stale move"),
                        Err(err) => self.report(&err)?,
                    }
                }
                Event::Interrupt => {
                    info!("interrupted");
                    break;
                }
            }
        }

        self.out.flush()?;
        Ok(())
    }

    /// Keep exactly one timer for the engine's pending move, if any
    fn sync_timer(&mut self) {
        match self.game.pending_ai() {
            Some(pending) => {
                if self.timer.as_ref().map(|t| t.ticket) != Some(pending.ticket) {
                    debug!(ticket = pending.ticket, delay = ?pending.delay, "timer armed");
                    self.timer = Some(Timer {
                        ticket: pending.ticket,
                        sleep: Box::pin(tokio::time::sleep(pending.delay)),
                    });
                }
            }
            None => self.timer = None,
        }
    }

    fn handle(&mut self, line: &str) -> Result<Flow> {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(self.out, "{}", err)?;
                return Ok(Flow::Continue);
            }
        };

        let result = match command {
            Command::Mode(mode) => self.game.set_mode(mode),
            Command::Player(player, kind) => self.game.set_player_kind(player, kind),
            Command::Start => self.game.start(),
            Command::Play(index, symbol) => self.game.play(index, symbol),
            Command::Reset => self.game.reset(),
            Command::Setup => {
                self.game.reset_to_setup();
                Ok(())
            }
            Command::Show => Ok(()),
            Command::Help => {
                writeln!(self.out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        match result {
            Ok(()) => self.render()?,
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn report(&mut self, err: &GameError) -> Result<()> {
        warn!(error = %err, "command failed");
        writeln!(self.out, "Error: {}", err)?;
        self.game.clear_error();
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let snapshot = self.game.snapshot();
        writeln!(self.out)?;
        if snapshot.status == Status::AwaitingSetup {
            writeln!(
                self.out,
                "Mode: {} ({})",
                snapshot.mode.display_name(),
                snapshot.mode.description()
            )?;
            for player in &snapshot.players {
                writeln!(
                    self.out,
                    "{}: {}",
                    snapshot.mode.player_label(player.id),
                    player.kind
                )?;
            }
        } else {
            writeln!(self.out, "{}", snapshot.board)?;
        }

        let symbols = snapshot.available_symbols();
        if symbols.len() > 1 && !snapshot.is_ai_turn() {
            writeln!(self.out, "{} (play <cell> X|O)", snapshot.status_text())?;
        } else {
            writeln!(self.out, "{}", snapshot.status_text())?;
        }
        Ok(())
    }
}

/// Wait for the timer, or forever when there is none
async fn expire(timer: &mut Option<Timer>) -> u64 {
    match timer {
        Some(timer) => {
            timer.sleep.as_mut().await;
            timer.ticket
        }
        None => std::future::pending().await,
    }
}
