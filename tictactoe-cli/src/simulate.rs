use anyhow::{anyhow, Result};
use games_tictactoe::{create_variant, EngineConfig, GameAdapter, Outcome, PlayerId, PlayerKind, Symbol};
use std::fmt;
use tracing::{debug, info};

use crate::config::GameSetup;

/// Results of a batch of computer-vs-computer games
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Winner(Symbol::X) => self.x_wins += 1,
            Outcome::Winner(Symbol::O) => self.o_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: X wins {}, O wins {}, draws {}",
            self.games(),
            self.x_wins,
            self.o_wins,
            self.draws
        )
    }
}

/// Play `games` games with both seats computer-controlled and no delay
///
/// A configured seed is offset by the game number so runs are reproducible
/// without every game being identical.
pub fn simulate(setup: &GameSetup, games: u32) -> Result<Tally> {
    let mut tally = Tally::default();

    for game_number in 0..games {
        let config = EngineConfig {
            think_delay: std::time::Duration::ZERO,
            seed: setup.engine.seed.map(|seed| seed.wrapping_add(u64::from(game_number))),
            ..setup.engine
        };
        let mut game = create_variant(&setup.variant, config)
            .ok_or_else(|| anyhow!("unknown variant '{}'", setup.variant))?;

        let outcome = play_out(game.as_mut(), setup)?;
        debug!(game = game_number + 1, outcome = %outcome, "game finished");
        tally.record(outcome);

        if (game_number + 1) % 10 == 0 {
            info!("Completed {} games", game_number + 1);
        }
    }

    Ok(tally)
}

fn play_out(game: &mut dyn GameAdapter, setup: &GameSetup) -> Result<Outcome> {
    game.set_mode(setup.mode)?;
    game.set_player_kind(PlayerId::One, PlayerKind::Computer)?;
    game.set_player_kind(PlayerId::Two, PlayerKind::Computer)?;
    game.start()?;

    game.snapshot()
        .outcome()
        .ok_or_else(|| anyhow!("{} engine stopped before the game ended", game.name()))
}
