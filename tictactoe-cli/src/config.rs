use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use games_tictactoe::variants::{is_variant, list_variants, DEFAULT_VARIANT};
use games_tictactoe::{AiReplay, EngineConfig, Mode, PlayerKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_THINK_DELAY_MS: u64 = 500;
const MAX_THINK_DELAY_MS: u64 = 10_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "tictactoe")]
#[command(about = "Tic-tac-toe in the terminal")]
#[command(long_about = "Tic-tac-toe in the terminal.

Play against a friend or the computer in standard mode (X vs O) or wild
mode (either symbol on every turn), or let the computer play itself.")]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Engine architecture (fsm, table, store)
    #[arg(long, env = "TTT_VARIANT")]
    pub variant: Option<String>,

    /// Game mode (standard, wild)
    #[arg(long, env = "TTT_MODE")]
    pub mode: Option<Mode>,

    /// Who controls player 1 (human, computer)
    #[arg(long, env = "TTT_PLAYER1")]
    pub player1: Option<PlayerKind>,

    /// Who controls player 2 (human, computer)
    #[arg(long, env = "TTT_PLAYER2")]
    pub player2: Option<PlayerKind>,

    /// Computer thinking time in milliseconds
    #[arg(long, env = "TTT_THINK_DELAY_MS")]
    pub think_delay_ms: Option<u64>,

    /// How computer moves are applied (validated, direct)
    #[arg(long, env = "TTT_AI_REPLAY")]
    pub ai_replay: Option<AiReplay>,

    /// Seed for the computer's random choices
    #[arg(long, env = "TTT_SEED")]
    pub seed: Option<u64>,

    /// TOML file with default settings; flags take precedence
    #[arg(long, env = "TTT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TTT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive game on the terminal (default)
    Play,
    /// Computer against computer, reporting the results
    Simulate {
        /// Number of games to play
        #[arg(long, default_value = "100")]
        games: u32,
    },
}

/// Settings file contents
///
/// ```toml
/// variant = "table"
/// mode = "wild"
/// player2 = "computer"
/// think_delay_ms = 300
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub variant: Option<String>,
    pub mode: Option<Mode>,
    pub player1: Option<PlayerKind>,
    pub player2: Option<PlayerKind>,
    pub think_delay_ms: Option<u64>,
    pub ai_replay: Option<AiReplay>,
    pub seed: Option<u64>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Fully resolved session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub variant: String,
    pub mode: Mode,
    pub player1: PlayerKind,
    pub player2: PlayerKind,
    pub engine: EngineConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(anyhow!("log_level must be one of trace, debug, info, warn, error"));
        }

        if let Some(variant) = &self.variant {
            if !is_variant(variant) {
                return Err(anyhow!(
                    "unknown variant '{}', expected one of {}",
                    variant,
                    list_variants().join(", ")
                ));
            }
        }

        if let Some(delay) = self.think_delay_ms {
            if delay > MAX_THINK_DELAY_MS {
                return Err(anyhow!(
                    "think_delay_ms must be at most {}",
                    MAX_THINK_DELAY_MS
                ));
            }
        }

        if let Some(Command::Simulate { games: 0 }) = self.command {
            return Err(anyhow!("games must be greater than 0"));
        }

        Ok(())
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Play)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }

    /// Merge flags over the settings file over built-in defaults
    pub fn resolve(&self) -> Result<GameSetup> {
        let file = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        self.merge(file)
    }

    pub fn merge(&self, file: Settings) -> Result<GameSetup> {
        let variant = self
            .variant
            .clone()
            .or(file.variant)
            .unwrap_or_else(|| DEFAULT_VARIANT.to_string());
        if !is_variant(&variant) {
            return Err(anyhow!("unknown variant '{}'", variant));
        }

        let delay_ms = self
            .think_delay_ms
            .or(file.think_delay_ms)
            .unwrap_or(DEFAULT_THINK_DELAY_MS);
        if delay_ms > MAX_THINK_DELAY_MS {
            return Err(anyhow!("think_delay_ms must be at most {}", MAX_THINK_DELAY_MS));
        }

        Ok(GameSetup {
            variant,
            mode: self.mode.or(file.mode).unwrap_or_default(),
            player1: self.player1.or(file.player1).unwrap_or_default(),
            player2: self.player2.or(file.player2).unwrap_or_default(),
            engine: EngineConfig {
                think_delay: Duration::from_millis(delay_ms),
                ai_replay: self.ai_replay.or(file.ai_replay).unwrap_or_default(),
                seed: self.seed.or(file.seed),
            },
        })
    }
}
