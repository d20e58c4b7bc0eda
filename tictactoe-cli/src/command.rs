use std::str::FromStr;

use anyhow::{anyhow, Error};
use games_tictactoe::{Mode, PlayerId, PlayerKind, Symbol};

pub const HELP: &str = "\
Commands:
  mode <standard|wild>          choose the mode (setup only)
  player <1|2> <human|computer> choose who plays a seat (setup only)
  start                         begin the game
  play <0-8> [X|O]              move; a bare number works too
  reset                         new game with the same settings
  setup                         back to setup with default settings
  show                          print the board again
  help                          this text
  quit                          leave";

/// One line of interactive input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Mode(Mode),
    Player(PlayerId, PlayerKind),
    Start,
    Play(usize, Option<Symbol>),
    Reset,
    Setup,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Err(anyhow!("empty command, type 'help' for a list"));
        };

        let command = match (head.to_ascii_lowercase().as_str(), args) {
            ("mode", [mode]) => Command::Mode(mode.parse()?),
            ("player", [player, kind]) => Command::Player(player.parse()?, kind.parse()?),
            ("start", []) => Command::Start,
            ("play", [index]) => Command::Play(parse_index(index)?, None),
            ("play", [index, symbol]) => Command::Play(parse_index(index)?, Some(symbol.parse()?)),
            (index, []) if index.parse::<usize>().is_ok() => Command::Play(parse_index(index)?, None),
            (index, [symbol]) if index.parse::<usize>().is_ok() => {
                Command::Play(parse_index(index)?, Some(symbol.parse()?))
            }
            ("reset" | "new", []) => Command::Reset,
            ("setup", []) => Command::Setup,
            ("show" | "board", []) => Command::Show,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit" | "q", []) => Command::Quit,
            _ => return Err(anyhow!("unrecognised command '{}', type 'help' for a list", line.trim())),
        };
        Ok(command)
    }
}

fn parse_index(text: &str) -> Result<usize, Error> {
    text.parse()
        .map_err(|_| anyhow!("'{}' is not a cell number (0-8)", text))
}
