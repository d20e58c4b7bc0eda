use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

mod app;
mod command;
mod config;
mod simulate;

use crate::app::Session;
use crate::config::{Command, Config};
use crate::simulate::simulate;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Logs go to stderr so they stay out of the board
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .init();

    let setup = config.resolve()?;
    info!(
        "Variant: {}, mode: {}, players: {} / {}",
        setup.variant, setup.mode, setup.player1, setup.player2
    );

    let result = match config.command() {
        Command::Play => {
            let input = BufReader::new(tokio::io::stdin());
            let mut session = Session::new(&setup, input, std::io::stdout())?;
            session.run().await
        }
        Command::Simulate { games } => simulate(&setup, games).map(|tally| {
            println!("{}", tally);
        }),
    };

    if let Err(e) = &result {
        error!("tictactoe failed: {}", e);
    }
    result
}
