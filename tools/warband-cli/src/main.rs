//! Warband CLI - Headless campaign runner
//!
//! # Commands
//!
//! - `warband play` - Play a campaign file with scripted gameplay
//! - `warband replay` - Play back a replay save
//! - `warband inspect` - Print a save file as JSON
//!
//! # Usage
//!
//! ```bash
//! # Play a campaign locally, saves go to the preferences' save directory
//! warband play heir.toml --script heir-script.toml
//!
//! # Host a networked campaign
//! warband play heir.toml --script heir-script.toml --mode host --network
//!
//! # Watch the replay of a finished scenario
//! warband replay "saves/HttT-The Elves Besieged replay.wbsave"
//! ```
//!
//! The exit code is 0 when the campaign ends in victory, 2 for any other
//! outcome and 1 on errors.

mod inspect;
mod play;
mod replay;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use warband_core::Outcome;

/// Warband CLI - Headless campaign runner
#[derive(Parser)]
#[command(name = "warband")]
#[command(about = "Headless campaign runner for the Warband engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a campaign file with scripted gameplay
    Play(play::PlayArgs),

    /// Play back a replay save
    Replay(replay::ReplayArgs),

    /// Print a save file as JSON
    Inspect(inspect::InspectArgs),
}

fn exit_code(outcome: Outcome) -> ExitCode {
    if outcome == Outcome::Victory {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play(args) => play::execute(args).map(exit_code),
        Commands::Replay(args) => replay::execute(args).map(exit_code),
        Commands::Inspect(args) => inspect::execute(args).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
