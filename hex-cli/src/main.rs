//! Hex CLI - Command-line interface
//!
//! Commands:
//! - play: Play a game in the terminal (humans and/or computer players)
//! - match: Play a series of computer-vs-computer games and report results

mod agents;
mod match_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hex")]
#[command(about = "Hex board game engine")]
struct Cli {
    /// Random seed for computer players
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game in the terminal
    Play(play_cmd::PlayArgs),
    /// Play computer players against each other
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
    }
}
