//! Othello CLI - Command-line interface
//!
//! Commands:
//! - tournament: Rated double round-robin between built-in agents
//! - battle: Head-to-head series between two agents, alternating sides

mod battle_cmd;
mod tournament_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "othello")]
#[command(about = "Othello agent arena")]
struct Cli {
    /// Base random seed (fallback moves and built-in agents)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a rated double round-robin
    Tournament(tournament_cmd::TournamentArgs),
    /// Play a series between two agents
    Battle(battle_cmd::BattleArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tournament(args) => tournament_cmd::run(args, cli.seed),
        Commands::Battle(args) => battle_cmd::run(args, cli.seed),
    }
}
