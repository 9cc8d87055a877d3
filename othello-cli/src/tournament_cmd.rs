//! Tournament command - rated double round-robin between built-in agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_tournament(), play(), report_results()
//! - Level 3: agent_names(), ConfigArgs::resolve()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use othello_core::{AgentKind, CancelToken};
use othello_tournament::{ResultOrdering, Tournament, TournamentConfig, TournamentReport};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Result application order, as accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrderingArg {
    /// Apply games as they finish
    Completion,
    /// Apply games in fixture order (reproducible for built-in agents)
    Fixture,
}

impl From<OrderingArg> for ResultOrdering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Completion => ResultOrdering::Completion,
            OrderingArg::Fixture => ResultOrdering::Fixture,
        }
    }
}

/// Options shared by every command that plays rated games
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Concurrent games (0 = one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Order in which finished games are applied
    #[arg(long, value_enum)]
    pub ordering: Option<OrderingArg>,

    /// Rating K-factor
    #[arg(long)]
    pub k_factor: Option<f64>,
}

impl ConfigArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve(&self, seed: Option<u64>) -> Result<TournamentConfig> {
        let mut config = match &self.config {
            Some(path) => TournamentConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => TournamentConfig::default(),
        };

        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(ordering) = self.ordering {
            config = config.with_ordering(ordering.into());
        }
        if let Some(k) = self.k_factor {
            config = config.with_k_factor(k);
        }
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }

        config.validate().context("Invalid tournament configuration")?;
        Ok(config)
    }
}

#[derive(Args)]
pub struct TournamentArgs {
    /// Agent kinds to enter, comma separated (random, greedy, positional)
    #[arg(long, value_delimiter = ',', default_value = "random,greedy,positional")]
    pub agents: Vec<AgentKind>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// JSON document written with --json
#[derive(Serialize)]
struct JsonOutput<'a> {
    timestamp: DateTime<Utc>,
    config: &'a TournamentConfig,
    report: &'a TournamentReport,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// 1. Resolve configuration
/// 2. Register the agents
/// 3. Play every fixture
/// 4. Report results
pub fn run(args: TournamentArgs, seed: Option<u64>) -> Result<()> {
    let config = args.config.resolve(seed)?;
    let tournament = build_tournament(&args.agents, config)?;

    tracing::info!(
        "Starting tournament: {} agents, {} games",
        tournament.len(),
        tournament.fixtures().len()
    );

    let report = play(&tournament, !args.no_progress)?;

    report_results(&report, tournament.config(), args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Register one agent per requested kind
fn build_tournament(kinds: &[AgentKind], config: TournamentConfig) -> Result<Tournament> {
    if kinds.len() < 2 {
        bail!("A tournament needs at least 2 agents, got {}", kinds.len());
    }

    // Built-in agents are instantiated per fixture, seeded from the config
    let mut tournament = Tournament::new(config)?;
    for (kind, name) in kinds.iter().zip(agent_names(kinds)) {
        tournament.register_kind(name, *kind).context("Failed to register agent")?;
    }
    Ok(tournament)
}

/// Play the full schedule behind a progress bar
fn play(tournament: &Tournament, show_progress: bool) -> Result<TournamentReport> {
    let total = tournament.fixtures().len() as u64;
    let pb = if show_progress {
        progress_bar(total)
    } else {
        ProgressBar::hidden()
    };

    let cancel = CancelToken::new();
    let report = tournament
        .run_with(&cancel, |result| {
            pb.inc(1);
            pb.set_message(format!("fixture {}", result.fixture.index));
        })
        .context("Tournament failed")?;
    pb.finish_and_clear();

    Ok(report)
}

/// Report tournament results
fn report_results(report: &TournamentReport, config: &TournamentConfig, json: bool) -> Result<()> {
    if json {
        let output = JsonOutput {
            timestamp: Utc::now(),
            config,
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_results(report);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Display names: kind plus 1-based entry position, e.g. "greedy-2"
pub fn agent_names(kinds: &[AgentKind]) -> Vec<String> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("{}-{}", kind, i + 1))
        .collect()
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

pub(crate) fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("[{bar:40}] {pos}/{len} games ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn print_text_results(report: &TournamentReport) {
    println!("\n=== Tournament Results ===");
    println!("Games played: {}/{}", report.games_played(), report.games_scheduled);
    if report.cancelled {
        println!("(cancelled before completion)");
    }

    println!(
        "\n{:<4} {:<16} {:>8} {:>4} {:>4} {:>4} {:>7} {:>7} {:>8} {:>5}",
        "Rank", "Agent", "Rating", "W", "L", "D", "Win%", "Pieces", "Corners", "Viol"
    );
    for (rank, agent) in report.leaderboard().iter().enumerate() {
        println!(
            "{:<4} {:<16} {:>8.1} {:>4} {:>4} {:>4} {:>6.1}% {:>7.1} {:>7.1}% {:>5}",
            rank + 1,
            agent.name,
            agent.rating,
            agent.stats.wins,
            agent.stats.losses,
            agent.stats.draws,
            agent.win_rate * 100.0,
            agent.avg_pieces,
            agent.corner_rate * 100.0,
            agent.stats.violations,
        );
    }

    if !report.head_to_head.is_empty() {
        println!("\nHead-to-head (first name plays side A):");
        for h in &report.head_to_head {
            println!(
                "  {} vs {}: {}-{}-{}",
                name_of(report, h.side_a.index()),
                name_of(report, h.side_b.index()),
                h.a_wins,
                h.b_wins,
                h.draws
            );
        }
    }
}

fn name_of(report: &TournamentReport, index: usize) -> &str {
    report
        .agents
        .get(index)
        .map(|a| a.name.as_str())
        .unwrap_or("?")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_names_are_unique() {
        let names = agent_names(&[AgentKind::Greedy, AgentKind::Greedy, AgentKind::Random]);
        assert_eq!(names, vec!["greedy-1", "greedy-2", "random-3"]);
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let args = ConfigArgs {
            workers: Some(3),
            ordering: Some(OrderingArg::Fixture),
            k_factor: Some(20.0),
            ..Default::default()
        };
        let config = args.resolve(Some(9)).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.ordering, ResultOrdering::Fixture);
        assert_eq!(config.rating.k_factor, 20.0);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_resolve_rejects_bad_k_factor() {
        let args = ConfigArgs {
            k_factor: Some(0.0),
            ..Default::default()
        };
        assert!(args.resolve(None).is_err());
    }

    #[test]
    fn test_build_tournament_needs_two_agents() {
        assert!(build_tournament(&[AgentKind::Random], TournamentConfig::default()).is_err());

        let t = build_tournament(&[AgentKind::Random, AgentKind::Random], TournamentConfig::default()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.fixtures().len(), 2);
    }

    #[test]
    fn test_play_without_progress() {
        let config = TournamentConfig::default().with_workers(1);
        let t = build_tournament(&[AgentKind::Greedy, AgentKind::Positional], config).unwrap();
        let report = play(&t, false).unwrap();
        assert_eq!(report.games_played(), 2);
        assert!(serde_json::to_string(&report).is_ok());
    }

    #[test]
    fn test_fixture_ordering_reproducible_with_random_agents() {
        let field = [AgentKind::Random, AgentKind::Random, AgentKind::Greedy, AgentKind::Positional];
        let run = |workers| {
            let config = TournamentConfig::default()
                .with_seed(42)
                .with_workers(workers)
                .with_ordering(ResultOrdering::Fixture);
            play(&build_tournament(&field, config).unwrap(), false).unwrap()
        };

        let sequential = run(1);
        for _ in 0..3 {
            let parallel = run(4);
            assert_eq!(parallel.games_played(), 12);
            for (s, p) in sequential.agents.iter().zip(&parallel.agents) {
                assert_eq!(s.rating, p.rating);
                assert_eq!(s.stats, p.stats);
            }
        }
    }
}
