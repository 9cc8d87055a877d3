//! Battle command - series between two agents, alternating sides
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_series(), report_results()
//! - Level 3: series_fixtures(), tally()
//! - Level 4: formatting utilities

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use othello_core::{AgentKind, CancelToken, GameResult};
use othello_tournament::{AgentHandle, Fixture, PairingResult, ResultOrdering, Tournament, TournamentReport};

use crate::tournament_cmd::{agent_names, progress_bar, ConfigArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BattleArgs {
    /// First agent (side A in odd-numbered games)
    #[arg(long, default_value = "greedy")]
    pub first: AgentKind,

    /// Second agent
    #[arg(long, default_value = "random")]
    pub second: AgentKind,

    /// Number of games to play (sides alternate every game)
    #[arg(long, default_value = "10")]
    pub games: usize,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Series score from the first agent's perspective
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeriesScore {
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    timestamp: DateTime<Utc>,
    first: &'a str,
    second: &'a str,
    score: &'a SeriesScore,
    report: &'a TournamentReport,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run battle command
///
/// 1. Register both agents
/// 2. Play the series
/// 3. Report results
pub fn run(args: BattleArgs, seed: Option<u64>) -> Result<()> {
    if args.games == 0 {
        bail!("--games must be at least 1");
    }

    // Fixture ordering keeps the per-game listing in play order
    let config = args.config.resolve(seed)?.with_ordering(ResultOrdering::Fixture);
    let names = agent_names(&[args.first, args.second]);

    let mut tournament = Tournament::new(config)?;
    let first = tournament.register_kind(names[0].clone(), args.first)?;
    let second = tournament.register_kind(names[1].clone(), args.second)?;

    tracing::info!("Starting battle: {} vs {} ({} games)", names[0], names[1], args.games);

    let report = play_series(&tournament, first, second, args.games)?;
    let score = tally(&report.results, first);

    report_results(&report, &score, &names, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_series(
    tournament: &Tournament,
    first: AgentHandle,
    second: AgentHandle,
    games: usize,
) -> Result<TournamentReport> {
    let fixtures = series_fixtures(first, second, games);
    let pb = progress_bar(fixtures.len() as u64);

    let report = tournament
        .run_fixtures(&fixtures, &CancelToken::new(), |result| {
            pb.inc(1);
            tracing::debug!(
                "Game {}: {:?} ({}-{})",
                result.fixture.index + 1,
                result.record.result,
                result.record.side_a.pieces,
                result.record.side_b.pieces
            );
        })
        .context("Battle failed")?;
    pb.finish_and_clear();

    Ok(report)
}

fn report_results(report: &TournamentReport, score: &SeriesScore, names: &[String], json: bool) -> Result<()> {
    if json {
        let output = JsonOutput {
            timestamp: Utc::now(),
            first: &names[0],
            second: &names[1],
            score,
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_results(report, score, names);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// `games` fixtures, `first` on side A in even-indexed games
pub fn series_fixtures(first: AgentHandle, second: AgentHandle, games: usize) -> Vec<Fixture> {
    (0..games)
        .map(|index| {
            let (side_a, side_b) = if index % 2 == 0 { (first, second) } else { (second, first) };
            Fixture { index, side_a, side_b }
        })
        .collect()
}

/// Count wins from `first`'s perspective
pub fn tally(results: &[PairingResult], first: AgentHandle) -> SeriesScore {
    let mut score = SeriesScore::default();
    for result in results {
        let winner = match result.record.result {
            GameResult::SideAWins => result.fixture.side_a,
            GameResult::SideBWins => result.fixture.side_b,
            GameResult::Draw => {
                score.draws += 1;
                continue;
            }
        };
        if winner == first {
            score.first_wins += 1;
        } else {
            score.second_wins += 1;
        }
    }
    score
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_text_results(report: &TournamentReport, score: &SeriesScore, names: &[String]) {
    let total = report.games_played();

    println!("\n=== Battle Results ===");
    println!(
        "{} {} - {} {} ({} draws, {} games)",
        names[0], score.first_wins, score.second_wins, names[1], score.draws, total
    );

    println!("\nGame details:");
    for result in &report.results {
        // First agent registered first, so handle index doubles as name index
        let a = &names[result.fixture.side_a.index()];
        let b = &names[result.fixture.side_b.index()];
        println!(
            "  Game {}: {} (A) {} - {} {} (B)",
            result.fixture.index + 1,
            a,
            result.record.side_a.pieces,
            result.record.side_b.pieces,
            b
        );
    }

    for agent in &report.agents {
        println!("{}: rating {:.1}, {} violations", agent.name, agent.rating, agent.stats.violations);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use othello_tournament::TournamentConfig;

    fn battle(games: usize) -> (TournamentReport, AgentHandle) {
        let config = TournamentConfig::default()
            .with_workers(1)
            .with_ordering(ResultOrdering::Fixture);
        let mut t = Tournament::new(config).unwrap();
        let first = t.register_kind("greedy-1", AgentKind::Greedy).unwrap();
        let second = t.register_kind("random-2", AgentKind::Random).unwrap();
        let fixtures = series_fixtures(first, second, games);
        let report = t.run_fixtures(&fixtures, &CancelToken::new(), |_| {}).unwrap();
        (report, first)
    }

    #[test]
    fn test_series_alternates_sides() {
        let (a, b) = (AgentHandle::from_index(0), AgentHandle::from_index(1));
        let fixtures = series_fixtures(a, b, 4);
        assert_eq!(fixtures.len(), 4);
        assert_eq!((fixtures[0].side_a, fixtures[0].side_b), (a, b));
        assert_eq!((fixtures[1].side_a, fixtures[1].side_b), (b, a));
        assert_eq!((fixtures[2].side_a, fixtures[2].side_b), (a, b));
    }

    #[test]
    fn test_tally_counts_every_game() {
        let (report, first) = battle(6);
        let score = tally(&report.results, first);
        assert_eq!(score.first_wins + score.second_wins + score.draws, 6);

        let first_record = report.record_for(first).unwrap();
        assert_eq!(first_record.stats.wins, score.first_wins);
        assert_eq!(first_record.stats.draws, score.draws);
    }

    #[test]
    fn test_tally_empty() {
        assert_eq!(tally(&[], AgentHandle::from_index(0)), SeriesScore::default());
    }
}
