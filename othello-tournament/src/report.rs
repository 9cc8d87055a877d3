//! Tournament results: per-game entries, per-agent records, standings

use std::cmp::Ordering;

use othello_core::GameRecord;
use serde::{Deserialize, Serialize};

use crate::rating::RatingChange;
use crate::schedule::{AgentHandle, Fixture};
use crate::stats::{AgentStats, HeadToHead};

/// One applied game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairingResult {
    pub fixture: Fixture,
    pub record: GameRecord,
    /// None for draws
    pub rating_change: Option<RatingChange>,
}

/// Final standing of one registered agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub handle: AgentHandle,
    pub name: String,
    pub rating: f64,
    pub stats: AgentStats,
    pub win_rate: f64,
    pub avg_pieces: f64,
    pub avg_moves: f64,
    pub corner_rate: f64,
}

impl AgentRecord {
    pub(crate) fn new(handle: AgentHandle, name: String, rating: f64, stats: AgentStats) -> Self {
        Self {
            handle,
            name,
            rating,
            win_rate: stats.win_rate(),
            avg_pieces: stats.avg_pieces(),
            avg_moves: stats.avg_moves(),
            corner_rate: stats.corner_rate(),
            stats,
        }
    }

    /// Wins + 0.5 * draws
    pub fn score(&self) -> f64 {
        self.stats.wins as f64 + 0.5 * self.stats.draws as f64
    }
}

/// Outcome of a tournament run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentReport {
    /// One entry per registered agent, in registration order
    pub agents: Vec<AgentRecord>,
    /// Games in the order they were applied
    pub results: Vec<PairingResult>,
    /// Ordered pairing summaries, sorted by (side A, side B)
    pub head_to_head: Vec<HeadToHead>,
    pub games_scheduled: usize,
    /// Run stopped before every fixture was played
    pub cancelled: bool,
}

impl TournamentReport {
    pub fn games_played(&self) -> usize {
        self.results.len()
    }

    /// Agents by rating, then win rate, then registration order
    pub fn leaderboard(&self) -> Vec<&AgentRecord> {
        let mut board: Vec<&AgentRecord> = self.agents.iter().collect();
        board.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.win_rate.partial_cmp(&a.win_rate).unwrap_or(Ordering::Equal))
                .then_with(|| a.handle.cmp(&b.handle))
        });
        board
    }

    /// Top of the leaderboard
    pub fn winner(&self) -> Option<&AgentRecord> {
        self.leaderboard().into_iter().next()
    }

    pub fn record_for(&self, handle: AgentHandle) -> Option<&AgentRecord> {
        self.agents.iter().find(|r| r.handle == handle)
    }

    pub fn head_to_head(&self, side_a: AgentHandle, side_b: AgentHandle) -> Option<&HeadToHead> {
        self.head_to_head
            .iter()
            .find(|h| h.side_a == side_a && h.side_b == side_b)
    }

    /// Sum of all ratings
    pub fn rating_total(&self) -> f64 {
        self.agents.iter().map(|r| r.rating).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, name: &str, rating: f64, wins: usize, games: usize) -> AgentRecord {
        let stats = AgentStats {
            games,
            wins,
            losses: games - wins,
            ..Default::default()
        };
        AgentRecord::new(AgentHandle(index), name.to_string(), rating, stats)
    }

    fn report(agents: Vec<AgentRecord>) -> TournamentReport {
        TournamentReport {
            agents,
            results: Vec::new(),
            head_to_head: Vec::new(),
            games_scheduled: 0,
            cancelled: false,
        }
    }

    #[test]
    fn test_leaderboard_sorts_by_rating() {
        let r = report(vec![
            record(0, "low", 1480.0, 1, 4),
            record(1, "high", 1530.0, 3, 4),
            record(2, "mid", 1490.0, 0, 4),
        ]);
        let names: Vec<&str> = r.leaderboard().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        assert_eq!(r.winner().map(|a| a.name.as_str()), Some("high"));
    }

    #[test]
    fn test_leaderboard_breaks_ties_by_win_rate() {
        let r = report(vec![
            record(0, "fewer", 1500.0, 1, 4),
            record(1, "more", 1500.0, 2, 4),
        ]);
        assert_eq!(r.leaderboard()[0].name, "more");
    }

    #[test]
    fn test_record_lookup() {
        let r = report(vec![record(0, "x", 1500.0, 2, 4)]);
        assert_eq!(r.record_for(AgentHandle(0)).map(|a| a.win_rate), Some(0.5));
        assert!(r.record_for(AgentHandle(3)).is_none());
        assert_eq!(r.record_for(AgentHandle(0)).map(|a| a.score()), Some(2.0));
    }

    #[test]
    fn test_empty_report_has_no_winner() {
        assert!(report(Vec::new()).winner().is_none());
    }
}
