//! Per-agent and head-to-head counters
//!
//! Level 3 - Steps

use othello_core::{GameRecord, GameResult, Side, SideSummary};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::schedule::AgentHandle;

/// Running totals for one agent
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Own pieces on the final board, summed over games
    pub pieces: usize,
    /// Placements made, summed over games
    pub moves: usize,
    /// Corners held on the final board, summed over games
    pub corners: usize,
    pub skips: usize,
    pub violations: usize,
}

impl AgentStats {
    pub fn win_rate(&self) -> f64 {
        ratio(self.wins, self.games)
    }

    pub fn avg_pieces(&self) -> f64 {
        ratio(self.pieces, self.games)
    }

    pub fn avg_moves(&self) -> f64 {
        ratio(self.moves, self.games)
    }

    /// Fraction of the four corners held at game end
    pub fn corner_rate(&self) -> f64 {
        ratio(self.corners, 4 * self.games)
    }

    fn absorb(&mut self, summary: &SideSummary, won: bool, lost: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        } else if lost {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
        self.pieces += summary.pieces;
        self.moves += summary.moves;
        self.corners += summary.corners;
        self.skips += summary.skips;
        self.violations += summary.violations;
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Results of one ordered pairing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub side_a: AgentHandle,
    pub side_b: AgentHandle,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
}

impl HeadToHead {
    fn new(side_a: AgentHandle, side_b: AgentHandle) -> Self {
        Self {
            side_a,
            side_b,
            a_wins: 0,
            b_wins: 0,
            draws: 0,
        }
    }

    pub fn games(&self) -> usize {
        self.a_wins + self.b_wins + self.draws
    }
}

/// Counter store fed one game record at a time
#[derive(Clone, Debug)]
pub struct StatisticsAggregator {
    agents: Vec<AgentStats>,
    head_to_head: FxHashMap<(AgentHandle, AgentHandle), HeadToHead>,
}

impl StatisticsAggregator {
    pub fn new(agents: usize) -> Self {
        Self {
            agents: vec![AgentStats::default(); agents],
            head_to_head: FxHashMap::default(),
        }
    }

    /// Fold a finished game into both agents' totals and the pairing entry
    pub fn record(&mut self, side_a: AgentHandle, side_b: AgentHandle, record: &GameRecord) {
        let a_won = record.result == GameResult::SideAWins;
        let b_won = record.result == GameResult::SideBWins;

        self.agents[side_a.index()].absorb(record.summary(Side::A), a_won, b_won);
        self.agents[side_b.index()].absorb(record.summary(Side::B), b_won, a_won);

        let entry = self
            .head_to_head
            .entry((side_a, side_b))
            .or_insert_with(|| HeadToHead::new(side_a, side_b));
        match record.result {
            GameResult::SideAWins => entry.a_wins += 1,
            GameResult::SideBWins => entry.b_wins += 1,
            GameResult::Draw => entry.draws += 1,
        }
    }

    pub fn agent(&self, handle: AgentHandle) -> &AgentStats {
        &self.agents[handle.index()]
    }

    pub fn agents(&self) -> &[AgentStats] {
        &self.agents
    }

    /// Entry for `side_a` playing A against `side_b`
    pub fn head_to_head(&self, side_a: AgentHandle, side_b: AgentHandle) -> Option<&HeadToHead> {
        self.head_to_head.get(&(side_a, side_b))
    }

    /// All pairing entries, sorted by (side A, side B)
    pub fn head_to_head_entries(&self) -> Vec<HeadToHead> {
        let mut entries: Vec<HeadToHead> = self.head_to_head.values().copied().collect();
        entries.sort_by_key(|e| (e.side_a, e.side_b));
        entries
    }

    /// Games recorded so far
    pub fn games_recorded(&self) -> usize {
        self.head_to_head.values().map(HeadToHead::games).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use othello_core::{Board, CancelToken, GameController, RandomAgent};

    fn play(seed: u64) -> GameRecord {
        let mut a = RandomAgent::with_seed("a", seed);
        let mut b = RandomAgent::with_seed("b", seed + 1);
        GameController::new(seed)
            .run(&mut a, &mut b, &CancelToken::new())
            .unwrap()
            .unwrap()
    }

    fn fixed(result: GameResult, a_pieces: usize, b_pieces: usize) -> GameRecord {
        GameRecord {
            turns: Vec::new(),
            final_board: Board::new(),
            result,
            side_a: SideSummary {
                pieces: a_pieces,
                corners: 2,
                moves: 30,
                skips: 1,
                violations: 0,
                ..Default::default()
            },
            side_b: SideSummary {
                pieces: b_pieces,
                corners: 1,
                moves: 29,
                violations: 3,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_record_updates_both_agents() {
        let mut stats = StatisticsAggregator::new(2);
        let (a, b) = (AgentHandle(0), AgentHandle(1));

        stats.record(a, b, &fixed(GameResult::SideAWins, 40, 24));

        let sa = stats.agent(a);
        assert_eq!((sa.games, sa.wins, sa.losses, sa.draws), (1, 1, 0, 0));
        assert_eq!((sa.pieces, sa.moves, sa.corners, sa.skips), (40, 30, 2, 1));

        let sb = stats.agent(b);
        assert_eq!((sb.games, sb.wins, sb.losses, sb.draws), (1, 0, 1, 0));
        assert_eq!(sb.violations, 3);
    }

    #[test]
    fn test_head_to_head_is_ordered() {
        let mut stats = StatisticsAggregator::new(2);
        let (a, b) = (AgentHandle(0), AgentHandle(1));

        stats.record(a, b, &fixed(GameResult::SideAWins, 40, 24));
        stats.record(b, a, &fixed(GameResult::Draw, 32, 32));
        stats.record(b, a, &fixed(GameResult::SideBWins, 20, 44));

        let ab = stats.head_to_head(a, b).unwrap();
        assert_eq!((ab.a_wins, ab.b_wins, ab.draws), (1, 0, 0));

        let ba = stats.head_to_head(b, a).unwrap();
        assert_eq!((ba.a_wins, ba.b_wins, ba.draws), (0, 1, 1));

        assert_eq!(stats.games_recorded(), 3);
        assert_eq!(stats.agent(a).wins, 2);
        assert_eq!(stats.agent(a).draws, 1);

        let entries = stats.head_to_head_entries();
        assert_eq!(entries[0].side_a, a);
        assert_eq!(entries[1].side_a, b);
    }

    #[test]
    fn test_derived_rates() {
        let mut stats = StatisticsAggregator::new(2);
        let (a, b) = (AgentHandle(0), AgentHandle(1));
        stats.record(a, b, &fixed(GameResult::SideAWins, 40, 24));
        stats.record(b, a, &fixed(GameResult::SideAWins, 30, 34));

        let sa = stats.agent(a);
        assert_eq!(sa.win_rate(), 0.5);
        assert_eq!(sa.avg_pieces(), 32.0);
        // 2 corners as side A, 1 as side B, over 2 games
        assert_eq!(sa.corner_rate(), 3.0 / 8.0);
        assert_eq!(AgentStats::default().win_rate(), 0.0);
    }

    #[test]
    fn test_totals_match_played_games() {
        let mut stats = StatisticsAggregator::new(3);
        let mut placements = 0;
        for (i, (x, y)) in [(0, 1), (1, 2), (2, 0), (1, 0)].into_iter().enumerate() {
            let record = play(i as u64 * 10);
            placements += record.move_count();
            stats.record(AgentHandle(x), AgentHandle(y), &record);
        }

        let total_games: usize = stats.agents().iter().map(|s| s.games).sum();
        let total_moves: usize = stats.agents().iter().map(|s| s.moves).sum();
        assert_eq!(total_games, 8);
        assert_eq!(total_moves, placements);
        for s in stats.agents() {
            assert_eq!(s.wins + s.losses + s.draws, s.games);
        }
    }
}
