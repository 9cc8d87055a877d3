//! Rating tracking with an expected-score model

use othello_core::GameResult;
use serde::{Deserialize, Serialize};

use crate::config::RatingConfig;
use crate::schedule::AgentHandle;

/// Rating movement caused by one decisive game
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub winner: AgentHandle,
    pub loser: AgentHandle,
    /// Added to the winner's rating (positive)
    pub winner_delta: f64,
    /// Added to the loser's rating (negative)
    pub loser_delta: f64,
    /// Winner was rated lower before the game
    pub upset: bool,
}

/// One rating per registered agent
#[derive(Clone, Debug)]
pub struct RatingTracker {
    config: RatingConfig,
    ratings: Vec<f64>,
}

impl RatingTracker {
    /// Every agent starts at `config.initial`
    pub fn new(config: RatingConfig, agents: usize) -> Self {
        let ratings = vec![config.initial; agents];
        Self { config, ratings }
    }

    pub fn rating(&self, handle: AgentHandle) -> f64 {
        self.ratings[handle.index()]
    }

    pub fn ratings(&self) -> &[f64] {
        &self.ratings
    }

    /// Sum over all agents; constant under updates
    pub fn total(&self) -> f64 {
        self.ratings.iter().sum()
    }

    /// Expected score of `a` against `b`
    pub fn expected_score(&self, a: AgentHandle, b: AgentHandle) -> f64 {
        expected_score(self.rating(a), self.rating(b))
    }

    /// Apply a finished game. Draws leave ratings untouched.
    pub fn record_game(
        &mut self,
        side_a: AgentHandle,
        side_b: AgentHandle,
        result: GameResult,
    ) -> Option<RatingChange> {
        match result {
            GameResult::SideAWins => Some(self.record_win(side_a, side_b)),
            GameResult::SideBWins => Some(self.record_win(side_b, side_a)),
            GameResult::Draw => None,
        }
    }

    /// Zero-sum update after `winner` beat `loser`
    pub fn record_win(&mut self, winner: AgentHandle, loser: AgentHandle) -> RatingChange {
        let winner_rating = self.rating(winner);
        let loser_rating = self.rating(loser);

        let expected_winner = expected_score(winner_rating, loser_rating);
        let expected_loser = 1.0 - expected_winner;

        let upset = winner_rating < loser_rating;
        let factor = if winner_rating > loser_rating {
            self.config.expected_factor
        } else if upset {
            self.config.upset_factor
        } else {
            1.0
        };

        let scale = self.config.k_factor * factor;
        let winner_delta = scale * (1.0 - expected_winner);
        let loser_delta = scale * (0.0 - expected_loser);

        self.ratings[winner.index()] += winner_delta;
        self.ratings[loser.index()] += loser_delta;

        RatingChange {
            winner,
            loser,
            winner_delta,
            loser_delta,
            upset,
        }
    }
}

/// `1 / (1 + 10^((opponent - own) / 400))`
pub fn expected_score(own: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - own) / 400.0))
}
