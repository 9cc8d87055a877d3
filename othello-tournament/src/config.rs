//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

/// Order in which finished games are applied to ratings and statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrdering {
    /// Apply as games finish (live standings, not reproducible when
    /// more than one worker runs)
    #[default]
    Completion,
    /// Buffer and apply in fixture order. Standings are reproducible across
    /// worker counts for agents registered by kind or whose answers depend
    /// only on the position.
    Fixture,
}

/// Rating update parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Starting rating for every agent
    pub initial: f64,
    /// K-factor (maximum swing before scaling)
    pub k_factor: f64,
    /// Scale applied when the higher-rated agent wins
    pub expected_factor: f64,
    /// Scale applied when the lower-rated agent wins
    pub upset_factor: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial: 1500.0,
            k_factor: 32.0,
            expected_factor: 0.8,
            upset_factor: 1.2,
        }
    }
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Concurrent games (0 = one per CPU)
    pub workers: usize,
    /// How finished games are applied
    pub ordering: ResultOrdering,
    /// Base seed for the fallback move policy
    pub seed: u64,
    /// Rating parameters
    pub rating: RatingConfig,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            ordering: ResultOrdering::Completion,
            seed: 42,
            rating: RatingConfig::default(),
        }
    }
}

impl TournamentConfig {
    /// Load from JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, TournamentError> {
        let content = std::fs::read_to_string(path)?;
        let config: TournamentConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set result ordering
    pub fn with_ordering(mut self, ordering: ResultOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set fallback seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set K-factor
    pub fn with_k_factor(mut self, k_factor: f64) -> Self {
        self.rating.k_factor = k_factor;
        self
    }

    /// Reject parameters the rating update cannot work with
    pub fn validate(&self) -> Result<(), TournamentError> {
        let r = &self.rating;
        if !r.initial.is_finite() {
            return Err(TournamentError::InvalidConfig(format!(
                "initial rating must be finite, got {}",
                r.initial
            )));
        }
        for (name, value) in [
            ("k_factor", r.k_factor),
            ("expected_factor", r.expected_factor),
            ("upset_factor", r.upset_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TournamentError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
