//! Othello Tournament - Rated double round-robin play between agents
//!
//! This crate provides tournament infrastructure:
//! - Agent registration and fixture scheduling
//! - Concurrent fixture execution with a configurable worker count
//! - Expected-score ratings and per-agent statistics
//! - Reports with leaderboard and head-to-head summaries
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Tournament::run (orchestration)
//! - Level 2: fixture checks, dispatch (phases)
//! - Level 3: run_fixture, rating and statistics updates (steps)
//! - Level 4: utilities, configuration

mod config;
mod error;
mod game_runner;
mod rating;
mod report;
mod schedule;
mod stats;
mod tournament;

pub use config::{RatingConfig, ResultOrdering, TournamentConfig};
pub use error::TournamentError;
pub use game_runner::{agent_seed, fixture_seed};
pub use rating::{expected_score, RatingChange, RatingTracker};
pub use report::{AgentRecord, PairingResult, TournamentReport};
pub use schedule::{double_round_robin, AgentHandle, Fixture};
pub use stats::{AgentStats, HeadToHead, StatisticsAggregator};
pub use tournament::Tournament;
