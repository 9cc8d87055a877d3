//! Tournament error types

use othello_core::GameError;
use thiserror::Error;

use crate::schedule::AgentHandle;

/// Errors raised while setting up or running a tournament
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("a tournament needs at least 2 agents, got {0}")]
    NotEnoughAgents(usize),

    #[error("fixture references unknown agent {0}")]
    UnknownAgent(AgentHandle),

    #[error("an agent named '{0}' is already registered")]
    DuplicateAgent(String),

    #[error("fixture {index} pairs agent {handle} against itself")]
    SelfPairing { index: usize, handle: AgentHandle },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("game engine failure: {0}")]
    Engine(#[from] GameError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
