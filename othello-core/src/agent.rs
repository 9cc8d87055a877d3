//! Agent capability consumed by the game controller

use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord, Side};

/// An agent's answer to a move request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    /// Place at this coordinate. Must be one of the offered legal moves.
    Play(Coord),
    /// Decline to choose; the controller plays a fallback move instead
    NoMove,
}

/// Finished-game result from one agent's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentOutcome {
    Win,
    Loss,
    Draw,
}

/// A participant that selects moves.
///
/// Implementations may block (e.g. waiting on an external service) and own
/// any timeout around that. Any state kept between calls is private to the
/// implementation.
pub trait Agent: Send {
    /// Display name, unique within a tournament
    fn name(&self) -> &str;

    /// Pick one of `legal` for `side`. `legal` is never empty.
    fn select_move(&mut self, board: &Board, side: Side, legal: &[Coord]) -> Choice;

    /// Informs the agent that a game it played has finished
    fn notify_result(&mut self, _outcome: AgentOutcome, _move_count: usize) {}
}

impl<T: Agent + ?Sized> Agent for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select_move(&mut self, board: &Board, side: Side, legal: &[Coord]) -> Choice {
        (**self).select_move(board, side, legal)
    }

    fn notify_result(&mut self, outcome: AgentOutcome, move_count: usize) {
        (**self).notify_result(outcome, move_count)
    }
}
