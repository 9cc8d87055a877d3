//! Turn state machine driving a single game to completion

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{Agent, AgentOutcome, Choice};
use crate::board::{Board, Coord, Side};
use crate::moves::{apply_move, has_legal_move, legal_moves, Move, MoveError};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Controller state. No other states exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    AwaitingMoveA,
    AwaitingMoveB,
    Terminal,
}

impl GamePhase {
    fn awaiting(side: Side) -> Self {
        match side {
            Side::A => GamePhase::AwaitingMoveA,
            Side::B => GamePhase::AwaitingMoveB,
        }
    }

    /// Side to move, None once terminal
    pub fn side_to_move(self) -> Option<Side> {
        match self {
            GamePhase::AwaitingMoveA => Some(Side::A),
            GamePhase::AwaitingMoveB => Some(Side::B),
            GamePhase::Terminal => None,
        }
    }
}

/// Final result of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    SideAWins,
    SideBWins,
    Draw,
}

impl GameResult {
    /// Strictly more pieces wins, equal counts draw
    pub fn from_counts(a: usize, b: usize) -> Self {
        if a > b {
            GameResult::SideAWins
        } else if b > a {
            GameResult::SideBWins
        } else {
            GameResult::Draw
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::SideAWins => Some(Side::A),
            GameResult::SideBWins => Some(Side::B),
            GameResult::Draw => None,
        }
    }

    /// Result from one side's perspective
    pub fn outcome_for(self, side: Side) -> AgentOutcome {
        match self.winner() {
            None => AgentOutcome::Draw,
            Some(w) if w == side => AgentOutcome::Win,
            Some(_) => AgentOutcome::Loss,
        }
    }
}

/// One entry of the game log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    /// A placement. `fallback` is set when the agent's answer was rejected
    /// and the controller chose the move.
    Played { mv: Move, flipped: usize, fallback: bool },
    /// No legal move; the turn passed without a placement
    Skipped(Side),
}

impl Turn {
    pub fn side(&self) -> Side {
        match self {
            Turn::Played { mv, .. } => mv.side,
            Turn::Skipped(side) => *side,
        }
    }
}

/// Per-side counters for one game
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Pieces on the final board
    pub pieces: usize,
    /// Corners held on the final board
    pub corners: usize,
    pub moves: usize,
    pub skips: usize,
    /// Answers outside the legal set, including declined choices
    pub violations: usize,
    /// Wall-clock time spent inside `select_move`
    pub decision_time: Duration,
}

/// Complete log of a finished game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub turns: Vec<Turn>,
    pub final_board: Board,
    pub result: GameResult,
    pub side_a: SideSummary,
    pub side_b: SideSummary,
}

impl GameRecord {
    pub fn summary(&self, side: Side) -> &SideSummary {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        self.result.winner()
    }

    pub fn is_draw(&self) -> bool {
        self.result == GameResult::Draw
    }

    /// Placements made by both sides
    pub fn move_count(&self) -> usize {
        self.side_a.moves + self.side_b.moves
    }

    pub fn skip_count(&self) -> usize {
        self.side_a.skips + self.side_b.skips
    }
}

/// Fatal controller failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A move that passed validation was rejected by the resolver
    #[error("move resolver rejected a validated move: {0}")]
    Resolver(#[from] MoveError),
}

/// Shared flag used to abort games and tournaments
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// GAME CONTROLLER
// ============================================================================

/// Drives one game: alternating turns, skips, termination.
///
/// The controller owns a fresh board; agents are lent per call so the same
/// agent can sit in several controllers over its lifetime.
pub struct GameController {
    board: Board,
    phase: GamePhase,
    turns: Vec<Turn>,
    consecutive_skips: u8,
    summaries: [SideSummary; 2],
    fallback_rng: ChaCha8Rng,
}

impl GameController {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game from the standard opening, side A to move.
    /// `seed` drives the fallback policy for rejected answers.
    pub fn new(seed: u64) -> Self {
        Self::from_position(Board::new(), Side::A, seed)
    }

    /// Game starting from an arbitrary position
    pub fn from_position(board: Board, to_move: Side, seed: u64) -> Self {
        let phase = if board.is_full() {
            GamePhase::Terminal
        } else {
            GamePhase::awaiting(to_move)
        };

        Self {
            board,
            phase,
            turns: Vec::new(),
            consecutive_skips: 0,
            summaries: [SideSummary::default(), SideSummary::default()],
            fallback_rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn side_to_move(&self) -> Option<Side> {
        self.phase.side_to_move()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == GamePhase::Terminal
    }

    /// Legal moves for the side to move (empty when terminal)
    pub fn legal_moves(&self) -> Vec<Coord> {
        match self.side_to_move() {
            Some(side) => legal_moves(&self.board, side),
            None => Vec::new(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    // ========================================================================
    // TURN LOOP
    // ========================================================================

    /// Advance one turn. The agent for the side to move is asked for a
    /// move; the other agent is untouched.
    pub fn step(&mut self, agent_a: &mut dyn Agent, agent_b: &mut dyn Agent) -> Result<GamePhase, GameError> {
        let side = match self.phase.side_to_move() {
            Some(side) => side,
            None => return Ok(GamePhase::Terminal),
        };

        let legal = legal_moves(&self.board, side);
        if legal.is_empty() {
            self.record_skip(side);
        } else {
            let agent: &mut dyn Agent = match side {
                Side::A => agent_a,
                Side::B => agent_b,
            };
            self.play_turn(agent, side, &legal)?;
        }

        self.phase = self.next_phase(side);
        Ok(self.phase)
    }

    /// Play until terminal and notify both agents.
    ///
    /// Returns `Ok(None)` if `cancel` fires first; a cancelled game produces
    /// no record and no notifications.
    pub fn run(
        mut self,
        agent_a: &mut dyn Agent,
        agent_b: &mut dyn Agent,
        cancel: &CancelToken,
    ) -> Result<Option<GameRecord>, GameError> {
        while !self.is_terminal() {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            self.step(agent_a, agent_b)?;
        }

        let record = self.into_record();
        let move_count = record.move_count();
        notify(agent_a, record.result.outcome_for(Side::A), move_count);
        notify(agent_b, record.result.outcome_for(Side::B), move_count);
        Ok(Some(record))
    }

    /// Finalize the log. Counts reflect the board as it stands, so call
    /// this once terminal.
    pub fn into_record(self) -> GameRecord {
        let count_a = self.board.piece_count(Side::A);
        let count_b = self.board.piece_count(Side::B);
        let [mut side_a, mut side_b] = self.summaries;

        side_a.pieces = count_a;
        side_a.corners = self.board.corners_held(Side::A);
        side_b.pieces = count_b;
        side_b.corners = self.board.corners_held(Side::B);

        GameRecord {
            turns: self.turns,
            result: GameResult::from_counts(count_a, count_b),
            final_board: self.board,
            side_a,
            side_b,
        }
    }

    // ========================================================================
    // TURN HELPERS
    // ========================================================================

    fn play_turn(&mut self, agent: &mut dyn Agent, side: Side, legal: &[Coord]) -> Result<(), GameError> {
        let started = Instant::now();
        let board = &self.board;
        let answer = panic::catch_unwind(AssertUnwindSafe(|| agent.select_move(board, side, legal)));
        self.summaries[side.index()].decision_time += started.elapsed();

        // A panic is a malformed answer: fall back like any other violation
        let choice = answer.unwrap_or_else(|payload| {
            tracing::warn!(
                agent = agent.name(),
                side = %side,
                panic = panic_message(payload.as_ref()),
                "agent panicked while choosing a move"
            );
            Choice::NoMove
        });

        let (coord, fallback) = match choice {
            Choice::Play(coord) if legal.contains(&coord) => (coord, false),
            other => {
                self.summaries[side.index()].violations += 1;
                let coord = self.fallback_move(legal);
                tracing::warn!(
                    agent = agent.name(),
                    side = %side,
                    answer = ?other,
                    fallback = %coord,
                    "agent answered outside the legal set, playing fallback"
                );
                (coord, true)
            }
        };

        let flipped = apply_move(&mut self.board, coord, side)?;
        self.summaries[side.index()].moves += 1;
        self.consecutive_skips = 0;
        self.turns.push(Turn::Played {
            mv: Move::new(side, coord),
            flipped: flipped.len(),
            fallback,
        });

        Ok(())
    }

    fn record_skip(&mut self, side: Side) {
        tracing::debug!(side = %side, "no legal move, skipping turn");
        self.summaries[side.index()].skips += 1;
        self.consecutive_skips += 1;
        self.turns.push(Turn::Skipped(side));
    }

    /// Uniform pick from the legal set
    fn fallback_move(&mut self, legal: &[Coord]) -> Coord {
        legal[self.fallback_rng.gen_range(0..legal.len())]
    }

    /// Terminal when the board is full, two skips happened back to back,
    /// or neither side can move. Otherwise the opponent is up.
    fn next_phase(&self, just_played: Side) -> GamePhase {
        let next = just_played.opponent();
        if self.board.is_full()
            || self.consecutive_skips >= 2
            || (!has_legal_move(&self.board, next) && !has_legal_move(&self.board, just_played))
        {
            GamePhase::Terminal
        } else {
            GamePhase::awaiting(next)
        }
    }
}

/// Deliver a result; a panicking agent is logged, never propagated
fn notify(agent: &mut dyn Agent, outcome: AgentOutcome, move_count: usize) {
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| agent.notify_result(outcome, move_count)));
    if let Err(payload) = delivered {
        tracing::warn!(
            agent = agent.name(),
            panic = panic_message(payload.as_ref()),
            "agent panicked while receiving a result"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

// ============================================================================
// TESTS
// ============================================================================
