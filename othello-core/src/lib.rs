//! Othello Core - Game engine and agent capability
//!
//! This crate provides the core game logic:
//! - Board geometry (8x8 grid, row-major coordinates)
//! - Move legality and capture resolution
//! - Turn state machine with skips and termination
//! - The `Agent` trait and built-in baseline agents

pub mod board;
pub mod moves;
pub mod game;
pub mod agent;
pub mod ai;

// Re-exports for convenient access
pub use board::{Board, Cell, Coord, ParseBoardError, Side, BOARD_SIZE, CELL_COUNT, CORNERS, DIRECTIONS};
pub use moves::{apply_move, captures, has_legal_move, is_legal, legal_moves, CaptureSet, Move, MoveError};
pub use game::{CancelToken, GameController, GameError, GamePhase, GameRecord, GameResult, SideSummary, Turn};
pub use agent::{Agent, AgentOutcome, Choice};
pub use ai::{AgentKind, GreedyAgent, PositionalAgent, RandomAgent};
