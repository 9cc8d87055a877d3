//! Move legality and capture resolution

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Coord, Side, DIRECTIONS};

/// A placement by one side. Immutable once recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub side: Side,
    pub coord: Coord,
}

impl Move {
    pub const fn new(side: Side, coord: Coord) -> Self {
        Self { side, coord }
    }
}

/// Cells flipped by one move, grouped by direction in `DIRECTIONS` order
pub type CaptureSet = Vec<Coord>;

/// Precondition violation when applying a move
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("{0} is off the board")]
    OutOfBounds(Coord),
    #[error("{0} is already occupied")]
    Occupied(Coord),
    #[error("placing {side} at {coord} captures nothing")]
    NoCapture { side: Side, coord: Coord },
}

// ============================================================================
// LEGALITY
// ============================================================================

/// A move is legal iff the target is empty and at least one direction
/// captures.
pub fn is_legal(board: &Board, coord: Coord, side: Side) -> bool {
    coord.is_valid()
        && board.get(coord).is_empty()
        && DIRECTIONS
            .iter()
            .any(|&dir| capture_run(board, coord, side, dir) > 0)
}

/// All legal targets for a side in row-major order (possibly empty)
pub fn legal_moves(board: &Board, side: Side) -> Vec<Coord> {
    Coord::all().filter(|&c| is_legal(board, c, side)).collect()
}

pub fn has_legal_move(board: &Board, side: Side) -> bool {
    Coord::all().any(|c| is_legal(board, c, side))
}

/// Cells that placing `side` at `coord` would flip, without mutating
pub fn captures(board: &Board, coord: Coord, side: Side) -> CaptureSet {
    let mut flipped = Vec::new();
    if !coord.is_valid() || !board.get(coord).is_empty() {
        return flipped;
    }
    for &dir in &DIRECTIONS {
        let run = capture_run(board, coord, side, dir);
        let mut current = coord;
        for _ in 0..run {
            // run > 0 guarantees the path stays on the board
            if let Some(next) = current.offset(dir) {
                flipped.push(next);
                current = next;
            }
        }
    }
    flipped
}

/// Length of the opponent run starting next to `from` in `dir`, or 0 when
/// the run is empty, hits an empty cell, or leaves the board before a
/// same-side cell closes it.
fn capture_run(board: &Board, from: Coord, side: Side, dir: (i8, i8)) -> usize {
    let opponent = side.opponent().cell();
    let own = side.cell();
    let mut run = 0;
    let mut current = from;

    while let Some(next) = current.offset(dir) {
        let cell = board.get(next);
        if cell == opponent {
            run += 1;
            current = next;
        } else if cell == own {
            return run;
        } else {
            return 0;
        }
    }

    0
}

// ============================================================================
// APPLY MOVE
// ============================================================================

/// Place `side` at `coord` and flip every captured run.
///
/// Returns the union of flipped cells across all directions. Fails without
/// touching the board when the move is not legal.
pub fn apply_move(board: &mut Board, coord: Coord, side: Side) -> Result<CaptureSet, MoveError> {
    if !coord.is_valid() {
        return Err(MoveError::OutOfBounds(coord));
    }
    if !board.get(coord).is_empty() {
        return Err(MoveError::Occupied(coord));
    }

    let flipped = captures(board, coord, side);
    if flipped.is_empty() {
        return Err(MoveError::NoCapture { side, coord });
    }

    board.set(coord, side.cell());
    for &c in &flipped {
        board.set(c, side.cell());
    }

    Ok(flipped)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, CELL_COUNT};
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_opening_legal_moves() {
        let board = Board::new();
        let moves = legal_moves(&board, Side::A);
        assert_eq!(
            moves,
            vec![
                Coord::new(2, 3),
                Coord::new(3, 2),
                Coord::new(4, 5),
                Coord::new(5, 4),
            ]
        );
        assert_eq!(legal_moves(&board, Side::B).len(), 4);
    }

    #[test]
    fn test_opening_move_scenario() {
        let mut board = Board::new();
        assert!(is_legal(&board, Coord::new(2, 3), Side::A));

        let flipped = apply_move(&mut board, Coord::new(2, 3), Side::A).unwrap();
        assert_eq!(flipped, vec![Coord::new(3, 3)]);

        let expected: Board = "
            ........
            ........
            ...A....
            ...AA...
            ...AB...
            ........
            ........
            ........
        "
        .parse()
        .unwrap();
        assert_eq!(board, expected);
        assert_eq!(board.piece_count(Side::A), 4);
        assert_eq!(board.piece_count(Side::B), 1);
    }

    #[test]
    fn test_multi_direction_capture() {
        let mut board: Board = "
            A.A.A...
            .BBB....
            AB.BA...
            .BBB....
            A.A.A...
            ........
            ........
            ........
        "
        .parse()
        .unwrap();

        let flipped = apply_move(&mut board, Coord::new(2, 2), Side::A).unwrap();
        assert_eq!(flipped.len(), 8);
        assert_eq!(board.piece_count(Side::B), 0);
        assert_eq!(board.get(Coord::new(2, 2)), Cell::SideA);
    }

    #[test]
    fn test_run_must_be_closed() {
        // B run reaches the edge without an A behind it
        let board: Board = "
            .BB.....
            ........
            ........
            ........
            ........
            ........
            ........
            ........
        "
        .parse()
        .unwrap();
        assert!(!is_legal(&board, Coord::new(0, 0), Side::A));

        // Gap in the run
        let board: Board = "
            .B.A....
            ........
            ........
            ........
            ........
            ........
            ........
            ........
        "
        .parse()
        .unwrap();
        assert!(!is_legal(&board, Coord::new(0, 0), Side::A));
    }

    #[test]
    fn test_apply_illegal_move_fails_untouched() {
        let mut board = Board::new();
        let before = board.clone();

        assert_eq!(
            apply_move(&mut board, Coord::new(0, 0), Side::A),
            Err(MoveError::NoCapture { side: Side::A, coord: Coord::new(0, 0) })
        );
        assert_eq!(
            apply_move(&mut board, Coord::new(3, 3), Side::A),
            Err(MoveError::Occupied(Coord::new(3, 3)))
        );
        assert_eq!(
            apply_move(&mut board, Coord::new(8, 0), Side::A),
            Err(MoveError::OutOfBounds(Coord::new(8, 0)))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_random_playouts_preserve_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let mut board = Board::new();
            let mut side = Side::A;
            let mut passes = 0;

            while passes < 2 {
                let moves = legal_moves(&board, side);
                if moves.is_empty() {
                    passes += 1;
                } else {
                    passes = 0;
                    let coord = *moves.choose(&mut rng).unwrap();
                    let occupied = board.occupied_count();
                    let own = board.piece_count(side);
                    let opp = board.piece_count(side.opponent());

                    let flipped = apply_move(&mut board, coord, side).unwrap();

                    assert_eq!(board.occupied_count(), occupied + 1);
                    assert_eq!(board.piece_count(side), own + 1 + flipped.len());
                    assert_eq!(board.piece_count(side.opponent()), opp - flipped.len());
                }
                assert_eq!(
                    board.piece_count(Side::A) + board.piece_count(Side::B) + board.empty_count(),
                    CELL_COUNT
                );
                side = side.opponent();
            }
        }
    }

    #[test]
    fn test_legality_symmetric_under_side_swap() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut board = Board::new();
        let mut side = Side::A;

        for _ in 0..30 {
            let swapped = board.swapped();
            for coord in Coord::all() {
                assert_eq!(
                    is_legal(&board, coord, Side::A),
                    is_legal(&swapped, coord, Side::B),
                );
                assert_eq!(
                    is_legal(&board, coord, Side::B),
                    is_legal(&swapped, coord, Side::A),
                );
            }

            let moves = legal_moves(&board, side);
            if let Some(&coord) = moves.choose(&mut rng) {
                apply_move(&mut board, coord, side).unwrap();
            }
            side = side.opponent();
        }
    }

    #[test]
    fn test_captures_matches_apply() {
        let board = Board::new();
        let preview = captures(&board, Coord::new(5, 4), Side::A);
        let mut applied = board.clone();
        let flipped = apply_move(&mut applied, Coord::new(5, 4), Side::A).unwrap();
        assert_eq!(preview, flipped);
    }
}
