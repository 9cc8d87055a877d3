//! Board geometry and cell storage for the 8x8 grid

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board width and height
pub const BOARD_SIZE: usize = 8;

/// Number of cells on the board
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Direction vectors (drow, dcol)
/// Index: 0=N, 1=NE, 2=E, 3=SE, 4=S, 5=SW, 6=W, 7=NW
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),  // N
    (-1, 1),  // NE
    (0, 1),   // E
    (1, 1),   // SE
    (1, 0),   // S
    (1, -1),  // SW
    (0, -1),  // W
    (-1, -1), // NW
];

/// The four corner cells
pub const CORNERS: [Coord; 4] = [
    Coord::new(0, 0),
    Coord::new(0, 7),
    Coord::new(7, 0),
    Coord::new(7, 7),
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// One of the two competing sides. Side A always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A = 0,
    B = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Cell value owned by this side
    pub fn cell(self) -> Cell {
        match self {
            Side::A => Cell::SideA,
            Side::B => Cell::SideB,
        }
    }

    /// Stable index (0 for A, 1 for B) for per-side arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Contents of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    SideA,
    SideB,
}

impl Cell {
    /// Owning side, if occupied
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::SideA => Some(Side::A),
            Cell::SideB => Some(Side::B),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::SideA => 'A',
            Cell::SideB => 'B',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Empty),
            'A' => Some(Cell::SideA),
            'B' => Some(Cell::SideB),
            _ => None,
        }
    }
}

/// Board coordinate, row-major
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate is on the board
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Step one cell in a direction, None when leaving the board
    pub fn offset(&self, (dr, dc): (i8, i8)) -> Option<Coord> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Coord::new(row as u8, col as u8))
        } else {
            None
        }
    }

    pub fn is_corner(&self) -> bool {
        CORNERS.contains(self)
    }

    /// All 64 coordinates in row-major order
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE as u8).flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Coord::new(row, col)))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// 8x8 grid of cells (clone to snapshot)
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Standard opening position: B on (3,3) and (4,4), A on (3,4) and (4,3)
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.set(Coord::new(3, 3), Cell::SideB);
        board.set(Coord::new(3, 4), Cell::SideA);
        board.set(Coord::new(4, 3), Cell::SideA);
        board.set(Coord::new(4, 4), Cell::SideB);
        board
    }

    /// Board with no pieces
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Get cell at coordinate. Off-board coordinates read as empty.
    pub fn get(&self, coord: Coord) -> Cell {
        if !coord.is_valid() {
            return Cell::Empty;
        }
        self.cells[coord.row as usize][coord.col as usize]
    }

    pub(crate) fn set(&mut self, coord: Coord, cell: Cell) {
        self.cells[coord.row as usize][coord.col as usize] = cell;
    }

    /// Iterate cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        Coord::all().map(move |coord| (coord, self.get(coord)))
    }

    /// Rows of cells, top to bottom
    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Number of cells holding the given value
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }

    pub fn piece_count(&self, side: Side) -> usize {
        self.count(side.cell())
    }

    pub fn empty_count(&self) -> usize {
        self.count(Cell::Empty)
    }

    pub fn occupied_count(&self) -> usize {
        CELL_COUNT - self.empty_count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Corners currently held by a side
    pub fn corners_held(&self, side: Side) -> usize {
        CORNERS.iter().filter(|&&c| self.get(c) == side.cell()).count()
    }

    /// Same position with the colours of the two sides exchanged
    pub fn swapped(&self) -> Board {
        let mut out = self.clone();
        for cell in out.cells.iter_mut().flatten() {
            *cell = match *cell {
                Cell::Empty => Cell::Empty,
                Cell::SideA => Cell::SideB,
                Cell::SideB => Cell::SideA,
            };
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            if i + 1 < BOARD_SIZE {
                writeln!(f, "{}", line)?;
            } else {
                write!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        writeln!(f, "{}", self)?;
        write!(f, "}}")
    }
}

/// Error parsing a board diagram
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("row {row} has {len} cells, expected 8")]
    RowLength { row: usize, len: usize },
    #[error("unknown cell symbol {symbol:?} in row {row}")]
    Symbol { row: usize, symbol: char },
}

/// Parse a diagram of eight lines using `.`, `A` and `B`.
/// Blank lines and surrounding whitespace are ignored.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != BOARD_SIZE {
            return Err(ParseBoardError::RowCount(rows.len()));
        }

        let mut board = Board::empty();
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != BOARD_SIZE {
                return Err(ParseBoardError::RowLength { row, len: symbols.len() });
            }
            for (col, &symbol) in symbols.iter().enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or(ParseBoardError::Symbol { row, symbol })?;
                board.set(Coord::new(row as u8, col as u8), cell);
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_position() {
        let board = Board::new();
        assert_eq!(board.piece_count(Side::A), 2);
        assert_eq!(board.piece_count(Side::B), 2);
        assert_eq!(board.empty_count(), 60);
        for coord in Coord::all() {
            let center = (3..=4).contains(&coord.row) && (3..=4).contains(&coord.col);
            assert_eq!(!board.get(coord).is_empty(), center, "{}", coord);
        }
    }

    #[test]
    fn test_offset_bounds() {
        assert_eq!(Coord::new(0, 0).offset((-1, 0)), None);
        assert_eq!(Coord::new(7, 7).offset((0, 1)), None);
        assert_eq!(Coord::new(3, 3).offset((1, -1)), Some(Coord::new(4, 2)));
    }

    #[test]
    fn test_directions_are_unit_and_distinct() {
        for (i, d) in DIRECTIONS.iter().enumerate() {
            assert_ne!(*d, (0, 0));
            assert!(d.0.abs() <= 1 && d.1.abs() <= 1);
            assert!(!DIRECTIONS[i + 1..].contains(d));
        }
    }

    #[test]
    fn test_parse_and_display() {
        let text = "
            A.......
            .B......
            ........
            ........
            ........
            ........
            ........
            .......B
        ";
        let board: Board = text.parse().unwrap();
        assert_eq!(board.get(Coord::new(0, 0)), Cell::SideA);
        assert_eq!(board.get(Coord::new(1, 1)), Cell::SideB);
        assert_eq!(board.corners_held(Side::A), 1);
        assert_eq!(board.corners_held(Side::B), 1);

        let reparsed: Board = board.to_string().parse().unwrap();
        assert_eq!(reparsed, board);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("A.".parse::<Board>(), Err(ParseBoardError::RowCount(1)));
        let bad = "........\n".repeat(7) + "...X....";
        assert_eq!(
            bad.parse::<Board>(),
            Err(ParseBoardError::Symbol { row: 7, symbol: 'X' })
        );
    }

    #[test]
    fn test_swapped() {
        let board = Board::new();
        let swapped = board.swapped();
        assert_eq!(swapped.get(Coord::new(3, 3)), Cell::SideA);
        assert_eq!(swapped.get(Coord::new(3, 4)), Cell::SideB);
        assert_eq!(swapped.swapped(), board);
    }

    #[test]
    fn test_serializes_as_rows() {
        let value = serde_json::to_value(Board::new()).unwrap();
        let rows = value["cells"].as_array().unwrap();
        assert_eq!(rows.len(), BOARD_SIZE);
        assert_eq!(rows[3][3], "SideB");
        assert_eq!(rows[3][4], "SideA");
        assert_eq!(rows[0][0], "Empty");
    }
}
