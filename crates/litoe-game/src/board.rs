//! Board logic: pure functions over a 3×3 grid.
//!
//! Nothing in here knows about players, turns, or clocks. Callers validate
//! occupancy before calling [`apply_move`].

use std::fmt;

use litoe_protocol::{Handle, Mark};
use serde::{Deserialize, Serialize};

use crate::{Outcome, Rejection};

/// Side length of the board.
pub const SIZE: usize = 3;

/// The eight winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A validated cell coordinate. Rows and columns are both in `0..3`.
///
/// On the wire a position is a `[row, col]` pair; out-of-range pairs fail
/// to deserialize, so a `Position` in hand is always on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[usize; 2]", into = "[usize; 2]")]
pub struct Position {
    row: usize,
    col: usize,
}

impl Position {
    /// Creates a position, rejecting coordinates off the board.
    pub fn new(row: usize, col: usize) -> Result<Self, Rejection> {
        if row >= SIZE || col >= SIZE {
            return Err(Rejection::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    /// Creates a position from a row-major index in `0..9`.
    pub fn from_index(index: usize) -> Result<Self, Rejection> {
        Self::new(index / SIZE, index % SIZE)
    }

    pub fn row(self) -> usize {
        self.row
    }

    pub fn col(self) -> usize {
        self.col
    }

    /// Row-major index in `0..9`.
    pub fn index(self) -> usize {
        self.row * SIZE + self.col
    }

    /// All nine positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..SIZE * SIZE).map(|i| Position {
            row: i / SIZE,
            col: i % SIZE,
        })
    }
}

impl TryFrom<[usize; 2]> for Position {
    type Error = Rejection;

    fn try_from([row, col]: [usize; 2]) -> Result<Self, Self::Error> {
        Self::new(row, col)
    }
}

impl From<Position> for [usize; 2] {
    fn from(pos: Position) -> Self {
        [pos.row, pos.col]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A 3×3 grid where each cell is empty (`None`) or holds a [`Mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Mark>; SIZE]; SIZE],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from rows. Handy in tests and for decoding fixtures.
    pub fn from_rows(cells: [[Option<Mark>; SIZE]; SIZE]) -> Self {
        Self { cells }
    }

    /// The mark at `pos`, if any.
    pub fn get(&self, pos: Position) -> Option<Mark> {
        self.cells[pos.row][pos.col]
    }

    /// Returns `true` if nothing has been played at `pos`.
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Number of occupied cells.
    pub fn marks_placed(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().flatten().filter(|c| **c == Some(mark)).count()
    }

    /// Rows, top to bottom.
    pub fn rows(&self) -> &[[Option<Mark>; SIZE]; SIZE] {
        &self.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, "|")?;
                }
                match cell {
                    Some(mark) => write!(f, "{mark}")?,
                    None => write!(f, ".")?,
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Returns a copy of `board` with `mark` written at `position`.
///
/// Does not check occupancy.
pub fn apply_move(board: &Board, position: Position, mark: Mark) -> Board {
    let mut next = *board;
    next.cells[position.row][position.col] = Some(mark);
    next
}

/// Returns `true` if any row, column, or diagonal is entirely `mark`.
pub fn is_winning_line(board: &Board, mark: Mark) -> bool {
    LINES
        .iter()
        .any(|line| line.iter().all(|&(r, c)| board.cells[r][c] == Some(mark)))
}

/// Returns `true` if every cell is occupied.
pub fn is_full(board: &Board) -> bool {
    board.cells.iter().flatten().all(Option::is_some)
}

/// Decides the outcome after `mark` was just played on `board`.
///
/// A win is checked before a draw: a move that fills the last cell and
/// completes a line is a win for `player`.
pub fn compute_outcome(board: &Board, mark: Mark, player: &Handle) -> Option<Outcome> {
    if is_winning_line(board, mark) {
        Some(Outcome::Winner(player.clone()))
    } else if is_full(board) {
        Some(Outcome::Draw)
    } else {
        None
    }
}
