//! Connect-Four position representation and move execution.
//!
//! This module provides the concrete [`GameState`] used by the engine:
//! - Grid storage with per-column heights for gravity
//! - Immutable move application (every move yields a new `Position`)
//! - Win detection through the last placed disc, draw on a full grid
//! - Conversion from and to the caller-facing [`Board`]

use crate::board::Board;
use crate::constants::{CELLS, COLS, CONNECT, EMPTY_CELL, ROWS};
use crate::error::EngineError;
use crate::state::{GameState, Outcome, Side};

/// Line directions as (row delta, column delta): horizontal, vertical, and
/// both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A Connect-Four position.
///
/// `cells` is indexed `[row][col]` with row 0 at the top, same as [`Board`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    cells: [[i8; COLS]; ROWS],
    /// Discs already in each column
    heights: [u8; COLS],
    side: Side,
    outcome: Outcome,
    /// Total discs on the grid
    filled: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Empty grid, side A to move.
    pub fn new() -> Self {
        Self {
            cells: [[EMPTY_CELL; COLS]; ROWS],
            heights: [0; COLS],
            side: Side::A,
            outcome: Outcome::Ongoing,
            filled: 0,
        }
    }

    /// Build a position from a validated board.
    ///
    /// The side to move is inferred with [`Board::side_to_move`]. Fails if a
    /// disc sits above an empty cell. A board that already holds four in a
    /// line (or is full) yields a terminal position.
    pub fn from_board(board: &Board) -> Result<Self, EngineError> {
        let mut pos = Self::new();
        pos.side = board.side_to_move();

        for col in 0..COLS {
            let mut height = 0u8;
            let mut seen_empty = false;
            for row in (0..ROWS).rev() {
                let value = board.get(row, col);
                if value == EMPTY_CELL {
                    seen_empty = true;
                } else if seen_empty {
                    return Err(EngineError::FloatingDisc { row, col });
                } else {
                    height += 1;
                    pos.filled += 1;
                }
                pos.cells[row][col] = value;
            }
            pos.heights[col] = height;
        }

        pos.outcome = pos.scan_outcome();
        Ok(pos)
    }

    /// Cell value at (row, col), row 0 being the top.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> i8 {
        self.cells[row][col]
    }

    /// Number of discs in `col`.
    #[inline]
    pub fn height(&self, col: usize) -> usize {
        self.heights[col] as usize
    }

    /// Total discs on the grid.
    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Play `col` for the side to move, returning the new position.
    pub fn play(&self, col: usize) -> Result<Position, MoveError> {
        if self.outcome != Outcome::Ongoing {
            return Err(MoveError::GameOver);
        }
        if col >= COLS {
            return Err(MoveError::OutOfRange(col));
        }
        if self.heights[col] as usize >= ROWS {
            return Err(MoveError::ColumnFull(col));
        }

        let mut next = self.clone();
        let row = ROWS - 1 - self.heights[col] as usize;
        next.cells[row][col] = self.side.cell_value();
        next.heights[col] += 1;
        next.filled += 1;

        next.outcome = if next.wins_through(row, col) {
            Outcome::Win(self.side)
        } else if next.filled == CELLS {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        };
        next.side = self.side.opponent();
        Ok(next)
    }

    /// Count same-coloured discs from (row, col) stepping by (dr, dc),
    /// excluding the starting cell.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize) -> usize {
        let value = self.cells[row][col];
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while r >= 0 && r < ROWS as isize && c >= 0 && c < COLS as isize {
            if self.cells[r as usize][c as usize] != value {
                break;
            }
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// Check if the disc at (row, col) is part of a winning line.
    fn wins_through(&self, row: usize, col: usize) -> bool {
        if self.cells[row][col] == EMPTY_CELL {
            return false;
        }
        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(row, col, dr, dc) + self.run_length(row, col, -dr, -dc) >= CONNECT
        })
    }

    /// Full-grid outcome scan, used for positions that did not come from
    /// `play`. If both sides somehow hold a line, the first found in
    /// top-to-bottom, left-to-right order wins.
    fn scan_outcome(&self) -> Outcome {
        for row in 0..ROWS {
            for col in 0..COLS {
                if self.wins_through(row, col) {
                    if let Some(side) = Side::from_cell(self.cells[row][col]) {
                        return Outcome::Win(side);
                    }
                }
            }
        }
        if self.filled == CELLS {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }
}

impl GameState for Position {
    #[inline]
    fn side_to_move(&self) -> Side {
        self.side
    }

    #[inline]
    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn legal_columns(&self) -> Vec<usize> {
        if self.outcome != Outcome::Ongoing {
            return Vec::new();
        }
        (0..COLS)
            .filter(|&col| (self.heights[col] as usize) < ROWS)
            .collect()
    }

    fn transition(&self, column: usize) -> Self {
        match self.play(column) {
            Ok(next) => next,
            Err(err) => {
                debug_assert!(false, "illegal transition: {err}");
                self.clone()
            }
        }
    }

    fn with_side_to_move(&self, side: Side) -> Self {
        let mut pos = self.clone();
        pos.side = side;
        pos
    }

    #[inline]
    fn progress(&self) -> f64 {
        self.filled as f64 / CELLS as f64
    }

    #[inline]
    fn cell_count(&self) -> usize {
        CELLS
    }

    fn landing_height(&self, column: usize) -> Option<usize> {
        let height = self.heights[column] as usize;
        (height < ROWS).then_some(height + 1)
    }
}

impl From<&Position> for Board {
    fn from(pos: &Position) -> Self {
        let mut board = Board::empty();
        for row in 0..ROWS {
            for col in 0..COLS {
                board.set(row, col, pos.cells[row][col]);
            }
        }
        board
    }
}

/// Reasons a move cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {0} is out of range")]
    OutOfRange(usize),
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("the game is already over")]
    GameOver,
}
