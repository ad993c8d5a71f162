//! Caller-facing board grid.
//!
//! A [`Board`] is the rectangular `{-1, 0, +1}` snapshot handed to
//! [`crate::engine::decide`]. Row 0 is the top of the grid. Shape and cell
//! values are validated on construction, so a `Board` that exists is always
//! well-formed; gravity is checked when it is turned into a
//! [`crate::position::Position`].

use std::fmt;
use std::str::FromStr;

use crate::constants::{COLS, EMPTY_CELL, ROWS};
use crate::error::EngineError;
use crate::state::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[i8; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// An empty grid.
    pub fn empty() -> Self {
        Self {
            cells: [[EMPTY_CELL; COLS]; ROWS],
        }
    }

    /// Build a board from rows listed top to bottom.
    ///
    /// Fails if the grid is not `ROWS x COLS` or a cell is outside `{-1, 0, 1}`.
    pub fn from_rows<T: Copy + Into<i64>>(rows: &[Vec<T>]) -> Result<Self, EngineError> {
        if rows.len() != ROWS {
            return Err(EngineError::RowCount {
                expected: ROWS,
                actual: rows.len(),
            });
        }

        let mut board = Self::empty();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != COLS {
                return Err(EngineError::ColumnCount {
                    row: r,
                    expected: COLS,
                    actual: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                let value: i64 = value.into();
                if !(-1..=1).contains(&value) {
                    return Err(EngineError::InvalidCell {
                        row: r,
                        col: c,
                        value,
                    });
                }
                board.cells[r][c] = value as i8;
            }
        }
        Ok(board)
    }

    /// Cell value at (row, col), row 0 being the top.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.cells[row][col]
    }

    /// Number of discs owned by `side`.
    pub fn count(&self, side: Side) -> usize {
        let value = side.cell_value();
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == value)
            .count()
    }

    /// Infer whose turn it is from the disc counts.
    ///
    /// Equal counts mean side A moves; otherwise the side with fewer discs does.
    pub fn side_to_move(&self) -> Side {
        if self.count(Side::A) <= self.count(Side::B) {
            Side::A
        } else {
            Side::B
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: i8) {
        self.cells[row][col] = value;
    }
}

fn symbol(value: i8) -> char {
    match Side::from_cell(value) {
        Some(Side::A) => 'X',
        Some(Side::B) => 'O',
        None => '.',
    }
}

/// Parse a grid written top row first, one row per line.
///
/// `X` is side A, `O` is side B, `.` (or `0`) is empty. Whitespace inside a
/// row and blank lines are ignored.
impl FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();
        for line in s.lines() {
            let mut row = Vec::new();
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                let value: i8 = match ch {
                    '.' | '0' => 0,
                    'X' | 'x' => 1,
                    'O' | 'o' => -1,
                    other => return Err(EngineError::InvalidSymbol(other)),
                };
                row.push(value);
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Self::from_rows(&rows)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for (c, &cell) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", symbol(cell))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
