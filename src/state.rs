//! The game-state seam the search engine is written against.
//!
//! The engine never looks inside a board. It only needs to apply a move to
//! get a fresh state, list the droppable columns, and ask who (if anyone) has
//! won. [`crate::position::Position`] is the Connect-Four implementation.

use std::fmt;

/// One of the two players.
///
/// `A` owns the `+1` cells of the caller-facing grid and `B` the `-1` cells.
/// When both sides have the same number of discs, `A` is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Grid value used for this side's discs.
    #[inline]
    pub fn cell_value(self) -> i8 {
        match self {
            Side::A => 1,
            Side::B => -1,
        }
    }

    /// Side owning a grid value, or `None` for empty (and invalid) values.
    #[inline]
    pub fn from_cell(value: i8) -> Option<Side> {
        match value {
            1 => Some(Side::A),
            -1 => Some(Side::B),
            _ => None,
        }
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

/// Result of a game position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Draw,
    Win(Side),
}

impl Outcome {
    /// Reward of this outcome seen from `side`: `+1` win, `-1` loss, `0` otherwise.
    pub fn reward_for(self, side: Side) -> f64 {
        match self {
            Outcome::Win(winner) if winner == side => 1.0,
            Outcome::Win(_) => -1.0,
            Outcome::Draw | Outcome::Ongoing => 0.0,
        }
    }
}

/// An immutable two-player drop-game snapshot.
///
/// Implementations must never mutate the receiver in [`GameState::transition`];
/// every derived state is an independent value.
pub trait GameState: Clone {
    /// Side whose turn it is.
    fn side_to_move(&self) -> Side;

    /// Winner, draw, or ongoing.
    fn outcome(&self) -> Outcome;

    /// Columns that can still take a disc, in ascending order.
    /// Empty once the game is over.
    fn legal_columns(&self) -> Vec<usize>;

    /// Drop a disc for the side to move in `column` and pass the turn.
    /// `column` must be one of [`GameState::legal_columns`].
    fn transition(&self, column: usize) -> Self;

    /// Same discs, different side to move. Used to ask "what if the
    /// opponent played here" questions.
    fn with_side_to_move(&self, side: Side) -> Self;

    /// Fraction of cells already filled, in `[0, 1]`.
    fn progress(&self) -> f64;

    /// Number of cells on the board. Bounds the length of any game.
    fn cell_count(&self) -> usize;

    /// Row (counted from the bottom, starting at 1) a disc dropped in
    /// `column` would land on, or `None` if the column is full.
    fn landing_height(&self, column: usize) -> Option<usize>;

    #[inline]
    fn is_terminal(&self) -> bool {
        self.outcome() != Outcome::Ongoing
    }
}
