//! One- and two-ply tactical lookahead.
//!
//! The root filter runs once per decision before any tree search:
//! 1. play an immediate win if there is one
//! 2. otherwise occupy the cell the opponent would win on
//! 3. otherwise drop the columns that leave the opponent two winning replies
//!
//! The one-ply helpers are shared with the expander and the rollout policy.

use crate::state::{GameState, Outcome, Side};

/// A move found without searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Playing this column wins on the spot.
    Win(usize),
    /// The opponent would win by playing this column next.
    Block(usize),
}

impl Shortcut {
    pub fn column(self) -> usize {
        match self {
            Shortcut::Win(col) | Shortcut::Block(col) => col,
        }
    }
}

/// Whether `side` dropping a disc in `column` wins immediately.
///
/// The disc is placed as if `side` were to move, whoever actually is.
#[inline]
pub fn wins_with<S: GameState>(state: &S, side: Side, column: usize) -> bool {
    let probe = if state.side_to_move() == side {
        state.transition(column)
    } else {
        state.with_side_to_move(side).transition(column)
    };
    probe.outcome() == Outcome::Win(side)
}

/// First column (ascending) from `columns` on which `side` wins immediately.
pub fn first_winning_column<S: GameState>(
    state: &S,
    side: Side,
    columns: &[usize],
) -> Option<usize> {
    columns.iter().copied().find(|&col| wins_with(state, side, col))
}

/// Immediate win for the side to move, scanning columns in ascending order.
pub fn immediate_win<S: GameState>(state: &S) -> Option<usize> {
    first_winning_column(state, state.side_to_move(), &state.legal_columns())
}

/// Column the opponent would win on if it were their turn, ascending order.
pub fn immediate_block<S: GameState>(state: &S) -> Option<usize> {
    first_winning_column(state, state.side_to_move().opponent(), &state.legal_columns())
}

/// Number of replies after `column` that hand the opponent the game.
fn losing_replies<S: GameState>(state: &S, column: usize) -> usize {
    let opponent = state.side_to_move().opponent();
    let next = state.transition(column);
    next.legal_columns()
        .into_iter()
        .filter(|&reply| wins_with(&next, opponent, reply))
        .take(2)
        .count()
}

/// Columns after which the opponent has two or more winning replies.
pub fn double_threat_columns<S: GameState>(state: &S) -> Vec<usize> {
    state
        .legal_columns()
        .into_iter()
        .filter(|&col| losing_replies(state, col) >= 2)
        .collect()
}

/// Legal columns minus the double-threat ones, or every legal column if
/// nothing would be left. The double-threat columns come back as well.
pub fn safe_columns<S: GameState>(state: &S) -> (Vec<usize>, Vec<usize>) {
    let legal = state.legal_columns();
    let unsafe_cols = double_threat_columns(state);
    let safe: Vec<usize> = legal
        .iter()
        .copied()
        .filter(|col| !unsafe_cols.contains(col))
        .collect();
    if safe.is_empty() {
        (legal, unsafe_cols)
    } else {
        (safe, unsafe_cols)
    }
}

/// Win first, block second, else nothing.
pub fn short_circuit<S: GameState>(state: &S) -> Option<Shortcut> {
    if let Some(col) = immediate_win(state) {
        return Some(Shortcut::Win(col));
    }
    immediate_block(state).map(Shortcut::Block)
}
