//! Monte Carlo playouts (guided random game simulation).
//!
//! A playout plays the game forward from a tree node and scores the result.
//! Moves are not uniformly random: the side to move takes an immediate win
//! if it has one, otherwise blocks the opponent's immediate win, and only
//! then picks a random legal column.
//!
//! A playout that reaches the depth limit without a result scores `0`, the
//! same as a draw. This truncation is part of the contract: it keeps long,
//! undecided lines from adding noise in either direction.

use fastrand::Rng;

use crate::state::{GameState, Side};
use crate::tactics::first_winning_column;

/// Pick the playout move for the side to move in `state`.
fn choose_move<S: GameState>(state: &S, legal: &[usize], rng: &mut Rng) -> usize {
    let mover = state.side_to_move();
    first_winning_column(state, mover, legal)
        .or_else(|| first_winning_column(state, mover.opponent(), legal))
        .unwrap_or_else(|| legal[rng.usize(..legal.len())])
}

/// Play out `state` and return the result for `perspective`:
/// `+1` win, `-1` loss, `0` draw or depth limit reached.
///
/// `depth_limit` counts plies played inside the playout.
pub fn rollout<S: GameState>(
    state: &S,
    perspective: Side,
    depth_limit: usize,
    rng: &mut Rng,
) -> f64 {
    let mut state = state.clone();
    let mut depth = 0;

    loop {
        if state.is_terminal() {
            return state.outcome().reward_for(perspective);
        }
        if depth >= depth_limit {
            return 0.0;
        }

        let legal = state.legal_columns();
        if legal.is_empty() {
            return 0.0;
        }

        let col = choose_move(&state, &legal, rng);
        state = state.transition(col);
        depth += 1;
    }
}
