//! Static column scoring for the root candidate set.
//!
//! When a root candidate limit is configured, the columns surviving the
//! tactical filter are scored and only the best few are searched. A score
//! adds up:
//! - distance from the centre column (negative)
//! - a parity bonus: the side that moves first on an empty board wants its
//!   discs on odd rows counted from the bottom, the other side on even rows
//! - +1 for every immediate win the mover would have next turn
//! - -1 for every immediate win handed to the opponent
//! - a fixed penalty for columns that hand the opponent a double threat

use crate::constants::{CENTER_COLUMN, DOUBLE_THREAT_PENALTY, FULL_COLUMN_PENALTY, PARITY_BONUS};
use crate::state::{GameState, Side};
use crate::tactics::wins_with;

/// Penalty by distance from the centre column.
#[inline]
pub fn center_score(column: usize) -> f64 {
    -(column.abs_diff(CENTER_COLUMN) as f64)
}

/// Parity preference of `side` for the cell `column` would fill.
pub fn parity_score<S: GameState>(state: &S, column: usize, side: Side) -> f64 {
    let Some(height) = state.landing_height(column) else {
        return FULL_COLUMN_PENALTY;
    };
    let wants_odd = side == Side::A;
    if (height % 2 == 1) == wants_odd {
        PARITY_BONUS
    } else {
        0.0
    }
}

/// Threats created minus threats conceded by playing `column`.
fn threat_balance<S: GameState>(state: &S, column: usize) -> f64 {
    let me = state.side_to_move();
    let next = state.transition(column);
    let replies = next.legal_columns();

    let mine = replies
        .iter()
        .filter(|&&col| wins_with(&next, me, col))
        .count();
    let theirs = replies
        .iter()
        .filter(|&&col| wins_with(&next, me.opponent(), col))
        .count();

    mine as f64 - theirs as f64
}

/// Full heuristic score of `column` for the side to move.
pub fn score_column<S: GameState>(state: &S, column: usize, double_threats: &[usize]) -> f64 {
    let mut score = center_score(column);
    score += parity_score(state, column, state.side_to_move());
    score += threat_balance(state, column);
    if double_threats.contains(&column) {
        score -= DOUBLE_THREAT_PENALTY;
    }
    score
}

/// Keep the `limit` best-scoring `candidates`. Equal scores keep their
/// incoming order.
pub fn rank_candidates<S: GameState>(
    state: &S,
    candidates: &[usize],
    double_threats: &[usize],
    limit: usize,
) -> Vec<usize> {
    let mut scored: Vec<(f64, usize)> = candidates
        .iter()
        .map(|&col| (score_column(state, col, double_threats), col))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, col)| col).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::position::Position;

    #[test]
    fn test_center_score() {
        assert_eq!(center_score(3), 0.0);
        assert_eq!(center_score(0), -3.0);
        assert_eq!(center_score(6), -3.0);
        assert_eq!(center_score(4), -1.0);
    }

    #[test]
    fn test_parity_on_empty_board() {
        let pos = Position::new();
        // every landing row is row 1 (odd)
        assert_eq!(parity_score(&pos, 2, Side::A), PARITY_BONUS);
        assert_eq!(parity_score(&pos, 2, Side::B), 0.0);
    }

    #[test]
    fn test_parity_full_column() {
        let pos = (0..6).fold(Position::new(), |pos, _| pos.play(0).unwrap());
        assert_eq!(parity_score(&pos, 0, Side::A), FULL_COLUMN_PENALTY);
    }

    #[test]
    fn test_rank_prefers_center_on_empty_board() {
        let pos = Position::new();
        let ranked = rank_candidates(&pos, &pos.legal_columns(), &[], 3);
        assert_eq!(ranked, vec![3, 2, 4]);
    }

    #[test]
    fn test_rank_penalizes_conceding_a_win() {
        // A to move; playing column 4 puts a disc under B's winning cell
        // (row 4, col 4).
        let board: Board = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . O O O . . .
            . X O X . . ."
            .parse()
            .unwrap();
        let pos = Position::from_board(&board).unwrap();
        let conceding = score_column(&pos, 4, &[]);
        let quiet = score_column(&pos, 2, &[]);
        assert!(conceding < quiet, "{conceding} should be below {quiet}");
    }

    #[test]
    fn test_double_threat_penalty_applies() {
        let pos = Position::new();
        let plain = score_column(&pos, 3, &[]);
        let flagged = score_column(&pos, 3, &[3]);
        assert_eq!(plain - flagged, DOUBLE_THREAT_PENALTY);
    }
}
