//! End-to-end tests for `decide`.
//!
//! Boards are written top row first, `X` for side A, `O` for side B.

use std::time::Duration;

use drop4_mcts::board::Board;
use drop4_mcts::budget::StopReason;
use drop4_mcts::config::EngineConfig;
use drop4_mcts::constants::{COLS, DEFAULT_COLUMN};
use drop4_mcts::engine::{DecisionSource, decide, decide_with_rng};
use drop4_mcts::error::EngineError;
use drop4_mcts::position::Position;
use drop4_mcts::state::{GameState, Outcome, Side};

// =============================================================================
// Helper functions
// =============================================================================

fn board(text: &str) -> Board {
    text.parse().expect("test board should parse")
}

/// Play a column sequence from the empty grid.
fn replay(moves: &[usize]) -> Position {
    moves.iter().fold(Position::new(), |pos, &col| {
        pos.play(col).expect("test sequence should be legal")
    })
}

fn quick_config(seed: u64) -> EngineConfig {
    EngineConfig::default().with_iterations(200).with_seed(seed)
}

/// A game that fills the grid without four in a row.
const DRAWN_GAME: [usize; 42] = [
    1, 4, 6, 6, 6, 0, 2, 0, 3, 6, 3, 3, 5, 3, 6, 1, 0, 3, 0, 4, 3, 5, 0, 6, 5, 2, 2, 5, 1, 2, 2,
    0, 2, 5, 4, 5, 4, 4, 4, 1, 1, 1,
];

// =============================================================================
// Basic decisions
// =============================================================================

#[test]
fn test_empty_board_returns_legal_column() {
    let decision = decide(&Board::empty(), &quick_config(1)).unwrap();
    assert!(decision.column < COLS, "column {} out of range", decision.column);
    assert_eq!(decision.source, DecisionSource::Search);
    assert_eq!(decision.iterations, 200);
}

#[test]
fn test_takes_winning_column() {
    let b = board(
        ". . . . . . .
         . . . . . . .
         . . . . . . .
         . . . . . . .
         . . . . . . .
         X X X . O O O",
    );
    assert_eq!(b.side_to_move(), Side::A);

    for seed in 0..5 {
        let config = EngineConfig::default()
            .with_iterations(1)
            .with_exploration(0.0)
            .with_seed(seed);
        let decision = decide(&b, &config).unwrap();
        assert_eq!(decision.column, 3, "side A must complete the bottom row");
        assert_eq!(decision.source, DecisionSource::ImmediateWin);
        assert_eq!(decision.iterations, 0);
    }
}

#[test]
fn test_side_b_takes_its_own_win() {
    let b = board(
        ". . . . . . .
         . . . . . . .
         . . . . . . .
         . . . . . . .
         X . . . . . .
         X X X . O O O",
    );
    assert_eq!(b.side_to_move(), Side::B);

    let decision = decide(&b, &quick_config(2)).unwrap();
    assert_eq!(decision.column, 3);
    assert_eq!(decision.source, DecisionSource::ImmediateWin);
}

#[test]
fn test_blocks_opponent_threat() {
    let b = board(
        ". . . . . . .
         . . . . . . .
         . . . . . . .
         . . . . . O .
         . . . . . O .
         X . X . . O X",
    );
    assert_eq!(b.side_to_move(), Side::A);

    let decision = decide(&b, &quick_config(3)).unwrap();
    assert_eq!(decision.column, 5, "side A must cap the vertical three");
    assert_eq!(decision.source, DecisionSource::ImmediateBlock);
}

#[test]
fn test_full_board_returns_default_column() {
    let pos = replay(&DRAWN_GAME);
    assert_eq!(pos.outcome(), Outcome::Draw);

    let decision = decide(&Board::from(&pos), &quick_config(4)).unwrap();
    assert_eq!(decision.column, DEFAULT_COLUMN);
    assert_eq!(decision.source, DecisionSource::NoLegalMove);
    assert_eq!(decision.nodes, 0);
}

#[test]
fn test_won_board_returns_default_column() {
    let b = board(
        ". . . . . . .
         . . . . . . .
         . . . . . . .
         . . . . . . .
         . O O O . . .
         X X X X . . .",
    );
    let decision = decide(&b, &quick_config(5)).unwrap();
    assert_eq!(decision.column, DEFAULT_COLUMN);
    assert_eq!(decision.source, DecisionSource::NoLegalMove);
}

// =============================================================================
// Budgets
// =============================================================================

#[test]
fn test_iteration_budget_is_exact() {
    for n in [1, 7, 150] {
        let config = EngineConfig::default().with_iterations(n).with_seed(6);
        let decision = decide(&Board::empty(), &config).unwrap();
        assert_eq!(decision.iterations, n);
        assert_eq!(decision.root_visits, n);
        assert_eq!(decision.stop, Some(StopReason::Iterations));
        let child_visits: u32 = decision.children.iter().map(|c| c.visits).sum();
        assert_eq!(child_visits, n, "every iteration passes through one root child");
    }
}

#[test]
fn test_deadline_only_budget() {
    let config = EngineConfig::with_deadline(0.05).with_seed(7);
    let decision = decide(&Board::empty(), &config).unwrap();

    assert_eq!(decision.stop, Some(StopReason::Deadline));
    assert!(decision.iterations > 0);
    assert!(
        decision.elapsed < Duration::from_secs(1),
        "search overran its deadline: {:?}",
        decision.elapsed
    );
}

#[test]
fn test_iterations_stop_before_generous_deadline() {
    let config = EngineConfig::default()
        .with_iterations(20)
        .with_time_budget(30.0)
        .with_seed(8);
    let decision = decide(&Board::empty(), &config).unwrap();
    assert_eq!(decision.iterations, 20);
    assert_eq!(decision.stop, Some(StopReason::Iterations));
}

#[test]
fn test_missing_budget_is_rejected() {
    let config = EngineConfig {
        iteration_budget: None,
        time_budget_seconds: None,
        ..EngineConfig::default()
    };
    assert_eq!(
        decide(&Board::empty(), &config),
        Err(EngineError::MissingBudget)
    );
}

#[test]
fn test_huge_time_budgets_do_not_panic() {
    let config = EngineConfig::default()
        .with_iterations(10)
        .with_time_budget(1e19)
        .with_seed(14);
    let decision = decide(&Board::empty(), &config).unwrap();
    assert_eq!(decision.iterations, 10);
    assert_eq!(decision.stop, Some(StopReason::Iterations));

    let too_long = EngineConfig::default()
        .with_iterations(10)
        .with_time_budget(1e20);
    assert!(matches!(
        decide(&Board::empty(), &too_long),
        Err(EngineError::InvalidOption {
            option: "timeBudgetSeconds",
            ..
        })
    ));
}

#[test]
fn test_early_stop_respects_minimum_and_budget() {
    let config = EngineConfig::default()
        .with_iterations(2000)
        .with_early_stop(0.5)
        .with_seed(9);
    let decision = decide(&Board::empty(), &config).unwrap();

    assert!(decision.iterations <= 2000);
    if decision.stop == Some(StopReason::EarlyStop) {
        assert!(decision.iterations >= config.early_stop_min_iterations);
        let best = decision
            .children
            .iter()
            .filter(|c| c.visits > 0)
            .map(|c| c.mean)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(best > 0.5, "early stop fired with best mean {best}");
    } else {
        assert_eq!(decision.iterations, 2000);
    }
}

// =============================================================================
// Determinism and options
// =============================================================================

#[test]
fn test_same_seed_same_decision() {
    let b = board(
        ". . . . . . .
         . . . . . . .
         . . . . . . .
         . . . X . . .
         . . . O O . .
         . . X X O . .",
    );
    let config = quick_config(42);
    let first = decide(&b, &config).unwrap();
    let second = decide(&b, &config).unwrap();

    assert_eq!(first.column, second.column);
    assert_eq!(first.children, second.children);
    assert_eq!(first.nodes, second.nodes);
}

#[test]
fn test_shared_rng_keeps_working_across_calls() {
    let config = EngineConfig::default().with_iterations(50);
    let mut rng = fastrand::Rng::with_seed(10);
    for _ in 0..3 {
        let decision = decide_with_rng(&Board::empty(), &config, &mut rng).unwrap();
        assert!(decision.column < COLS);
    }
}

#[test]
fn test_adaptive_exploration_and_depth_limit() {
    let config = quick_config(11)
        .with_adaptive_exploration(true)
        .with_rollout_depth(4);
    let decision = decide(&Board::empty(), &config).unwrap();
    assert!(decision.column < COLS);
    assert_eq!(decision.iterations, 200);
    for child in &decision.children {
        assert!((-1.0..=1.0).contains(&child.mean));
    }
}

#[test]
fn test_root_candidate_limit_restricts_search() {
    let config = quick_config(12).with_root_candidate_limit(3);
    let decision = decide(&Board::empty(), &config).unwrap();

    let mut searched: Vec<usize> = decision.children.iter().map(|c| c.column).collect();
    searched.sort_unstable();
    assert_eq!(searched, vec![2, 3, 4], "only the central columns are searched");
    assert!((2..=4).contains(&decision.column));
}

// =============================================================================
// Malformed input
// =============================================================================

#[test]
fn test_rejects_wrong_row_count() {
    let rows = vec![vec![0i32; 7]; 5];
    assert_eq!(
        Board::from_rows(&rows),
        Err(EngineError::RowCount {
            expected: 6,
            actual: 5
        })
    );
}

#[test]
fn test_rejects_wrong_column_count() {
    let mut rows = vec![vec![0i32; 7]; 6];
    rows[2] = vec![0; 8];
    assert!(matches!(
        Board::from_rows(&rows),
        Err(EngineError::ColumnCount { row: 2, .. })
    ));
}

#[test]
fn test_rejects_bad_cell_value() {
    let mut rows = vec![vec![0i32; 7]; 6];
    rows[5][3] = 2;
    assert!(matches!(
        Board::from_rows(&rows),
        Err(EngineError::InvalidCell { value: 2, .. })
    ));
}

#[test]
fn test_rejects_floating_disc() {
    let b = board(
        ". . . . . . .
         . . . . . . .
         . . . . . . .
         . . . X . . .
         . . . . . . .
         . . . O . . .",
    );
    assert!(matches!(
        decide(&b, &quick_config(13)),
        Err(EngineError::FloatingDisc { col: 3, .. })
    ));
}

// =============================================================================
// Legality over many positions
// =============================================================================

#[test]
fn test_decisions_are_always_legal() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let config = EngineConfig::default().with_iterations(30);

    for game in 0..20 {
        let mut pos = Position::new();
        let plies = rng.usize(0..30);
        for _ in 0..plies {
            let legal = pos.legal_columns();
            if legal.is_empty() {
                break;
            }
            pos = pos.play(legal[rng.usize(..legal.len())]).unwrap();
        }

        let decision = decide_with_rng(&Board::from(&pos), &config, &mut rng).unwrap();
        let legal = pos.legal_columns();
        if legal.is_empty() {
            assert_eq!(decision.column, DEFAULT_COLUMN);
        } else {
            assert!(
                legal.contains(&decision.column),
                "game {game}: column {} not in {legal:?}",
                decision.column
            );
        }
    }
}

#[test]
fn test_selfplay_game_terminates() {
    let config = EngineConfig::default().with_iterations(40).with_seed(99);
    let mut rng = config.rng();
    let mut pos = Position::new();
    let mut plies = 0;

    while !pos.is_terminal() {
        let decision = decide_with_rng(&Board::from(&pos), &config, &mut rng).unwrap();
        pos = pos.play(decision.column).unwrap();
        plies += 1;
        assert!(plies <= 42);
    }
    assert_ne!(pos.outcome(), Outcome::Ongoing);
}
