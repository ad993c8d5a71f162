//! Constants for board geometry and MCTS parameters.
//!
//! The board is a fixed gravity grid. Rows are numbered from the top
//! (row 0) to the bottom (row `ROWS - 1`); discs settle on the lowest
//! empty cell of their column.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows in the grid.
pub const ROWS: usize = 6;

/// Number of columns in the grid.
pub const COLS: usize = 7;

/// Total number of cells.
pub const CELLS: usize = ROWS * COLS;

/// Discs in a line needed to win.
pub const CONNECT: usize = 4;

/// Column returned when the position offers no legal move at all.
pub const DEFAULT_COLUMN: usize = 0;

/// Cell value for an empty cell in the caller-facing grid.
pub const EMPTY_CELL: i8 = 0;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default UCB1 exploration constant.
pub const EXPLORATION_C: f64 = 1.4;

/// Default number of iterations per decision.
pub const N_ITERATIONS: u32 = 1000;

/// Exploration multiplier in the opening (progress < `OPENING_PROGRESS`).
pub const OPENING_EXPLORATION_FACTOR: f64 = 1.3;

/// Exploration multiplier in the endgame (progress >= `ENDGAME_PROGRESS`).
pub const ENDGAME_EXPLORATION_FACTOR: f64 = 0.8;

/// Fraction of filled cells below which the game counts as an opening.
pub const OPENING_PROGRESS: f64 = 0.3;

/// Fraction of filled cells from which the game counts as an endgame.
pub const ENDGAME_PROGRESS: f64 = 0.7;

/// Iterations that must elapse before early stopping is considered.
pub const EARLY_STOP_MIN_ITERATIONS: u32 = 10;

/// Tie breaker in the final action score `(max(Q, 0) + eps) * (N + 1)`.
pub const ACTION_EPSILON: f64 = 1e-6;

/// Number of iterations between progress traces.
pub const REPORT_PERIOD: u32 = 200;

// =============================================================================
// Root Candidate Heuristics
// =============================================================================

/// Centre column used by the distance penalty.
pub const CENTER_COLUMN: usize = COLS / 2;

/// Bonus for landing on a row of the mover's preferred parity.
pub const PARITY_BONUS: f64 = 1.0;

/// Penalty for a column that is full.
pub const FULL_COLUMN_PENALTY: f64 = -1.0;

/// Penalty for a column that hands the opponent a double threat.
pub const DOUBLE_THREAT_PENALTY: f64 = 2.0;

/// Suggested root candidate limit when heuristic ranking is enabled.
pub const ROOT_CANDIDATE_LIMIT: usize = 5;
