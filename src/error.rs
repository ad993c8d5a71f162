//! Errors reported at the engine boundary.
//!
//! Everything in here is detected before any search work starts. Running out
//! of budget, finding no tactical shortcut or having no legal move are not
//! errors; those resolve to a column through the documented fallbacks.

use thiserror::Error;

/// Validation failures for boards and engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("board must have {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row} must have {expected} columns, got {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cell ({row}, {col}) holds {value}, expected -1, 0 or 1")]
    InvalidCell { row: usize, col: usize, value: i64 },

    #[error("disc at ({row}, {col}) is floating above an empty cell")]
    FloatingDisc { row: usize, col: usize },

    #[error("unrecognized board character {0:?}")]
    InvalidSymbol(char),

    #[error("no search budget: set an iteration budget or a time budget")]
    MissingBudget,

    #[error("invalid engine option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },
}
