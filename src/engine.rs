//! The decision entry point.
//!
//! [`decide`] validates its inputs, infers the side to move, tries the
//! tactical shortcuts, and otherwise runs a fresh tree search. Nothing is
//! kept between calls; everything a caller may want to know about a call is
//! in the returned [`Decision`].

use std::time::{Duration, Instant};

use fastrand::Rng;
use tracing::debug;

use crate::board::Board;
use crate::budget::{Budget, StopReason};
use crate::config::EngineConfig;
use crate::constants::DEFAULT_COLUMN;
use crate::error::EngineError;
use crate::heuristics::rank_candidates;
use crate::mcts::{ChildStats, Tree, choose_action, root_children, tree_search};
use crate::position::Position;
use crate::state::GameState;
use crate::tactics::{Shortcut, safe_columns, short_circuit};

/// How the column was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// No column could be played; the default column is returned.
    NoLegalMove,
    /// The column wins on the spot.
    ImmediateWin,
    /// The column stops the opponent's immediate win.
    ImmediateBlock,
    /// The column came out of the tree search.
    Search,
}

/// Result of one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Column to play.
    pub column: usize,
    pub source: DecisionSource,
    /// Search iterations performed (0 without a search).
    pub iterations: u32,
    /// Nodes in the search tree (0 without a search).
    pub nodes: usize,
    /// Visits of the root (0 without a search).
    pub root_visits: u32,
    /// What ended the search, if one ran.
    pub stop: Option<StopReason>,
    /// Root children statistics in expansion order.
    pub children: Vec<ChildStats>,
    pub elapsed: Duration,
}

impl Decision {
    fn immediate(column: usize, source: DecisionSource, started: Instant) -> Self {
        Self {
            column,
            source,
            iterations: 0,
            nodes: 0,
            root_visits: 0,
            stop: None,
            children: Vec::new(),
            elapsed: started.elapsed(),
        }
    }
}

/// Choose a column for `board` with a random source seeded from
/// `config.seed` (or from entropy when unset).
pub fn decide(board: &Board, config: &EngineConfig) -> Result<Decision, EngineError> {
    decide_with_rng(board, config, &mut config.rng())
}

/// Choose a column for `board` using the given random source.
///
/// Fails only on malformed input or configuration; every board that passes
/// validation gets a column.
pub fn decide_with_rng(
    board: &Board,
    config: &EngineConfig,
    rng: &mut Rng,
) -> Result<Decision, EngineError> {
    let started = Instant::now();
    config.validate()?;
    let position = Position::from_board(board)?;
    Ok(decide_state(&position, config, rng, started))
}

/// Decision core for any [`GameState`]. `started` anchors the deadline.
///
/// `config` is assumed valid.
pub fn decide_state<S: GameState>(
    state: &S,
    config: &EngineConfig,
    rng: &mut Rng,
    started: Instant,
) -> Decision {
    if state.legal_columns().is_empty() {
        debug!(column = DEFAULT_COLUMN, "no legal move");
        return Decision::immediate(DEFAULT_COLUMN, DecisionSource::NoLegalMove, started);
    }

    if let Some(shortcut) = short_circuit(state) {
        let source = match shortcut {
            Shortcut::Win(_) => DecisionSource::ImmediateWin,
            Shortcut::Block(_) => DecisionSource::ImmediateBlock,
        };
        debug!(column = shortcut.column(), ?source, "tactical shortcut");
        return Decision::immediate(shortcut.column(), source, started);
    }

    let candidates = root_candidates(state, config, rng);
    let mut tree = Tree::with_root_candidates(state.clone(), candidates);
    let budget = Budget::from_config(config, started);
    let stats = tree_search(&mut tree, config, &budget, rng);
    let column = choose_action(&tree, rng);

    let decision = Decision {
        column,
        source: DecisionSource::Search,
        iterations: stats.iterations,
        nodes: tree.len(),
        root_visits: tree.get(tree.root()).visits,
        stop: Some(stats.stop),
        children: root_children(&tree),
        elapsed: started.elapsed(),
    };
    debug!(
        column,
        iterations = decision.iterations,
        nodes = decision.nodes,
        stop = ?stats.stop,
        elapsed_ms = decision.elapsed.as_millis() as u64,
        "search finished"
    );
    decision
}

/// Root columns to search: legal minus double-threat columns (all legal if
/// that leaves nothing), optionally ranked and cut to the configured limit,
/// then shuffled.
fn root_candidates<S: GameState>(
    state: &S,
    config: &EngineConfig,
    rng: &mut Rng,
) -> Vec<usize> {
    let (mut candidates, unsafe_cols) = safe_columns(state);

    if let Some(limit) = config.root_candidate_limit {
        candidates = rank_candidates(state, &candidates, &unsafe_cols, limit);
        rng.shuffle(&mut candidates);
    }

    if !unsafe_cols.is_empty() {
        debug!(?unsafe_cols, ?candidates, "pruned double-threat columns");
    }
    candidates
}
