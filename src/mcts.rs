//! Monte Carlo Tree Search (MCTS) with UCB1 selection.
//!
//! This module implements the search tree and the four phases of an
//! iteration:
//! - Selection: UCB1, optionally with a phase-adaptive exploration constant
//! - Expansion: one child per iteration, wins and urgent blocks first
//! - Simulation: see [`crate::playout`]
//! - Backpropagation: sign-alternating statistics update up to the root
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other by
//! [`NodeId`]. The parent link is only used to walk upward; the whole tree is
//! dropped at once when the decision returns.

use fastrand::Rng;
use tracing::trace;

use crate::budget::{Budget, StopReason};
use crate::config::EngineConfig;
use crate::constants::{
    ACTION_EPSILON, DEFAULT_COLUMN, ENDGAME_EXPLORATION_FACTOR, ENDGAME_PROGRESS,
    OPENING_EXPLORATION_FACTOR, OPENING_PROGRESS, REPORT_PERIOD,
};
use crate::playout::rollout;
use crate::state::GameState;
use crate::tactics::wins_with;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A node in the MCTS search tree: one ply of the game.
#[derive(Debug, Clone)]
pub struct Node<S> {
    /// The game state reached at this node
    pub state: S,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    /// Column played from the parent to get here (None for the root)
    pub action: Option<usize>,
    /// Expanded children as (column, node) in creation order
    pub children: Vec<(usize, NodeId)>,
    /// Number of backpropagation passes through this node
    pub visits: u32,
    /// Sum of the rewards those passes brought
    pub total_reward: f64,
    /// Legal columns not yet expanded
    pub pending: Vec<usize>,
}

impl<S: GameState> Node<S> {
    fn new(state: S, parent: Option<NodeId>, action: Option<usize>) -> Self {
        let pending = state.legal_columns();
        Self {
            state,
            parent,
            action,
            children: Vec::new(),
            visits: 0,
            total_reward: 0.0,
            pending,
        }
    }
}

impl<S> Node<S> {
    /// Average reward, 0 for an unvisited node.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.visits > 0 {
            self.total_reward / self.visits as f64
        } else {
            0.0
        }
    }

    /// Child reached by `column`, if expanded.
    pub fn child(&self, column: usize) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(col, _)| *col == column)
            .map(|&(_, id)| id)
    }
}

/// Arena-backed search tree. The root is always `NodeId(0)`.
#[derive(Debug)]
pub struct Tree<S> {
    nodes: Vec<Node<S>>,
}

impl<S: GameState> Tree<S> {
    /// Fresh tree whose root may expand every legal column.
    pub fn new(root_state: S) -> Self {
        Self {
            nodes: vec![Node::new(root_state, None, None)],
        }
    }

    /// Fresh tree whose root may only expand `candidates`.
    pub fn with_root_candidates(root_state: S, candidates: Vec<usize>) -> Self {
        let mut tree = Self::new(root_state);
        debug_assert!(
            candidates.iter().all(|c| tree.nodes[0].pending.contains(c)),
            "root candidates must be legal"
        );
        tree.nodes[0].pending = candidates;
        tree
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Plies between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.get(id).parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.get(parent).parent;
        }
        depth
    }

    /// Create the child of `parent` reached by `column`.
    ///
    /// `column` moves from the parent's pending list into its children.
    pub fn add_child(&mut self, parent: NodeId, column: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let node = self.get_mut(parent);

        let slot = node.pending.iter().position(|&c| c == column);
        debug_assert!(slot.is_some(), "column {column} is not pending");
        debug_assert!(node.child(column).is_none(), "column {column} already expanded");
        if let Some(slot) = slot {
            node.pending.remove(slot);
        }
        node.children.push((column, id));

        let state = node.state.transition(column);
        self.nodes.push(Node::new(state, Some(parent), Some(column)));
        id
    }

    /// Check the structural invariants: unique child keys, no column both
    /// pending and expanded, parent links matching child lists, parents
    /// allocated before children (so no cycles), and visit counts that
    /// cover the children's.
    pub fn is_consistent(&self) -> bool {
        self.nodes.iter().enumerate().all(|(idx, node)| {
            let mut keys: Vec<usize> = node.children.iter().map(|&(c, _)| c).collect();
            keys.sort_unstable();
            keys.dedup();
            let child_visits: u64 = node
                .children
                .iter()
                .map(|&(_, id)| self.get(id).visits as u64)
                .sum();

            keys.len() == node.children.len()
                && node.children.iter().all(|&(col, id)| {
                    let child = self.get(id);
                    child.parent == Some(NodeId(idx as u32))
                        && child.action == Some(col)
                        && (id.0 as usize) > idx
                        && !node.pending.contains(&col)
                })
                && node.visits as u64 >= child_visits
        })
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Exploration constant for a node, scaled by game phase when adaptive
/// exploration is on.
pub fn exploration_for<S: GameState>(config: &EngineConfig, state: &S) -> f64 {
    let c = config.exploration_constant;
    if !config.adaptive_exploration {
        return c;
    }
    let progress = state.progress();
    if progress < OPENING_PROGRESS {
        c * OPENING_EXPLORATION_FACTOR
    } else if progress < ENDGAME_PROGRESS {
        c
    } else {
        c * ENDGAME_EXPLORATION_FACTOR
    }
}

/// UCB1 score `Q + C * sqrt(ln(N_parent + 1) / (N_child + 1))`.
#[inline]
pub fn ucb1(mean: f64, c: f64, parent_visits: u32, child_visits: u32) -> f64 {
    mean + c * ((parent_visits as f64 + 1.0).ln() / (child_visits as f64 + 1.0)).sqrt()
}

/// Pick a child of `id`.
///
/// Unvisited children come first, uniformly at random. Otherwise the UCB1
/// maximum wins; on equal scores the earliest created child is kept.
pub fn select_child<S: GameState>(
    tree: &Tree<S>,
    id: NodeId,
    c: f64,
    rng: &mut Rng,
) -> Option<NodeId> {
    let node = tree.get(id);

    let unvisited: Vec<NodeId> = node
        .children
        .iter()
        .map(|&(_, child)| child)
        .filter(|&child| tree.get(child).visits == 0)
        .collect();
    if !unvisited.is_empty() {
        return Some(unvisited[rng.usize(..unvisited.len())]);
    }

    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for &(_, child_id) in &node.children {
        let child = tree.get(child_id);
        let score = ucb1(child.mean(), c, node.visits, child.visits);
        if score > best_score {
            best_score = score;
            best = Some(child_id);
        }
    }
    best
}

/// Descend from the root through fully expanded, non-terminal nodes.
fn select_leaf<S: GameState>(tree: &Tree<S>, config: &EngineConfig, rng: &mut Rng) -> NodeId {
    let mut id = tree.root();
    loop {
        let node = tree.get(id);
        if node.state.is_terminal() || !node.pending.is_empty() || node.children.is_empty() {
            return id;
        }
        let c = exploration_for(config, &node.state);
        match select_child(tree, id, c, rng) {
            Some(child) => id = child,
            None => return id,
        }
    }
}

// =============================================================================
// Expansion
// =============================================================================

/// Expand one pending column of `id` and return the new child.
///
/// The pending columns are shuffled, then the first that wins for the side
/// to move is taken; failing that, the first the opponent would win on;
/// failing that, the first in shuffled order. Returns `id` itself if
/// nothing is pending.
pub fn expand<S: GameState>(tree: &mut Tree<S>, id: NodeId, rng: &mut Rng) -> NodeId {
    let node = tree.get(id);
    if node.pending.is_empty() {
        return id;
    }

    let mut order = node.pending.clone();
    rng.shuffle(&mut order);

    let mover = node.state.side_to_move();
    let column = order
        .iter()
        .copied()
        .find(|&col| wins_with(&node.state, mover, col))
        .or_else(|| {
            order
                .iter()
                .copied()
                .find(|&col| wins_with(&node.state, mover.opponent(), col))
        })
        .unwrap_or(order[0]);

    tree.add_child(id, column)
}

// =============================================================================
// Backpropagation
// =============================================================================

/// Add `reward` to `id` and every ancestor, negating it at each step up.
pub fn backpropagate<S: GameState>(tree: &mut Tree<S>, id: NodeId, mut reward: f64) {
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let node = tree.get_mut(current);
        node.visits += 1;
        node.total_reward += reward;
        reward = -reward;
        cursor = node.parent;
    }
}

// =============================================================================
// Search loop
// =============================================================================

/// Outcome of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Completed select/expand/simulate/backpropagate passes
    pub iterations: u32,
    /// What ended the search
    pub stop: StopReason,
}

/// Best average among visited root children.
fn best_root_mean<S: GameState>(tree: &Tree<S>) -> Option<f64> {
    tree.get(tree.root())
        .children
        .iter()
        .map(|&(_, id)| tree.get(id))
        .filter(|child| child.visits > 0)
        .map(|child| child.mean())
        .reduce(f64::max)
}

/// Run iterations until the budget says stop.
///
/// A rollout reward is measured for the decision-root player and then
/// oriented so that every node's statistics read from the side that moved
/// into it: unchanged at odd depths, negated at even depths.
pub fn tree_search<S: GameState>(
    tree: &mut Tree<S>,
    config: &EngineConfig,
    budget: &Budget,
    rng: &mut Rng,
) -> SearchStats {
    let root_side = tree.get(tree.root()).state.side_to_move();
    let depth_limit = config
        .rollout_depth_limit
        .unwrap_or_else(|| tree.get(tree.root()).state.cell_count());

    let mut iterations = 0u32;
    let stop = loop {
        if let Some(reason) = budget.exhausted(iterations) {
            break reason;
        }

        let leaf = select_leaf(tree, config, rng);
        let node = if tree.get(leaf).state.is_terminal() {
            leaf
        } else {
            expand(tree, leaf, rng)
        };

        let reward = rollout(&tree.get(node).state, root_side, depth_limit, rng);
        let reward = if tree.depth(node) % 2 == 1 { reward } else { -reward };
        backpropagate(tree, node, reward);
        iterations += 1;

        if iterations % REPORT_PERIOD == 0 {
            trace!(
                iterations,
                nodes = tree.len(),
                best_mean = best_root_mean(tree).unwrap_or(0.0),
                remaining = ?budget.remaining(),
                "search progress"
            );
        }

        if budget.confident(iterations, best_root_mean(tree)) {
            break StopReason::EarlyStop;
        }
    };

    debug_assert!(tree.is_consistent(), "search tree invariants violated");
    SearchStats { iterations, stop }
}

// =============================================================================
// Final action
// =============================================================================

/// Statistics of one root child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub column: usize,
    pub visits: u32,
    pub mean: f64,
}

/// Visits and average reward of every root child, in creation order.
pub fn root_children<S: GameState>(tree: &Tree<S>) -> Vec<ChildStats> {
    tree.get(tree.root())
        .children
        .iter()
        .map(|&(column, id)| {
            let child = tree.get(id);
            ChildStats {
                column,
                visits: child.visits,
                mean: child.mean(),
            }
        })
        .collect()
}

/// Robust score `(max(Q, 0) + eps) * (N + 1)` of a root child.
#[inline]
pub fn action_score(mean: f64, visits: u32) -> f64 {
    (mean.max(0.0) + ACTION_EPSILON) * (visits as f64 + 1.0)
}

/// Choose the column to play from the root's children.
///
/// Only children whose column is still legal at the root are considered.
/// The highest [`action_score`] wins (earliest child on ties); failing that,
/// the most visited legal child; failing that, a random legal column. With
/// no legal column at all, [`DEFAULT_COLUMN`].
pub fn choose_action<S: GameState>(tree: &Tree<S>, rng: &mut Rng) -> usize {
    let root = tree.get(tree.root());
    let legal = root.state.legal_columns();
    if legal.is_empty() {
        return DEFAULT_COLUMN;
    }

    let eligible: Vec<ChildStats> = root_children(tree)
        .into_iter()
        .filter(|child| legal.contains(&child.column))
        .collect();

    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for child in &eligible {
        let score = action_score(child.mean, child.visits);
        if score > best_score {
            best_score = score;
            best = Some(child.column);
        }
    }

    best.or_else(|| {
        eligible
            .iter()
            .max_by_key(|child| child.visits)
            .map(|child| child.column)
    })
    .unwrap_or_else(|| legal[rng.usize(..legal.len())])
}
