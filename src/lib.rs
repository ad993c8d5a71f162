//! Drop4-MCTS: a Monte Carlo Tree Search engine for Connect Four.
//!
//! Given a board snapshot, the engine infers whose turn it is and picks a
//! column. Forced wins and blocks are played directly; otherwise a fresh
//! UCB1 search tree is grown under an iteration and/or time budget.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`state`] - The game-state trait the search is written against
//! - [`position`] - Connect-Four rules (moves, gravity, wins)
//! - [`board`] - Caller-facing grid and its validation
//! - [`config`] - Engine options
//! - [`tactics`] - Immediate win/block and double-threat detection
//! - [`heuristics`] - Static column scores for root candidate ranking
//! - [`mcts`] - Search tree, selection, expansion, backpropagation
//! - [`playout`] - Guided random game simulation
//! - [`budget`] - Iteration, deadline and early-stop control
//! - [`engine`] - The `decide` entry point
//! - [`protocol`] - Text protocol front end
//!
//! ## Example
//!
//! ```
//! use drop4_mcts::board::Board;
//! use drop4_mcts::config::EngineConfig;
//! use drop4_mcts::engine::decide;
//!
//! let board = Board::empty();
//! let config = EngineConfig::default().with_iterations(200).with_seed(1);
//! let decision = decide(&board, &config).unwrap();
//! assert!(decision.column < 7);
//! ```

pub mod board;
pub mod budget;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod protocol;
pub mod state;
pub mod tactics;
