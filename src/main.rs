//! Drop4-MCTS command line.
//!
//! ## Usage
//!
//! - `drop4-mcts decide <board-file>` - Pick a column for a board
//! - `drop4-mcts protocol` - Start the text protocol server
//! - `drop4-mcts selfplay` - Let the engine play a full game against itself

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use drop4_mcts::board::Board;
use drop4_mcts::config::EngineConfig;
use drop4_mcts::constants::ROOT_CANDIDATE_LIMIT;
use drop4_mcts::engine::decide_with_rng;
use drop4_mcts::position::Position;
use drop4_mcts::protocol::ProtocolEngine;
use drop4_mcts::state::{GameState, Outcome};

/// Drop4-MCTS: a Monte Carlo Tree Search Connect-Four engine
#[derive(Parser)]
#[command(name = "drop4-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a column for the board in a file (`-` for stdin)
    Decide {
        /// Grid text: one row per line, top row first, X / O / .
        board: PathBuf,
    },
    /// Start the line protocol server on stdin/stdout
    Protocol,
    /// Let the engine play a full game against itself
    Selfplay,
}

/// Engine options shared by all subcommands.
#[derive(Args)]
struct EngineArgs {
    /// JSON file with engine options; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Iteration budget per decision
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Time budget per decision in seconds; without --iterations the
    /// search is bounded by time alone
    #[arg(long, global = true)]
    time: Option<f64>,

    /// UCB1 exploration constant
    #[arg(long, global = true)]
    exploration: Option<f64>,

    /// Scale exploration by game phase
    #[arg(long, global = true)]
    adaptive: bool,

    /// Stop early once the best move averages above this
    #[arg(long, global = true)]
    early_stop: Option<f64>,

    /// Rollout depth limit in plies
    #[arg(long, global = true)]
    rollout_depth: Option<usize>,

    /// Search only the N heuristically best root columns (N defaults to 5)
    #[arg(long, global = true, value_name = "N", num_args = 0..=1)]
    root_limit: Option<Option<usize>>,

    /// Random seed
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl EngineArgs {
    fn to_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => EngineConfig::default(),
        };
        match (self.iterations, self.time) {
            (Some(n), Some(seconds)) => {
                config = config.with_iterations(n).with_time_budget(seconds);
            }
            (Some(n), None) => config = config.with_iterations(n),
            (None, Some(seconds)) => {
                config.iteration_budget = None;
                config = config.with_time_budget(seconds);
            }
            (None, None) => {}
        }
        if let Some(c) = self.exploration {
            config = config.with_exploration(c);
        }
        if self.adaptive {
            config = config.with_adaptive_exploration(true);
        }
        if let Some(confidence) = self.early_stop {
            config = config.with_early_stop(confidence);
        }
        if let Some(plies) = self.rollout_depth {
            config = config.with_rollout_depth(plies);
        }
        if let Some(limit) = self.root_limit {
            config = config.with_root_candidate_limit(limit.unwrap_or(ROOT_CANDIDATE_LIMIT));
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let config = cli.engine.to_config()?;

    match cli.command {
        Commands::Decide { board } => run_decide(&board, &config),
        Commands::Protocol => {
            let mut engine = ProtocolEngine::new(config);
            engine.run().context("protocol I/O failed")
        }
        Commands::Selfplay => run_selfplay(&config),
    }
}

fn read_board(path: &PathBuf) -> Result<Board> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading board from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading board from {}", path.display()))?
    };
    Ok(text.parse()?)
}

fn run_decide(path: &PathBuf, config: &EngineConfig) -> Result<()> {
    let board = read_board(path)?;
    let mut rng = config.rng();
    let decision = decide_with_rng(&board, config, &mut rng)?;

    println!("{}", decision.column);
    info!(
        source = ?decision.source,
        iterations = decision.iterations,
        nodes = decision.nodes,
        elapsed_ms = decision.elapsed.as_millis() as u64,
        "decision"
    );
    for child in &decision.children {
        info!(
            column = child.column,
            visits = child.visits,
            mean = child.mean,
            "root child"
        );
    }
    Ok(())
}

fn run_selfplay(config: &EngineConfig) -> Result<()> {
    let mut rng = config.rng();
    let mut pos = Position::new();

    while !pos.is_terminal() {
        let board = Board::from(&pos);
        let decision = decide_with_rng(&board, config, &mut rng)?;
        let side = pos.side_to_move();
        pos = match pos.play(decision.column) {
            Ok(next) => next,
            Err(err) => bail!("engine chose column {}: {err}", decision.column),
        };
        println!(
            "{side} plays {} ({:?}, {} iterations)",
            decision.column, decision.source, decision.iterations
        );
        println!("{}", Board::from(&pos));
    }

    match pos.outcome() {
        Outcome::Win(side) => println!("{side} wins"),
        Outcome::Draw => println!("draw"),
        Outcome::Ongoing => {}
    }
    Ok(())
}
