//! Line-oriented text protocol for interactive play.
//!
//! Modelled on GTP: one command per line, an optional numeric id in front,
//! responses of the form `=id message` on success and `?id message` on
//! failure, each followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `protocol_version` - Return protocol version (1)
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `clear_board` - Reset to an empty grid
//! - `play <column>` - Drop a disc for the side to move
//! - `genmove` - Let the engine choose and play a column
//! - `showboard` - Print the grid
//! - `iterations <n>` - Set the iteration budget
//! - `time <seconds>` - Set a time budget (clears the iteration budget)
//!
//! ## Example
//!
//! ```ignore
//! use drop4_mcts::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new(Default::default());
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use fastrand::Rng;
use tracing::{info, warn};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::engine::decide_with_rng;
use crate::position::Position;
use crate::state::{GameState, Outcome};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "genmove",
    "iterations",
    "known_command",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "time",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    /// Current game position
    pos: Position,
    /// Options used for every `genmove`
    config: EngineConfig,
    rng: Rng,
}

impl ProtocolEngine {
    /// Create an engine with an empty grid.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            pos: Position::new(),
            rng: config.rng(),
            config,
        }
    }

    /// Run the command loop over stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the command loop over arbitrary streams.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!(%command, %message, "command failed");
            }

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Apply `change` to a copy of the options and keep it only if it
    /// validates.
    fn update_config(&mut self, change: impl FnOnce(&mut EngineConfig)) -> (bool, String) {
        let mut config = self.config.clone();
        change(&mut config);
        match config.validate() {
            Ok(()) => {
                self.config = config;
                (true, String::new())
            }
            Err(err) => (false, err.to_string()),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "clear_board" => {
                self.pos = Position::new();
                (true, String::new())
            }

            "showboard" => {
                let grid = Board::from(&self.pos).to_string();
                (true, format!("\n{}", grid.trim_end()))
            }

            "iterations" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(n) = arg.parse::<u32>() else {
                    return (false, format!("invalid iteration count {arg}"));
                };
                self.update_config(|config| config.iteration_budget = Some(n))
            }

            // A time budget replaces the iteration budget; `iterations`
            // afterwards adds one back and whichever runs out first stops.
            "time" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(seconds) = arg.parse::<f64>() else {
                    return (false, format!("invalid time {arg}"));
                };
                self.update_config(|config| {
                    config.iteration_budget = None;
                    config.time_budget_seconds = Some(seconds);
                })
            }

            "play" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(col) = arg.parse::<usize>() else {
                    return (false, format!("invalid column {arg}"));
                };
                match self.pos.play(col) {
                    Ok(next) => {
                        self.pos = next;
                        (true, String::new())
                    }
                    Err(err) => (false, format!("illegal move: {err}")),
                }
            }

            "genmove" => {
                if self.pos.is_terminal() {
                    return (false, "game is over".to_string());
                }
                let board = Board::from(&self.pos);
                match decide_with_rng(&board, &self.config, &mut self.rng) {
                    Ok(decision) => match self.pos.play(decision.column) {
                        Ok(next) => {
                            info!(
                                column = decision.column,
                                source = ?decision.source,
                                iterations = decision.iterations,
                                "genmove"
                            );
                            self.pos = next;
                            if let Outcome::Win(side) = self.pos.outcome() {
                                info!(%side, "game won");
                            }
                            (true, decision.column.to_string())
                        }
                        Err(err) => (false, format!("engine chose an illegal move: {err}")),
                    },
                    Err(err) => (false, err.to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
