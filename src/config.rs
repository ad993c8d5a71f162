//! Engine configuration.
//!
//! All options have defaults, can be set through builder methods, or loaded
//! from a JSON file. [`EngineConfig::validate`] runs at the start of every
//! decision so misconfiguration is reported before any search work.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{EARLY_STOP_MIN_ITERATIONS, EXPLORATION_C, N_ITERATIONS};
use crate::error::EngineError;

/// Configuration for a single decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// UCB1 exploration constant `C`.
    pub exploration_constant: f64,

    /// Maximum number of search iterations.
    pub iteration_budget: Option<u32>,

    /// Wall-clock budget measured from the start of the decision.
    pub time_budget_seconds: Option<f64>,

    /// Plies a rollout may play before it is scored as a draw.
    /// `None` means the number of cells on the board.
    pub rollout_depth_limit: Option<usize>,

    /// Scale `C` by game phase (more exploration early, less late).
    pub adaptive_exploration: bool,

    /// Stop once the best root child averages more than this.
    pub early_stop_confidence: Option<f64>,

    /// Iterations that must run before early stopping may trigger.
    pub early_stop_min_iterations: u32,

    /// Keep only this many heuristically best root candidates.
    /// `None` disables ranking.
    pub root_candidate_limit: Option<usize>,

    /// Seed for the random source used by [`crate::engine::decide`].
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exploration_constant: EXPLORATION_C,
            iteration_budget: Some(N_ITERATIONS),
            time_budget_seconds: None,
            rollout_depth_limit: None,
            adaptive_exploration: false,
            early_stop_confidence: None,
            early_stop_min_iterations: EARLY_STOP_MIN_ITERATIONS,
            root_candidate_limit: None,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Time-only configuration.
    pub fn with_deadline(seconds: f64) -> Self {
        Self {
            iteration_budget: None,
            time_budget_seconds: Some(seconds),
            ..Self::default()
        }
    }

    /// Builder pattern: set the iteration budget.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iteration_budget = Some(n);
        self
    }

    /// Builder pattern: set the time budget in seconds.
    pub fn with_time_budget(mut self, seconds: f64) -> Self {
        self.time_budget_seconds = Some(seconds);
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set the rollout depth limit.
    pub fn with_rollout_depth(mut self, plies: usize) -> Self {
        self.rollout_depth_limit = Some(plies);
        self
    }

    /// Builder pattern: toggle phase-adaptive exploration.
    pub fn with_adaptive_exploration(mut self, enabled: bool) -> Self {
        self.adaptive_exploration = enabled;
        self
    }

    /// Builder pattern: enable early stopping above `confidence`.
    pub fn with_early_stop(mut self, confidence: f64) -> Self {
        self.early_stop_confidence = Some(confidence);
        self
    }

    /// Builder pattern: rank the root candidates and keep the best `limit`.
    pub fn with_root_candidate_limit(mut self, limit: usize) -> Self {
        self.root_candidate_limit = Some(limit);
        self
    }

    /// Builder pattern: fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Random source seeded from `seed`, or from entropy when unset.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Wall-clock budget as a `Duration`, if set and representable.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_seconds
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    /// Check option ranges and that at least one budget is set.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.iteration_budget.is_none() && self.time_budget_seconds.is_none() {
            return Err(EngineError::MissingBudget);
        }
        if let Some(0) = self.iteration_budget {
            return Err(invalid("iterationBudget", "must be positive"));
        }
        if let Some(seconds) = self.time_budget_seconds {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(invalid(
                    "timeBudgetSeconds",
                    format!("must be a positive number of seconds, got {seconds}"),
                ));
            }
            if Duration::try_from_secs_f64(seconds).is_err() {
                return Err(invalid(
                    "timeBudgetSeconds",
                    format!("{seconds} seconds does not fit in a duration"),
                ));
            }
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(invalid(
                "explorationConstant",
                format!("must be finite and non-negative, got {}", self.exploration_constant),
            ));
        }
        if let Some(0) = self.rollout_depth_limit {
            return Err(invalid("rolloutDepthLimit", "must be positive"));
        }
        if let Some(confidence) = self.early_stop_confidence {
            if !(confidence > 0.0 && confidence <= 1.0) {
                return Err(invalid(
                    "earlyStopConfidence",
                    format!("must lie in (0, 1], got {confidence}"),
                ));
            }
        }
        if let Some(0) = self.root_candidate_limit {
            return Err(invalid("rootCandidateLimit", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(option: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidOption {
        option,
        reason: reason.into(),
    }
}
