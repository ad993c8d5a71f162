//! Search budget: iteration count, wall-clock deadline, early stop.
//!
//! The budget is consulted only between iterations; an iteration that has
//! started always runs to completion.

use std::time::{Duration, Instant};

use crate::config::EngineConfig;

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The iteration budget was used up.
    Iterations,
    /// The deadline passed.
    Deadline,
    /// The best root child looked good enough.
    EarlyStop,
}

/// Stopping rules for one decision.
#[derive(Debug, Clone)]
pub struct Budget {
    max_iterations: Option<u32>,
    deadline: Option<Instant>,
    confidence: Option<f64>,
    min_iterations: u32,
}

impl Budget {
    /// Budget for a decision that started at `started`.
    pub fn from_config(config: &EngineConfig, started: Instant) -> Self {
        Self {
            max_iterations: config.iteration_budget,
            deadline: config
                .time_budget()
                .and_then(|limit| started.checked_add(limit)),
            confidence: config.early_stop_confidence,
            min_iterations: config.early_stop_min_iterations,
        }
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Reason to stop before starting another iteration, if any.
    /// Either budget running out is enough.
    pub fn exhausted(&self, iterations: u32) -> Option<StopReason> {
        if let Some(max) = self.max_iterations {
            if iterations >= max {
                return Some(StopReason::Iterations);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(StopReason::Deadline);
            }
        }
        None
    }

    /// Whether the search may stop early given the best root child average.
    pub fn confident(&self, iterations: u32, best_mean: Option<f64>) -> bool {
        match (self.confidence, best_mean) {
            (Some(threshold), Some(mean)) => iterations >= self.min_iterations && mean > threshold,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_budget() {
        let config = EngineConfig::default().with_iterations(3);
        let budget = Budget::from_config(&config, Instant::now());
        assert_eq!(budget.exhausted(2), None);
        assert_eq!(budget.exhausted(3), Some(StopReason::Iterations));
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn test_deadline_in_the_past() {
        let config = EngineConfig::with_deadline(0.01);
        let started = Instant::now() - Duration::from_secs(1);
        let budget = Budget::from_config(&config, started);
        assert_eq!(budget.exhausted(0), Some(StopReason::Deadline));
        assert_eq!(budget.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_deadline_not_reached() {
        let config = EngineConfig::with_deadline(60.0);
        let budget = Budget::from_config(&config, Instant::now());
        assert_eq!(budget.exhausted(1_000_000), None);
    }

    #[test]
    fn test_deadline_past_the_clock_range_is_unbounded() {
        let config = EngineConfig::default()
            .with_iterations(5)
            .with_time_budget(1e19);
        assert!(config.validate().is_ok());

        let budget = Budget::from_config(&config, Instant::now());
        assert_eq!(budget.remaining(), None);
        assert_eq!(budget.exhausted(4), None);
        assert_eq!(budget.exhausted(5), Some(StopReason::Iterations));
    }

    #[test]
    fn test_early_stop_needs_minimum_iterations() {
        let config = EngineConfig::default().with_early_stop(0.8);
        let budget = Budget::from_config(&config, Instant::now());
        let min = config.early_stop_min_iterations;

        assert!(!budget.confident(min - 1, Some(0.95)));
        assert!(budget.confident(min, Some(0.95)));
        assert!(!budget.confident(min, Some(0.8)));
        assert!(!budget.confident(min, None));
    }

    #[test]
    fn test_no_early_stop_without_threshold() {
        let budget = Budget::from_config(&EngineConfig::default(), Instant::now());
        assert!(!budget.confident(u32::MAX, Some(1.0)));
    }
}
