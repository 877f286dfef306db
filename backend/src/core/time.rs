//! Simulation time and run budgets
//!
//! A durability run advances through discrete ticks. [`RunClock`] counts them
//! and enforces the [`RunBudget`]: a hard step cap checked up front and an
//! optional wall-clock deadline checked while running, so an oversized
//! request cannot run unbounded.

use crate::error::{EngineError, ValidationError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Largest step count accepted by default
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// How often (in ticks) the wall clock is consulted
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// Limits applied to a single simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunBudget {
    /// Requests above this many steps are rejected before running
    pub max_steps: usize,

    /// Optional wall-clock limit in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_clock_ms: Option<u64>,
}

impl Default for RunBudget {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            wall_clock_ms: None,
        }
    }
}

impl RunBudget {
    /// Reject zero or oversized step counts
    pub fn admit(&self, steps: usize) -> Result<(), ValidationError> {
        if steps == 0 {
            return Err(ValidationError::NonPositiveSteps);
        }
        if steps > self.max_steps {
            return Err(ValidationError::StepBudgetExceeded {
                steps,
                max: self.max_steps,
            });
        }
        Ok(())
    }
}

/// Tick counter for one run
///
/// # Example
/// ```
/// use negotiation_engine_core_rs::core::time::{RunBudget, RunClock};
///
/// let mut clock = RunClock::start(10, &RunBudget::default()).unwrap();
/// assert_eq!(clock.current_tick(), 0);
/// clock.advance_tick().unwrap();
/// assert_eq!(clock.current_tick(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RunClock {
    current_tick: usize,
    total_steps: usize,
    deadline: Option<Instant>,
}

impl RunClock {
    /// Admit `steps` under `budget` and start the clock
    pub fn start(steps: usize, budget: &RunBudget) -> Result<Self, ValidationError> {
        budget.admit(steps)?;
        Ok(Self {
            current_tick: 0,
            total_steps: steps,
            deadline: budget
                .wall_clock_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        })
    }

    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.total_steps
    }

    /// Move to the next tick, failing if the wall-clock budget is spent
    pub fn advance_tick(&mut self) -> Result<(), EngineError> {
        self.current_tick += 1;
        if let Some(deadline) = self.deadline {
            if self.current_tick % DEADLINE_CHECK_INTERVAL == 0
                && !self.is_finished()
                && Instant::now() >= deadline
            {
                return Err(EngineError::DeadlineExceeded {
                    completed: self.current_tick,
                    requested: self.total_steps,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_steps_rejected() {
        let err = RunClock::start(0, &RunBudget::default()).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveSteps);
    }

    #[test]
    fn test_step_cap() {
        let budget = RunBudget {
            max_steps: 100,
            wall_clock_ms: None,
        };
        assert!(RunClock::start(100, &budget).is_ok());
        assert_eq!(
            RunClock::start(101, &budget).unwrap_err(),
            ValidationError::StepBudgetExceeded { steps: 101, max: 100 }
        );
    }

    #[test]
    fn test_expired_deadline_stops_run() {
        let budget = RunBudget {
            max_steps: DEFAULT_MAX_STEPS,
            wall_clock_ms: Some(0),
        };
        let mut clock = RunClock::start(5_000, &budget).unwrap();
        let mut outcome = Ok(());
        while !clock.is_finished() {
            outcome = clock.advance_tick();
            if outcome.is_err() {
                break;
            }
        }
        match outcome {
            Err(EngineError::DeadlineExceeded { completed, requested }) => {
                assert_eq!(completed, DEADLINE_CHECK_INTERVAL);
                assert_eq!(requested, 5_000);
            }
            other => panic!("expected deadline error, got {:?}", other),
        }
    }
}
