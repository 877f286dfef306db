//! Error taxonomy for the negotiation engine
//!
//! Two layers:
//! - [`ValidationError`]: malformed inputs (agreement vectors, party profiles,
//!   simulation and search parameters). Always raised before any computation
//!   begins, never silently corrected.
//! - [`EngineError`]: everything a full call can fail with, i.e. validation
//!   plus the run budget, the serialization boundary and calibration workers.
//!
//! A BATNA of exactly 1.0 is NOT an error; see [`crate::utility`].

use thiserror::Error;

/// Malformed agreement, profile or run parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown issue '{0}'")]
    UnknownIssue(String),

    #[error("Duplicate issue '{0}' in catalog")]
    DuplicateIssue(String),

    #[error("Invalid domain for issue '{issue}': {reason}")]
    InvalidDomain { issue: String, reason: String },

    #[error("Value for issue '{issue}' is outside its domain: {reason}")]
    OutOfDomain { issue: String, reason: String },

    #[error("Issue '{issue}' expects a {expected} value")]
    KindMismatch { issue: String, expected: &'static str },

    #[error("Party '{party}' has invalid weight {weight} on issue '{issue}'")]
    InvalidWeight {
        party: String,
        issue: String,
        weight: f64,
    },

    #[error("Weights for party '{party}' sum to {sum}, expected 1")]
    WeightSum { party: String, sum: f64 },

    #[error("Value function for issue '{issue}' is not monotonic")]
    NonMonotonic { issue: String },

    #[error("Value function for issue '{issue}' yields {value} outside [0, 1]")]
    ValueOutOfRange { issue: String, value: f64 },

    #[error("Value function for issue '{issue}' has no score for '{missing}'")]
    IncompleteValueFunction { issue: String, missing: String },

    #[error("Value function for issue '{issue}' is malformed: {reason}")]
    MalformedValueFunction { issue: String, reason: String },

    #[error("Party '{party}' has BATNA {batna} outside [0, 1]")]
    InvalidBatna { party: String, batna: f64 },

    #[error("Party '{party}' has loss aversion {value}, must be >= 1")]
    InvalidLossAversion { party: String, value: f64 },

    #[error("Party '{party}' has non-positive risk steepness {value}")]
    InvalidSteepness { party: String, value: f64 },

    #[error("Step count must be positive")]
    NonPositiveSteps,

    #[error("Step count {steps} exceeds the configured cap of {max}")]
    StepBudgetExceeded { steps: usize, max: usize },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("At least one party is required")]
    NoParties,

    #[error("Duplicate party '{0}'")]
    DuplicateParty(String),

    #[error("Unknown party '{0}'")]
    UnknownParty(String),

    #[error("Invalid historical series: {0}")]
    InvalidHistory(String),

    #[error("Invalid search space: {0}")]
    InvalidSearchSpace(String),
}

/// Any failure of an engine call
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Wall-clock budget exhausted after {completed} of {requested} steps")]
    DeadlineExceeded { completed: usize, requested: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Calibration worker failed: {0}")]
    Worker(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl EngineError {
    /// True when the failure is a malformed input rather than a run condition
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
