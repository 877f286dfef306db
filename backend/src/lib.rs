//! Negotiation Engine Core - Rust Engine
//!
//! Scores candidate agreements for every party at the table and projects how
//! durable an agreement would be once implemented.
//!
//! # Architecture
//!
//! - **models**: Domain types (Issue catalog, Agreement, Party profile, Environment, Incident)
//! - **utility**: Prospect-theory utility with BATNA normalization
//! - **metrics**: Acceptance probability, ZOPA, Nash product
//! - **durability**: Seeded incident simulation and aggregation
//! - **calibration**: Fit of the global risk constants to history
//! - **core**: Run budget (step cap, wall-clock deadline)
//! - **rng**: Deterministic random number generation
//! - **api**: Request/response records and the engine facade
//!
//! # Critical Invariants
//!
//! 1. Final utilities are always clamped into [0, 1]
//! 2. All randomness is deterministic (one seeded RNG per run)
//! 3. Calibrated constants are explicit inputs, never global state
//! 4. Inputs are validated before any computation begins

// Module declarations
pub mod api;
pub mod calibration;
pub mod core;
pub mod durability;
pub mod error;
pub mod metrics;
pub mod models;
pub mod rng;
pub mod utility;

// Re-exports for convenience
pub use api::{CalibrateRequest, CompareRequest, EvaluateRequest, NegotiationEngine, SimulateRequest};
pub use calibration::{CalibrationResult, Calibrator, SearchSpace};
pub use crate::core::time::{RunBudget, RunClock};
pub use durability::{
    compare_candidates, simulate, simulate_ensemble, DurabilitySimulator, SimulationConfig,
    SimulationResult, Trend,
};
pub use error::{EngineError, ValidationError};
pub use metrics::{
    acceptance_probability, evaluate, find_zopa, nash_product, overall_agreement_probability,
    NegotiationReport, ZopaConfig, ZopaReport,
};
pub use models::{
    AgreementVector, EnvironmentConfig, IncidentEvent, IncidentType, Issue, IssueCatalog,
    IssueDomain, IssueValue, MediaVisibility, PartyProfile, RiskAttitude, ValueFunction, Weather,
};
pub use rng::RngManager;
pub use utility::{utility, utility_breakdown, UtilityBreakdown};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn negotiation_engine_core_rs(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<ffi::PyNegotiationEngine>()?;
    Ok(())
}
