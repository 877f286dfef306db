//! Durability Simulation Engine
//!
//! Stochastic projection of how many incidents an agreement would see once
//! implemented, how severe they would be, and where the trend points.
//!
//! - **config**: immutable run parameters (alpha, base_p, multipliers, budget)
//! - **risk**: agreement risk modifier and incident type mix
//! - **engine**: the seeded tick loop
//! - **result**: aggregates (trend, bucketed series, histogram, digest)
//! - **ensemble**: repeated-seed summaries and candidate comparison

pub mod config;
pub mod engine;
pub mod ensemble;
pub mod result;
pub mod risk;

pub use config::{MediaCascade, SimulationConfig};
pub use engine::{simulate, DurabilitySimulator};
pub use ensemble::{compare_candidates, simulate_ensemble, CandidateRanking, EnsembleSummary};
pub use result::{bucket_width, SimulationResult, Trend};
pub use risk::{agreement_risk, type_weights, IncidentProfile, INCIDENT_PROFILES};
