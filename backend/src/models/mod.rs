//! Domain models for the negotiation engine

pub mod agreement;
pub mod environment;
pub mod incident;
pub mod issue;
pub mod party;
pub mod scenario;

// Re-exports
pub use agreement::{AgreementBuilder, AgreementVector};
pub use environment::{EnvironmentConfig, MediaVisibility, Weather};
pub use incident::{IncidentEvent, IncidentType};
pub use issue::{Issue, IssueCatalog, IssueDomain, IssueValue, RiskEffect, RiskFactor};
pub use party::{
    Breakpoint, IssuePreference, PartyProfile, PartyProfileBuilder, PartyProfileSpec,
    RiskAttitude, ValueFunction, DEFAULT_LOSS_AVERSION, WEIGHT_TOLERANCE,
};
