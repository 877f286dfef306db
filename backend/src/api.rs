//! Request/response boundary
//!
//! [`NegotiationEngine`] owns an issue catalog, a directory of party
//! profiles and a default simulation configuration. Callers talk to it
//! through three request records:
//!
//! - [`EvaluateRequest`] → [`NegotiationReport`]
//! - [`SimulateRequest`] → [`SimulationResult`]
//! - [`CalibrateRequest`] → [`CalibrationResult`]
//!
//! plus [`CompareRequest`] for ranking several candidates. Every operation
//! has a `*_json` twin taking and returning JSON text.
//!
//! Calibrated constants are never stored on the engine. A caller persists the
//! returned `alpha`/`base_p` and passes them back through
//! [`SimulateRequest::config`].

use crate::calibration::{CalibrationResult, Calibrator, SearchSpace};
use crate::durability::{
    compare_candidates, CandidateRanking, DurabilitySimulator, SimulationConfig, SimulationResult,
};
use crate::error::{EngineError, ValidationError};
use crate::metrics::{evaluate, NegotiationReport, ZopaConfig};
use crate::models::{
    AgreementVector, EnvironmentConfig, IssueCatalog, IssueValue, PartyProfile, PartyProfileSpec,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seed used when a request leaves it out
pub const DEFAULT_SEED: u64 = 42;

fn default_runs() -> usize {
    5
}

/// Score a candidate agreement for a set of parties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub agreement: BTreeMap<String, IssueValue>,

    /// Party identifiers; `None` means every registered party
    #[serde(default)]
    pub parties: Option<Vec<String>>,

    #[serde(default)]
    pub zopa: Option<ZopaConfig>,
}

/// Project the durability of an agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub agreement: BTreeMap<String, IssueValue>,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    pub steps: usize,

    #[serde(default)]
    pub seed: Option<u64>,

    /// Parties whose acceptance feeds the discontent factor; `None` means none
    #[serde(default)]
    pub parties: Option<Vec<String>>,

    /// Overrides the engine's configuration (e.g. calibrated constants)
    #[serde(default)]
    pub config: Option<SimulationConfig>,
}

/// Fit `alpha`/`base_p` to a historical series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateRequest {
    /// Incident counts per historical time bucket
    pub historical: Vec<f64>,

    /// Scenario the history was observed under
    pub agreement: BTreeMap<String, IssueValue>,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    #[serde(default)]
    pub parties: Option<Vec<String>>,

    #[serde(default)]
    pub search: SearchSpace,
}

/// Rank several candidate agreements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub candidates: Vec<BTreeMap<String, IssueValue>>,

    #[serde(default)]
    pub parties: Option<Vec<String>>,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    pub steps: usize,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_runs")]
    pub runs: usize,

    #[serde(default)]
    pub zopa: Option<ZopaConfig>,
}

/// Library entry point resolving party identifiers to profiles
#[derive(Debug, Clone)]
pub struct NegotiationEngine {
    catalog: IssueCatalog,
    parties: BTreeMap<String, PartyProfile>,
    simulation: SimulationConfig,
}

impl NegotiationEngine {
    pub fn new(catalog: IssueCatalog) -> Self {
        Self {
            catalog,
            parties: BTreeMap::new(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Engine over the built-in maritime standoff catalog
    pub fn maritime() -> Self {
        Self::new(IssueCatalog::maritime_standoff())
    }

    /// Replace the default simulation configuration
    pub fn with_simulation_config(mut self, config: SimulationConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        self.simulation = config;
        Ok(self)
    }

    pub fn catalog(&self) -> &IssueCatalog {
        &self.catalog
    }

    pub fn simulation_config(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Validate and register a profile, replacing any profile with the same id
    pub fn register_party(&mut self, spec: PartyProfileSpec) -> Result<(), ValidationError> {
        let profile = PartyProfile::new(spec, &self.catalog)?;
        log::debug!("registered party {}", profile.id());
        self.parties.insert(profile.id().to_string(), profile);
        Ok(())
    }

    pub fn party(&self, id: &str) -> Option<&PartyProfile> {
        self.parties.get(id)
    }

    pub fn party_ids(&self) -> impl Iterator<Item = &String> {
        self.parties.keys()
    }

    /// Resolve identifiers in request order; `None` selects every registered
    /// party or none, per `all_by_default`
    fn resolve(&self, ids: Option<&[String]>, all_by_default: bool) -> Result<Vec<PartyProfile>, ValidationError> {
        match ids {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.parties
                        .get(id)
                        .cloned()
                        .ok_or_else(|| ValidationError::UnknownParty(id.clone()))
                })
                .collect(),
            None if all_by_default => Ok(self.parties.values().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn agreement(&self, values: &BTreeMap<String, IssueValue>) -> Result<AgreementVector, ValidationError> {
        AgreementVector::new(values.clone(), &self.catalog)
    }

    /// Evaluate operation
    pub fn evaluate(&self, request: &EvaluateRequest) -> Result<NegotiationReport, ValidationError> {
        let agreement = self.agreement(&request.agreement)?;
        let profiles = self.resolve(request.parties.as_deref(), true)?;
        let zopa = request.zopa.unwrap_or_default();
        evaluate(&self.catalog, &agreement, &profiles, &zopa)
    }

    /// Simulate operation
    pub fn simulate(&self, request: &SimulateRequest) -> Result<SimulationResult, EngineError> {
        let agreement = self.agreement(&request.agreement)?;
        let profiles = self.resolve(request.parties.as_deref(), false)?;
        let config = request.config.clone().unwrap_or_else(|| self.simulation.clone());
        let simulator = DurabilitySimulator::new(&self.catalog, config)?;
        simulator.run(
            &agreement,
            &request.environment,
            &profiles,
            request.steps,
            request.seed.unwrap_or(DEFAULT_SEED),
        )
    }

    /// Calibrate operation
    pub fn calibrate(&self, request: &CalibrateRequest) -> Result<CalibrationResult, EngineError> {
        let agreement = self.agreement(&request.agreement)?;
        let profiles = self.resolve(request.parties.as_deref(), false)?;
        let calibrator = Calibrator::new(
            &self.catalog,
            self.simulation.clone(),
            agreement,
            request.environment,
            &profiles,
        )?;
        calibrator.calibrate(&request.historical, &request.search)
    }

    /// Evaluate and simulate every candidate, best first
    pub fn compare(&self, request: &CompareRequest) -> Result<Vec<CandidateRanking>, EngineError> {
        let candidates = request
            .candidates
            .iter()
            .map(|values| self.agreement(values))
            .collect::<Result<Vec<_>, _>>()?;
        let profiles = self.resolve(request.parties.as_deref(), true)?;
        let simulator = DurabilitySimulator::new(&self.catalog, self.simulation.clone())?;
        compare_candidates(
            &simulator,
            &candidates,
            &request.environment,
            &profiles,
            &request.zopa.unwrap_or_default(),
            request.steps,
            request.seed.unwrap_or(DEFAULT_SEED),
            request.runs,
        )
    }

    pub fn evaluate_json(&self, request: &str) -> Result<String, EngineError> {
        let request: EvaluateRequest = parse(request)?;
        render(&self.evaluate(&request)?)
    }

    pub fn simulate_json(&self, request: &str) -> Result<String, EngineError> {
        let request: SimulateRequest = parse(request)?;
        render(&self.simulate(&request)?)
    }

    pub fn calibrate_json(&self, request: &str) -> Result<String, EngineError> {
        let request: CalibrateRequest = parse(request)?;
        render(&self.calibrate(&request)?)
    }

    pub fn compare_json(&self, request: &str) -> Result<String, EngineError> {
        let request: CompareRequest = parse(request)?;
        render(&self.compare(&request)?)
    }
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, EngineError> {
    Ok(serde_json::from_str(json)?)
}

fn render<T: Serialize>(value: &T) -> Result<String, EngineError> {
    Ok(serde_json::to_string(value)?)
}
