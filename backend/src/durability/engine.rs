//! Durability simulation engine
//!
//! Projects how an agreement holds up by running a seeded, time-stepped
//! incident process.
//!
//! # Tick loop
//!
//! ```text
//! base_p' = base_p × alpha × agreement_risk.probability
//!           × baseline_tension × weather × discontent
//!
//! For each tick t:
//! 1. p = base_p' × (media cascade if an incident hit within cascade_window)
//! 2. Bernoulli(p): incident or not
//! 3. On incident: draw a type from the safety-conditioned mix, then a
//!    severity from the type's triangular distribution
//! 4. Severity × agreement_risk.severity, + rough-weather shift,
//!    + escalation bonus for incidents within escalation_window; clamp [0, 1]
//! 5. Record the event
//! ```
//!
//! # Determinism
//!
//! Each run owns a fresh [`RngManager`] seeded from the caller's seed. Every
//! tick consumes exactly one draw, every incident two more, so identical
//! inputs reproduce the identical event sequence.

use crate::core::time::RunClock;
use crate::durability::config::SimulationConfig;
use crate::durability::result::SimulationResult;
use crate::durability::risk::{agreement_risk, type_weights, FALLBACK_INDEX, INCIDENT_PROFILES};
use crate::error::{EngineError, ValidationError};
use crate::metrics::acceptance_probability;
use crate::models::{
    AgreementVector, EnvironmentConfig, IncidentEvent, IssueCatalog, PartyProfile, Weather,
};
use crate::rng::RngManager;
use crate::utility::utility;
use std::collections::VecDeque;

/// Runs durability simulations against one issue catalog and configuration
///
/// Holds only shared read-only data; one simulator can serve many
/// concurrent runs.
#[derive(Debug, Clone)]
pub struct DurabilitySimulator<'a> {
    catalog: &'a IssueCatalog,
    config: SimulationConfig,
}

impl<'a> DurabilitySimulator<'a> {
    /// Create a simulator after validating `config`
    pub fn new(catalog: &'a IssueCatalog, config: SimulationConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &'a IssueCatalog {
        self.catalog
    }

    /// Per-tick incident probability before cascade multipliers
    ///
    /// Validates every input; this is the point where malformed agreements
    /// are rejected, before any tick runs.
    pub fn base_probability(
        &self,
        agreement: &AgreementVector,
        environment: &EnvironmentConfig,
        profiles: &[PartyProfile],
    ) -> Result<f64, ValidationError> {
        agreement.validate(self.catalog)?;
        environment.validate()?;

        let risk = agreement_risk(self.catalog, agreement);
        let weather = match environment.weather {
            Weather::Calm => 1.0,
            Weather::Rough => self.config.rough_probability_multiplier,
        };
        let discontent = self.discontent_factor(agreement, profiles)?;

        Ok(self.config.base_p
            * self.config.alpha
            * risk.probability
            * environment.baseline_tension
            * weather
            * discontent)
    }

    /// `1 + w × (1 − min acceptance)` across supplied parties; 1 with none
    fn discontent_factor(
        &self,
        agreement: &AgreementVector,
        profiles: &[PartyProfile],
    ) -> Result<f64, ValidationError> {
        let mut min_acceptance: Option<f64> = None;
        for profile in profiles {
            let u = utility(agreement, profile)?;
            let p = acceptance_probability(u, profile.steepness());
            min_acceptance = Some(min_acceptance.map_or(p, |m| m.min(p)));
        }
        Ok(match min_acceptance {
            Some(p) => 1.0 + self.config.discontent_weight * (1.0 - p),
            None => 1.0,
        })
    }

    /// Run one simulation
    ///
    /// # Errors
    /// - `Validation` for zero/oversized `steps`, a malformed agreement or
    ///   environment, or a profile that cannot score the agreement
    /// - `DeadlineExceeded` if the configured wall-clock budget runs out
    ///
    /// Zero incidents is a normal, successful outcome.
    pub fn run(
        &self,
        agreement: &AgreementVector,
        environment: &EnvironmentConfig,
        profiles: &[PartyProfile],
        steps: usize,
        seed: u64,
    ) -> Result<SimulationResult, EngineError> {
        let mut clock = RunClock::start(steps, &self.config.budget)?;
        let base_p = self.base_probability(agreement, environment, profiles)?;
        if base_p >= 1.0 {
            log::warn!(
                "per-tick incident probability {:.3} saturates at 1.0 (alpha={}, base_p={})",
                base_p,
                self.config.alpha,
                self.config.base_p
            );
        }

        let risk = agreement_risk(self.catalog, agreement);
        let weights = type_weights(&risk);
        let cascade = self.config.media_cascade.multiplier(environment.media);
        let severity_shift = match environment.weather {
            Weather::Calm => 0.0,
            Weather::Rough => self.config.rough_severity_shift,
        };
        let lookback = self.config.cascade_window.max(self.config.escalation_window);

        log::debug!(
            "durability run: steps={} seed={} base_p={:.4} risk={:?}",
            steps,
            seed,
            base_p,
            risk
        );

        let mut rng = RngManager::new(seed);
        let mut events = Vec::new();
        let mut recent: VecDeque<usize> = VecDeque::new();

        while !clock.is_finished() {
            let tick = clock.current_tick();
            while recent.front().is_some_and(|&t| tick - t > lookback) {
                recent.pop_front();
            }

            let cascading = recent
                .back()
                .is_some_and(|&t| tick - t <= self.config.cascade_window);
            let p = if cascading { base_p * cascade } else { base_p };

            if rng.chance(p) {
                let idx = rng.weighted_index(&weights).unwrap_or(FALLBACK_INDEX);
                let profile = &INCIDENT_PROFILES[idx];
                let (min, mode, max) = profile.severity;

                let recent_count = recent
                    .iter()
                    .filter(|&&t| tick - t <= self.config.escalation_window)
                    .count();
                let escalation =
                    (self.config.escalation_step * recent_count as f64).min(self.config.escalation_cap);

                let severity = (rng.triangular(min, mode, max) * risk.severity
                    + severity_shift
                    + escalation)
                    .clamp(0.0, 1.0);

                log::trace!(
                    "tick {}: {} severity={:.3} (escalation {:.2})",
                    tick,
                    profile.kind,
                    severity,
                    escalation
                );

                events.push(IncidentEvent::new(profile.kind, severity, tick));
                recent.push_back(tick);
            }

            clock.advance_tick()?;
        }

        let result = SimulationResult::from_events(
            events,
            steps,
            seed,
            base_p,
            self.config.bucket_count,
            self.config.severity_bins,
        );

        log::debug!(
            "durability run done: incidents={} mean_severity={:.3} trend={:?}",
            result.total_incidents,
            result.mean_severity,
            result.trend
        );

        Ok(result)
    }
}

/// One-shot convenience wrapper around [`DurabilitySimulator::run`]
pub fn simulate(
    catalog: &IssueCatalog,
    config: &SimulationConfig,
    agreement: &AgreementVector,
    environment: &EnvironmentConfig,
    profiles: &[PartyProfile],
    steps: usize,
    seed: u64,
) -> Result<SimulationResult, EngineError> {
    DurabilitySimulator::new(catalog, config.clone())?.run(agreement, environment, profiles, steps, seed)
}
