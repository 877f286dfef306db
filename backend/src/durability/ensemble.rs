//! Multi-run summaries
//!
//! - [`simulate_ensemble`]: the same agreement over several derived seeds,
//!   averaged. Calibration scores candidates through this.
//! - [`compare_candidates`]: evaluate and simulate several agreements and
//!   rank them.
//!
//! Every run gets its own seed from [`RngManager::derive_seed`], so runs
//! are independent and the summary is reproducible.

use crate::durability::engine::DurabilitySimulator;
use crate::durability::result::Trend;
use crate::error::{EngineError, ValidationError};
use crate::metrics::{evaluate, NegotiationReport, ZopaConfig};
use crate::models::{AgreementVector, EnvironmentConfig, PartyProfile};
use crate::rng::RngManager;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Aggregate over repeated seeds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleSummary {
    pub runs: usize,
    pub mean_incidents: f64,
    pub min_incidents: usize,
    pub max_incidents: usize,

    /// Severity averaged over every incident of every run
    pub mean_severity: f64,

    pub trend_counts: BTreeMap<Trend, usize>,

    /// Per-bucket incident count averaged over runs
    pub mean_series: Vec<f64>,
}

/// Run `runs` independent simulations derived from `base_seed`
///
/// # Errors
/// `InvalidParameter` when `runs` is zero, plus anything a single run fails
/// with.
pub fn simulate_ensemble(
    simulator: &DurabilitySimulator<'_>,
    agreement: &AgreementVector,
    environment: &EnvironmentConfig,
    profiles: &[PartyProfile],
    steps: usize,
    base_seed: u64,
    runs: usize,
) -> Result<EnsembleSummary, EngineError> {
    if runs == 0 {
        return Err(ValidationError::InvalidParameter {
            name: "runs",
            reason: "at least one run required".to_string(),
        }
        .into());
    }

    let mut total_incidents = 0usize;
    let mut min_incidents = usize::MAX;
    let mut max_incidents = 0usize;
    let mut severity_sum = 0.0;
    let mut trend_counts = BTreeMap::new();
    let mut series_sum: Vec<f64> = Vec::new();

    for r in 0..runs {
        let seed = RngManager::derive_seed(base_seed, r as u64);
        let result = simulator.run(agreement, environment, profiles, steps, seed)?;

        total_incidents += result.total_incidents;
        min_incidents = min_incidents.min(result.total_incidents);
        max_incidents = max_incidents.max(result.total_incidents);
        severity_sum += result.events.iter().map(|e| e.severity).sum::<f64>();
        *trend_counts.entry(result.trend).or_insert(0) += 1;

        if series_sum.len() < result.series.len() {
            series_sum.resize(result.series.len(), 0.0);
        }
        for (acc, count) in series_sum.iter_mut().zip(result.series.iter()) {
            *acc += *count as f64;
        }
    }

    let mean_severity = if total_incidents == 0 {
        0.0
    } else {
        severity_sum / total_incidents as f64
    };

    Ok(EnsembleSummary {
        runs,
        mean_incidents: total_incidents as f64 / runs as f64,
        min_incidents,
        max_incidents,
        mean_severity,
        trend_counts,
        mean_series: series_sum.into_iter().map(|s| s / runs as f64).collect(),
    })
}

/// One ranked candidate agreement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRanking {
    /// Position of the candidate in the caller's input
    pub index: usize,
    pub report: NegotiationReport,
    pub durability: EnsembleSummary,
}

/// Evaluate and simulate each candidate; best first
///
/// Ordering: higher Nash product, then fewer expected incidents, then input
/// position.
#[allow(clippy::too_many_arguments)]
pub fn compare_candidates(
    simulator: &DurabilitySimulator<'_>,
    candidates: &[AgreementVector],
    environment: &EnvironmentConfig,
    profiles: &[PartyProfile],
    zopa_config: &ZopaConfig,
    steps: usize,
    base_seed: u64,
    runs: usize,
) -> Result<Vec<CandidateRanking>, EngineError> {
    let mut rankings = Vec::with_capacity(candidates.len());
    for (index, agreement) in candidates.iter().enumerate() {
        let report = evaluate(simulator.catalog(), agreement, profiles, zopa_config)?;
        let durability =
            simulate_ensemble(simulator, agreement, environment, profiles, steps, base_seed, runs)?;
        rankings.push(CandidateRanking {
            index,
            report,
            durability,
        });
    }

    rankings.sort_by(|a, b| {
        b.report
            .nash_product
            .total_cmp(&a.report.nash_product)
            .then_with(|| {
                a.durability
                    .mean_incidents
                    .partial_cmp(&b.durability.mean_incidents)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.index.cmp(&b.index))
    });

    Ok(rankings)
}
