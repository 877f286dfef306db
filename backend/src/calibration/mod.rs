//! Calibration Module
//!
//! Offline fit of the two global risk constants (`alpha`, `base_p`) against a
//! historical incident-count series.
//!
//! # Search
//!
//! ```text
//! 1. Grid over alpha × base_p inside the search box
//! 2. For each candidate: simulate `replicates` seeds, average the bucketed
//!    series, score by SSE against the history
//! 3. Optional refinement rounds: shrink the box around the incumbent to one
//!    grid step either side and search again
//! ```
//!
//! Candidates are scored on a bounded worker pool. Results are reduced in
//! candidate order and every candidate reuses the same seeds, so the fit does
//! not depend on worker count or scheduling.
//!
//! The returned parameters are NOT applied anywhere; callers feed them into
//! [`SimulationConfig::with_calibration`].

use crate::durability::{simulate_ensemble, DurabilitySimulator, SimulationConfig};
use crate::error::{EngineError, ValidationError};
use crate::models::{AgreementVector, EnvironmentConfig, IssueCatalog, PartyProfile};
use crossbeam_channel::{bounded, unbounded};
use serde::{Deserialize, Serialize};
use std::thread;

/// Outer limits of the calibratable range for `alpha`
pub const ALPHA_LIMITS: (f64, f64) = (0.5, 2.5);

/// Outer limits of the calibratable range for `base_p`
pub const BASE_P_LIMITS: (f64, f64) = (0.05, 0.50);

/// Grid points per axis in refinement rounds
const REFINE_POINTS: usize = 5;

/// Bounds and effort of a calibration search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpace {
    pub alpha: (f64, f64),
    pub base_p: (f64, f64),
    pub alpha_points: usize,
    pub base_p_points: usize,
    pub refine_rounds: usize,

    /// Seeds averaged per candidate
    pub replicates: usize,

    /// Simulation ticks represented by one historical bucket
    pub steps_per_bucket: usize,

    pub seed: u64,

    /// Worker threads used to score candidates
    pub workers: usize,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            alpha: ALPHA_LIMITS,
            base_p: BASE_P_LIMITS,
            alpha_points: 9,
            base_p_points: 10,
            refine_rounds: 2,
            replicates: 5,
            steps_per_bucket: 10,
            seed: 1,
            workers: 1,
        }
    }
}

impl SearchSpace {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fn within(name: &str, range: (f64, f64), limits: (f64, f64)) -> Result<(), ValidationError> {
            let (lo, hi) = range;
            if !lo.is_finite() || !hi.is_finite() || lo > hi || lo < limits.0 || hi > limits.1 {
                return Err(ValidationError::InvalidSearchSpace(format!(
                    "{} range [{}, {}] must be ordered and inside [{}, {}]",
                    name, lo, hi, limits.0, limits.1
                )));
            }
            Ok(())
        }

        within("alpha", self.alpha, ALPHA_LIMITS)?;
        within("base_p", self.base_p, BASE_P_LIMITS)?;
        if self.alpha_points == 0 || self.base_p_points == 0 {
            return Err(ValidationError::InvalidSearchSpace(
                "grid needs at least one point per axis".to_string(),
            ));
        }
        if self.replicates == 0 {
            return Err(ValidationError::InvalidSearchSpace(
                "at least one replicate required".to_string(),
            ));
        }
        if self.steps_per_bucket == 0 {
            return Err(ValidationError::InvalidSearchSpace(
                "steps_per_bucket must be positive".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ValidationError::InvalidSearchSpace(
                "at least one worker required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Best-fit risk constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub alpha: f64,
    pub base_p: f64,

    /// Sum of squared errors of the averaged series against the history
    pub residual_error: f64,

    pub candidates_evaluated: usize,

    /// Averaged simulated series at the best fit
    pub fitted_series: Vec<f64>,
}

/// Fixed scenario against which calibration runs the simulator
#[derive(Debug, Clone)]
pub struct Calibrator<'a> {
    catalog: &'a IssueCatalog,
    base_config: SimulationConfig,
    agreement: AgreementVector,
    environment: EnvironmentConfig,
    profiles: &'a [PartyProfile],
}

/// Score of one candidate
#[derive(Debug, Clone)]
struct Scored {
    alpha: f64,
    base_p: f64,
    sse: f64,
    series: Vec<f64>,
}

impl<'a> Calibrator<'a> {
    /// Validate the scenario once up front
    pub fn new(
        catalog: &'a IssueCatalog,
        base_config: SimulationConfig,
        agreement: AgreementVector,
        environment: EnvironmentConfig,
        profiles: &'a [PartyProfile],
    ) -> Result<Self, ValidationError> {
        base_config.validate()?;
        agreement.validate(catalog)?;
        environment.validate()?;
        Ok(Self {
            catalog,
            base_config,
            agreement,
            environment,
            profiles,
        })
    }

    /// Fit `alpha` and `base_p` to `historical` bucketed incident counts
    ///
    /// # Errors
    /// - `InvalidHistory` for an empty series or negative/non-finite counts
    /// - `InvalidSearchSpace` for bounds outside the calibratable limits
    /// - `Worker` if a scoring thread dies
    pub fn calibrate(
        &self,
        historical: &[f64],
        space: &SearchSpace,
    ) -> Result<CalibrationResult, EngineError> {
        validate_history(historical)?;
        space.validate()?;

        let steps = historical.len() * space.steps_per_bucket;
        self.base_config.budget.admit(steps)?;

        let mut alpha_box = space.alpha;
        let mut base_p_box = space.base_p;
        let mut points = (space.alpha_points, space.base_p_points);
        let mut evaluated = 0usize;
        let mut best: Option<Scored> = None;

        for round in 0..=space.refine_rounds {
            let alphas = linspace(alpha_box, points.0);
            let base_ps = linspace(base_p_box, points.1);
            let candidates: Vec<(f64, f64)> = alphas
                .iter()
                .flat_map(|a| base_ps.iter().map(move |p| (*a, *p)))
                .collect();

            let scored = self.score_all(&candidates, historical, space, steps)?;
            evaluated += scored.len();

            for candidate in scored {
                let better = best.as_ref().map_or(true, |b| candidate.sse < b.sse);
                if better {
                    best = Some(candidate);
                }
            }

            let incumbent = match &best {
                Some(b) => b,
                None => break,
            };
            log::debug!(
                "calibration round {}: best alpha={:.4} base_p={:.4} sse={:.4}",
                round,
                incumbent.alpha,
                incumbent.base_p,
                incumbent.sse
            );

            let alpha_step = grid_step(alpha_box, points.0);
            let base_p_step = grid_step(base_p_box, points.1);
            alpha_box = shrink(incumbent.alpha, alpha_step, space.alpha);
            base_p_box = shrink(incumbent.base_p, base_p_step, space.base_p);
            points = (REFINE_POINTS, REFINE_POINTS);
        }

        let best = best.ok_or_else(|| {
            EngineError::Worker("calibration produced no scored candidates".to_string())
        })?;

        log::info!(
            "calibrated alpha={:.4} base_p={:.4} residual={:.4} over {} candidates",
            best.alpha,
            best.base_p,
            best.sse,
            evaluated
        );

        Ok(CalibrationResult {
            alpha: best.alpha,
            base_p: best.base_p,
            residual_error: best.sse,
            candidates_evaluated: evaluated,
            fitted_series: best.series,
        })
    }

    /// Score one (alpha, base_p) pair
    fn score(
        &self,
        alpha: f64,
        base_p: f64,
        historical: &[f64],
        space: &SearchSpace,
        steps: usize,
    ) -> Result<Scored, EngineError> {
        let mut config = self.base_config.with_calibration(alpha, base_p);
        config.bucket_count = historical.len();
        let simulator = DurabilitySimulator::new(self.catalog, config)?;

        let summary = simulate_ensemble(
            &simulator,
            &self.agreement,
            &self.environment,
            self.profiles,
            steps,
            space.seed,
            space.replicates,
        )?;

        let mut series = summary.mean_series;
        series.resize(historical.len(), 0.0);
        let sse = series
            .iter()
            .zip(historical.iter())
            .map(|(sim, hist)| (sim - hist).powi(2))
            .sum();

        Ok(Scored {
            alpha,
            base_p,
            sse,
            series,
        })
    }

    /// Score every candidate, returning results in candidate order
    fn score_all(
        &self,
        candidates: &[(f64, f64)],
        historical: &[f64],
        space: &SearchSpace,
        steps: usize,
    ) -> Result<Vec<Scored>, EngineError> {
        if space.workers <= 1 || candidates.len() <= 1 {
            return candidates
                .iter()
                .map(|&(a, p)| self.score(a, p, historical, space, steps))
                .collect();
        }

        let workers = space.workers.min(candidates.len());
        let (job_tx, job_rx) = bounded::<(usize, f64, f64)>(workers * 2);
        let (result_tx, result_rx) = unbounded::<(usize, Result<Scored, EngineError>)>();

        let mut slots: Vec<Option<Result<Scored, EngineError>>> =
            (0..candidates.len()).map(|_| None).collect();

        let worker_failure = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                handles.push(scope.spawn(move || {
                    for (idx, alpha, base_p) in job_rx.iter() {
                        let scored = self.score(alpha, base_p, historical, space, steps);
                        if result_tx.send((idx, scored)).is_err() {
                            break;
                        }
                    }
                }));
            }
            drop(job_rx);
            drop(result_tx);

            for (idx, &(alpha, base_p)) in candidates.iter().enumerate() {
                if job_tx.send((idx, alpha, base_p)).is_err() {
                    break;
                }
            }
            drop(job_tx);

            for (idx, scored) in result_rx.iter() {
                slots[idx] = Some(scored);
            }

            handles
                .into_iter()
                .map(|h| h.join())
                .filter(Result::is_err)
                .count()
        });

        if worker_failure > 0 {
            return Err(EngineError::Worker(format!(
                "{} calibration worker(s) panicked",
                worker_failure
            )));
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| {
                    Err(EngineError::Worker(format!("candidate {} was never scored", idx)))
                })
            })
            .collect()
    }
}

fn validate_history(historical: &[f64]) -> Result<(), ValidationError> {
    if historical.is_empty() {
        return Err(ValidationError::InvalidHistory("series is empty".to_string()));
    }
    if let Some(bad) = historical.iter().find(|c| !c.is_finite() || **c < 0.0) {
        return Err(ValidationError::InvalidHistory(format!(
            "count {} is not a non-negative number",
            bad
        )));
    }
    Ok(())
}

/// `n` evenly spaced points over `[lo, hi]`; the midpoint when `n == 1`
fn linspace((lo, hi): (f64, f64), n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.5 * (lo + hi)],
        _ => (0..n)
            .map(|i| {
                if i == n - 1 {
                    hi
                } else {
                    lo + (hi - lo) * i as f64 / (n - 1) as f64
                }
            })
            .collect(),
    }
}

fn grid_step((lo, hi): (f64, f64), n: usize) -> f64 {
    if n <= 1 {
        0.5 * (hi - lo)
    } else {
        (hi - lo) / (n - 1) as f64
    }
}

/// Box of half-width `step` around `center`, clipped to `outer`
fn shrink(center: f64, step: f64, outer: (f64, f64)) -> (f64, f64) {
    ((center - step).max(outer.0), (center + step).min(outer.1))
}
