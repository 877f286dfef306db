//! Tests for calibration of alpha and base_p
//!
//! Histories are generated by the simulator itself under known constants,
//! then fitted back. Only the product alpha × base_p is identifiable from
//! counts, so the checks target the product.

use negotiation_engine_core_rs::calibration::{ALPHA_LIMITS, BASE_P_LIMITS};
use negotiation_engine_core_rs::models::IssueCatalog;
use negotiation_engine_core_rs::{
    simulate_ensemble, AgreementVector, Calibrator, DurabilitySimulator, EngineError,
    EnvironmentConfig, MediaVisibility, SearchSpace, SimulationConfig, ValidationError, Weather,
};

const BUCKETS: usize = 10;

fn quiet_env() -> EnvironmentConfig {
    EnvironmentConfig::new(Weather::Calm, MediaVisibility::Low)
}

fn space() -> SearchSpace {
    SearchSpace {
        steps_per_bucket: 50,
        replicates: 5,
        seed: 17,
        ..SearchSpace::default()
    }
}

/// Mean bucketed series the simulator produces under (alpha, base_p)
fn history(catalog: &IssueCatalog, alpha: f64, base_p: f64, space: &SearchSpace) -> Vec<f64> {
    let mut config = SimulationConfig::default().with_calibration(alpha, base_p);
    config.bucket_count = BUCKETS;
    let sim = DurabilitySimulator::new(catalog, config).unwrap();
    let agreement = AgreementVector::builder().build(catalog).unwrap();
    simulate_ensemble(
        &sim,
        &agreement,
        &quiet_env(),
        &[],
        BUCKETS * space.steps_per_bucket,
        space.seed,
        space.replicates,
    )
    .unwrap()
    .mean_series
}

fn calibrator(catalog: &IssueCatalog) -> Calibrator<'_> {
    Calibrator::new(
        catalog,
        SimulationConfig::default(),
        AgreementVector::builder().build(catalog).unwrap(),
        quiet_env(),
        &[],
    )
    .unwrap()
}

// ============================================================================
// Fitting
// ============================================================================

#[test]
fn test_recovers_generating_rate() {
    let catalog = IssueCatalog::maritime_standoff();
    let space = space();
    let historical = history(&catalog, 1.5, 0.2, &space);

    let fit = calibrator(&catalog).calibrate(&historical, &space).unwrap();

    assert!(
        (fit.alpha * fit.base_p - 0.3).abs() < 0.05,
        "fitted alpha={} base_p={}",
        fit.alpha,
        fit.base_p
    );
    assert!(fit.alpha >= ALPHA_LIMITS.0 && fit.alpha <= ALPHA_LIMITS.1);
    assert!(fit.base_p >= BASE_P_LIMITS.0 && fit.base_p <= BASE_P_LIMITS.1);
    assert_eq!(fit.fitted_series.len(), BUCKETS);
}

#[test]
fn test_residual_is_sse_of_fitted_series() {
    let catalog = IssueCatalog::maritime_standoff();
    let space = space();
    let historical = history(&catalog, 1.0, 0.1, &space);

    let fit = calibrator(&catalog).calibrate(&historical, &space).unwrap();
    let sse: f64 = fit
        .fitted_series
        .iter()
        .zip(historical.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();

    assert!((fit.residual_error - sse).abs() < 1e-9);
}

#[test]
fn test_result_independent_of_worker_count() {
    let catalog = IssueCatalog::maritime_standoff();
    let single = space();
    let pooled = SearchSpace {
        workers: 4,
        ..space()
    };
    let historical = history(&catalog, 2.0, 0.15, &single);

    let a = calibrator(&catalog).calibrate(&historical, &single).unwrap();
    let b = calibrator(&catalog).calibrate(&historical, &pooled).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_candidate_count_follows_grid_and_rounds() {
    let catalog = IssueCatalog::maritime_standoff();
    let historical = vec![2.0; 5];

    let grid_only = SearchSpace {
        alpha_points: 3,
        base_p_points: 4,
        refine_rounds: 0,
        steps_per_bucket: 5,
        replicates: 1,
        ..SearchSpace::default()
    };
    let refined = SearchSpace {
        refine_rounds: 2,
        ..grid_only.clone()
    };

    let fit = calibrator(&catalog).calibrate(&historical, &grid_only).unwrap();
    assert_eq!(fit.candidates_evaluated, 12);

    let fit = calibrator(&catalog).calibrate(&historical, &refined).unwrap();
    assert_eq!(fit.candidates_evaluated, 12 + 2 * 25);
}

#[test]
fn test_calibration_leaves_base_config_untouched() {
    let catalog = IssueCatalog::maritime_standoff();
    let space = space();
    let historical = history(&catalog, 2.5, 0.4, &space);
    let base = SimulationConfig::default();

    let fit = calibrator(&catalog).calibrate(&historical, &space).unwrap();
    let tuned = base.with_calibration(fit.alpha, fit.base_p);

    assert_eq!(base, SimulationConfig::default());
    assert_eq!(tuned.alpha, fit.alpha);
    assert_eq!(tuned.base_p, fit.base_p);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_empty_history_rejected() {
    let catalog = IssueCatalog::maritime_standoff();
    let err = calibrator(&catalog).calibrate(&[], &space()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::InvalidHistory(_))
    ));
}

#[test]
fn test_negative_count_rejected() {
    let catalog = IssueCatalog::maritime_standoff();
    let err = calibrator(&catalog).calibrate(&[3.0, -1.0, 2.0], &space()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::InvalidHistory(_))
    ));
}

#[test]
fn test_bounds_outside_limits_rejected() {
    let catalog = IssueCatalog::maritime_standoff();
    let too_wide = SearchSpace {
        base_p: (0.01, 0.5),
        ..space()
    };
    let inverted = SearchSpace {
        alpha: (2.0, 1.0),
        ..space()
    };

    for bad in [too_wide, inverted] {
        let err = calibrator(&catalog).calibrate(&[1.0, 2.0], &bad).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidSearchSpace(_))
        ));
    }
}

#[test]
fn test_zero_workers_rejected() {
    let catalog = IssueCatalog::maritime_standoff();
    let bad = SearchSpace {
        workers: 0,
        ..space()
    };
    assert!(calibrator(&catalog).calibrate(&[1.0], &bad).is_err());
}

#[test]
fn test_search_space_from_json_defaults() {
    let space: SearchSpace = serde_json::from_str(r#"{"alpha": [1.0, 2.0], "workers": 2}"#).unwrap();
    assert_eq!(space.alpha, (1.0, 2.0));
    assert_eq!(space.base_p, BASE_P_LIMITS);
    assert_eq!(space.workers, 2);
    assert!(space.validate().is_ok());
}
