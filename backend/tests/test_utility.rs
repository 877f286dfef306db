//! Tests for the utility engine
//!
//! Three stages: weighted raw score, loss-averse adjustment around reference
//! points, BATNA normalization clamped into [0, 1].

use negotiation_engine_core_rs::models::{
    Breakpoint, Issue, IssueCatalog, IssueValue, PartyProfile, ValueFunction,
};
use negotiation_engine_core_rs::utility::normalize;
use negotiation_engine_core_rs::{utility, utility_breakdown, AgreementVector, ValidationError};
use std::collections::{BTreeMap, BTreeSet};

fn catalog() -> IssueCatalog {
    IssueCatalog::maritime_standoff()
}

fn standoff(value: f64) -> AgreementVector {
    AgreementVector::builder()
        .set("standoff_nm", value)
        .build(&catalog())
        .unwrap()
}

fn standoff_party(batna: f64) -> PartyProfile {
    PartyProfile::builder("coast_guard")
        .batna(batna)
        .issue("standoff_nm", 1.0, ValueFunction::Linear { worst: 0.0, best: 12.0 })
        .build(&catalog())
        .unwrap()
}

/// Party with a reference point of 2 nm on a 0→6 linear scale
fn anchored_party() -> PartyProfile {
    PartyProfile::builder("fisheries")
        .issue_with_reference(
            "standoff_nm",
            1.0,
            ValueFunction::Linear { worst: 0.0, best: 6.0 },
            2.0,
        )
        .build(&catalog())
        .unwrap()
}

// ============================================================================
// Raw score and normalization
// ============================================================================

#[test]
fn test_linear_score_without_reference() {
    let u = utility(&standoff(9.0), &standoff_party(0.0)).unwrap();
    assert!((u - 0.75).abs() < 1e-12);
}

#[test]
fn test_batna_equivalent_agreement_scores_zero() {
    // raw 0.5 == BATNA 0.5
    let u = utility(&standoff(6.0), &standoff_party(0.5)).unwrap();
    assert!(u.abs() < 1e-12);
}

#[test]
fn test_below_batna_clamps_to_zero() {
    let u = utility(&standoff(1.0), &standoff_party(0.5)).unwrap();
    assert_eq!(u, 0.0);
}

#[test]
fn test_normalization_rescales_surplus() {
    // raw 0.75, BATNA 0.5 → (0.75 - 0.5) / 0.5
    let u = utility(&standoff(9.0), &standoff_party(0.5)).unwrap();
    assert!((u - 0.5).abs() < 1e-12);
}

#[test]
fn test_normalize_clamps_both_ends() {
    assert_eq!(normalize(1.8, 0.2), 1.0);
    assert_eq!(normalize(-0.4, 0.2), 0.0);
}

#[test]
fn test_no_applicable_issue_scores_zero() {
    let agreement = AgreementVector::builder()
        .set("hotline", "none")
        .build(&catalog())
        .unwrap();

    let breakdown = utility_breakdown(&agreement, &standoff_party(0.0)).unwrap();
    assert!(!breakdown.is_applicable());
    assert_eq!(breakdown.utility, 0.0);
}

// ============================================================================
// Degenerate BATNA
// ============================================================================

#[test]
fn test_degenerate_batna_ideal_outcome_scores_one() {
    let breakdown = utility_breakdown(&standoff(12.0), &standoff_party(1.0)).unwrap();
    assert!(breakdown.degenerate);
    assert_eq!(breakdown.utility, 1.0);
}

#[test]
fn test_degenerate_batna_anything_less_scores_zero() {
    let breakdown = utility_breakdown(&standoff(11.9), &standoff_party(1.0)).unwrap();
    assert!(breakdown.degenerate);
    assert_eq!(breakdown.utility, 0.0);
}

// ============================================================================
// Loss aversion
// ============================================================================

#[test]
fn test_gain_over_reference_is_unscaled() {
    // score 0.5, reference 1/3 → gain 1/6
    let breakdown = utility_breakdown(&standoff(3.0), &anchored_party()).unwrap();
    assert!((breakdown.raw - 0.5).abs() < 1e-12);
    assert!((breakdown.adjustment - 1.0 / 6.0).abs() < 1e-12);
    assert!((breakdown.utility - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_loss_weighs_lambda_times_equal_gain() {
    let gain = utility_breakdown(&standoff(3.0), &anchored_party()).unwrap();
    let loss = utility_breakdown(&standoff(1.0), &anchored_party()).unwrap();

    assert!(loss.adjustment < 0.0);
    assert!((loss.adjustment + 2.25 * gain.adjustment).abs() < 1e-12);
    // adjusted = 1/6 - 0.375 < 0, clamped
    assert!(loss.adjusted < 0.0);
    assert_eq!(loss.utility, 0.0);
}

#[test]
fn test_custom_loss_aversion_applies() {
    let party = PartyProfile::builder("calm")
        .loss_aversion(1.0)
        .issue_with_reference(
            "standoff_nm",
            1.0,
            ValueFunction::Linear { worst: 0.0, best: 6.0 },
            2.0,
        )
        .build(&catalog())
        .unwrap();

    let breakdown = utility_breakdown(&standoff(1.0), &party).unwrap();
    assert!((breakdown.adjustment + 1.0 / 6.0).abs() < 1e-12);
}

#[test]
fn test_at_reference_no_adjustment() {
    let breakdown = utility_breakdown(&standoff(2.0), &anchored_party()).unwrap();
    assert_eq!(breakdown.adjustment, 0.0);
    assert_eq!(breakdown.contributions[0].reference_value, Some(breakdown.contributions[0].value));
}

// ============================================================================
// Value function shapes
// ============================================================================

#[test]
fn test_piecewise_interpolates_between_breakpoints() {
    let party = PartyProfile::builder("navy")
        .issue(
            "standoff_nm",
            1.0,
            ValueFunction::Piecewise {
                breakpoints: vec![
                    Breakpoint { x: 0.0, y: 0.0 },
                    Breakpoint { x: 6.0, y: 0.8 },
                    Breakpoint { x: 12.0, y: 1.0 },
                ],
            },
        )
        .build(&catalog())
        .unwrap();

    assert!((utility(&standoff(3.0), &party).unwrap() - 0.4).abs() < 1e-12);
    assert!((utility(&standoff(9.0), &party).unwrap() - 0.9).abs() < 1e-12);
}

#[test]
fn test_decreasing_linear_function() {
    let party = PartyProfile::builder("navy")
        .issue("escort_count", 1.0, ValueFunction::Linear { worst: 6.0, best: 0.0 })
        .build(&catalog())
        .unwrap();
    let agreement = AgreementVector::builder()
        .set("escort_count", 1.5)
        .build(&catalog())
        .unwrap();

    assert!((utility(&agreement, &party).unwrap() - 0.75).abs() < 1e-12);
}

#[test]
fn test_flag_composite_sums_sub_weights() {
    let weights: BTreeMap<String, f64> = [
        ("cues_code".to_string(), 0.5),
        ("no_lasers".to_string(), 0.3),
        ("unarmed_escorts".to_string(), 0.2),
    ]
    .into();
    let party = PartyProfile::builder("navy")
        .issue(
            "encounter_protocol",
            1.0,
            ValueFunction::Flags {
                weights,
                undesired: BTreeSet::new(),
            },
        )
        .build(&catalog())
        .unwrap();
    let agreement = AgreementVector::builder()
        .set("encounter_protocol", IssueValue::flags(["cues_code", "no_lasers"]))
        .build(&catalog())
        .unwrap();

    assert!((utility(&agreement, &party).unwrap() - 0.8).abs() < 1e-12);
}

#[test]
fn test_undesired_flag_scores_when_absent() {
    let weights: BTreeMap<String, f64> =
        [("cues_code".to_string(), 0.5), ("no_lasers".to_string(), 0.5)].into();
    let party = PartyProfile::builder("fleet")
        .issue(
            "encounter_protocol",
            1.0,
            ValueFunction::Flags {
                weights,
                undesired: ["no_lasers".to_string()].into(),
            },
        )
        .build(&catalog())
        .unwrap();

    let none = AgreementVector::builder()
        .set("encounter_protocol", IssueValue::flags(Vec::<String>::new()))
        .build(&catalog())
        .unwrap();
    let lasers_banned = AgreementVector::builder()
        .set("encounter_protocol", IssueValue::flags(["no_lasers"]))
        .build(&catalog())
        .unwrap();

    assert!((utility(&none, &party).unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(utility(&lasers_banned, &party).unwrap(), 0.0);
}

// ============================================================================
// Multi-issue scenario
// ============================================================================

#[test]
fn test_multi_issue_breakdown_matches_hand_computation() {
    let catalog = catalog();
    let party = PartyProfile::builder("coast_guard")
        .batna(0.25)
        .issue_with_reference(
            "standoff_nm",
            0.5,
            ValueFunction::Linear { worst: 0.0, best: 6.0 },
            2.0,
        )
        .issue_with_reference(
            "hotline",
            0.3,
            ValueFunction::Categorical {
                scores: [
                    ("none".to_string(), 0.0),
                    ("business_hours".to_string(), 0.5),
                    ("always_available".to_string(), 1.0),
                ]
                .into(),
            },
            "business_hours",
        )
        .issue(
            "pre_notification_hours",
            0.2,
            ValueFunction::Linear { worst: 0.0, best: 24.0 },
        )
        .build(&catalog)
        .unwrap();
    let agreement = AgreementVector::builder()
        .set("standoff_nm", 3.0)
        .set("escort_count", 1.0)
        .set("pre_notification_hours", 12.0)
        .set("hotline", "always_available")
        .set("embargo_hours", 8.0)
        .build(&catalog)
        .unwrap();

    let breakdown = utility_breakdown(&agreement, &party).unwrap();

    // raw = 0.5·0.5 + 0.3·1.0 + 0.2·0.5
    assert!((breakdown.raw - 0.65).abs() < 1e-12);
    // gains: 0.5·(0.5 − 1/3) + 0.3·(1.0 − 0.5)
    assert!((breakdown.adjustment - (0.5 / 6.0 + 0.15)).abs() < 1e-12);
    let expected = (0.65 + 0.5 / 6.0 + 0.15 - 0.25) / 0.75;
    assert!((breakdown.utility - expected).abs() < 1e-12);
    assert_eq!(breakdown.contributions.len(), 3);
}

// ============================================================================
// Catalog mismatch
// ============================================================================

#[test]
fn test_value_outside_profile_domain_rejected() {
    // The agreement's catalog allows 30 nm, the party's only 12 nm
    let wide = IssueCatalog::new(vec![Issue::numeric("standoff_nm", 0.0, 30.0)]).unwrap();
    let agreement = AgreementVector::builder()
        .set("standoff_nm", 20.0)
        .build(&wide)
        .unwrap();

    let err = utility(&agreement, &standoff_party(0.0)).unwrap_err();
    assert!(matches!(err, ValidationError::OutOfDomain { ref issue, .. } if issue == "standoff_nm"));
}

#[test]
fn test_value_inside_profile_domain_scored_across_catalogs() {
    let wide = IssueCatalog::new(vec![Issue::numeric("standoff_nm", 0.0, 30.0)]).unwrap();
    let agreement = AgreementVector::builder()
        .set("standoff_nm", 6.0)
        .build(&wide)
        .unwrap();

    let u = utility(&agreement, &standoff_party(0.0)).unwrap();
    assert!((u - 0.5).abs() < 1e-12);
}
