//! Agreement risk modifier and incident type model
//!
//! The modifier is a pure function of the agreement vector and the catalog's
//! per-issue [`RiskEffect`](crate::models::RiskEffect)s: the channel-wise
//! product of every applicable issue's factor. It never looks at party
//! utilities.

use crate::models::{AgreementVector, IncidentType, IssueCatalog, RiskFactor};

/// Sampling parameters for one incident type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentProfile {
    pub kind: IncidentType,

    /// Base categorical weight before safety conditioning
    pub weight: f64,

    /// Triangular severity distribution (min, mode, max)
    pub severity: (f64, f64, f64),
}

/// Base incident mix, in [`IncidentType::ALL`] order
pub const INCIDENT_PROFILES: [IncidentProfile; 5] = [
    IncidentProfile {
        kind: IncidentType::WaterCannon,
        weight: 0.25,
        severity: (0.30, 0.50, 0.80),
    },
    IncidentProfile {
        kind: IncidentType::Ramming,
        weight: 0.10,
        severity: (0.50, 0.75, 1.00),
    },
    IncidentProfile {
        kind: IncidentType::Detention,
        weight: 0.10,
        severity: (0.40, 0.60, 0.90),
    },
    IncidentProfile {
        kind: IncidentType::NearMiss,
        weight: 0.30,
        severity: (0.10, 0.25, 0.50),
    },
    IncidentProfile {
        kind: IncidentType::Harassment,
        weight: 0.25,
        severity: (0.05, 0.20, 0.40),
    },
];

/// Near-miss slot, drawn if no type weight is positive
pub const FALLBACK_INDEX: usize = 3;

/// Combined risk factor of an agreement
///
/// Issues without a declared risk effect, or absent from the catalog, are
/// neutral. Callers validate the agreement first.
pub fn agreement_risk(catalog: &IssueCatalog, agreement: &AgreementVector) -> RiskFactor {
    agreement
        .iter()
        .filter_map(|(name, value)| {
            let issue = catalog.get(name)?;
            let effect = issue.risk.as_ref()?;
            Some(effect.factor_for(&issue.domain, value))
        })
        .fold(RiskFactor::NEUTRAL, RiskFactor::combine)
}

/// Categorical weights for incident types under `risk`
///
/// The collision channel scales physical-contact types; the freed mass moves
/// to the remaining types through renormalization at sampling time.
pub fn type_weights(risk: &RiskFactor) -> [f64; 5] {
    let mut weights = [0.0; 5];
    for (slot, profile) in weights.iter_mut().zip(INCIDENT_PROFILES.iter()) {
        *slot = if profile.kind.is_collision() {
            profile.weight * risk.collision
        } else {
            profile.weight
        };
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scenario::{HOTLINE, STANDOFF_NM};

    #[test]
    fn test_empty_agreement_is_neutral() {
        let catalog = IssueCatalog::maritime_standoff();
        let agreement = AgreementVector::builder().build(&catalog).unwrap();
        assert_eq!(agreement_risk(&catalog, &agreement), RiskFactor::NEUTRAL);
    }

    #[test]
    fn test_hotline_lowers_probability() {
        let catalog = IssueCatalog::maritime_standoff();
        let with = AgreementVector::builder()
            .set(HOTLINE, "always_available")
            .build(&catalog)
            .unwrap();
        let without = AgreementVector::builder()
            .set(HOTLINE, "none")
            .build(&catalog)
            .unwrap();
        assert!(
            agreement_risk(&catalog, &with).probability
                < agreement_risk(&catalog, &without).probability
        );
    }

    #[test]
    fn test_wide_standoff_shifts_away_from_collisions() {
        let catalog = IssueCatalog::maritime_standoff();
        let close = AgreementVector::builder().set(STANDOFF_NM, 0.0).build(&catalog).unwrap();
        let wide = AgreementVector::builder().set(STANDOFF_NM, 12.0).build(&catalog).unwrap();

        let close_w = type_weights(&agreement_risk(&catalog, &close));
        let wide_w = type_weights(&agreement_risk(&catalog, &wide));

        let share = |w: &[f64; 5]| (w[0] + w[1]) / w.iter().sum::<f64>();
        assert!(share(&wide_w) < share(&close_w));
    }

    #[test]
    fn test_fallback_is_near_miss() {
        assert_eq!(INCIDENT_PROFILES[FALLBACK_INDEX].kind, IncidentType::NearMiss);
    }

    #[test]
    fn test_profiles_in_type_order() {
        for (profile, kind) in INCIDENT_PROFILES.iter().zip(IncidentType::ALL.iter()) {
            assert_eq!(profile.kind, *kind);
            let (min, mode, max) = profile.severity;
            assert!(0.0 <= min && min <= mode && mode <= max && max <= 1.0);
        }
    }
}
