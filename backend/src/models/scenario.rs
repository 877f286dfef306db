//! Built-in maritime standoff issue space
//!
//! Six issues covering separation, presence, notice, communication, publicity
//! and encounter conduct. Risk effects encode the directions the durability
//! model relies on:
//! - wider standoff means less monitoring (more incidents) but fewer collisions
//! - more escorts means more encounters
//! - longer pre-notification, an always-on hotline and encounter-protocol
//!   commitments lower both frequency and severity
//! - a media embargo damps follow-on incidents

use crate::models::issue::{Issue, IssueCatalog, RiskEffect, RiskFactor};
use std::collections::BTreeMap;

pub const STANDOFF_NM: &str = "standoff_nm";
pub const ESCORT_COUNT: &str = "escort_count";
pub const PRE_NOTIFICATION_HOURS: &str = "pre_notification_hours";
pub const HOTLINE: &str = "hotline";
pub const EMBARGO_HOURS: &str = "embargo_hours";
pub const ENCOUNTER_PROTOCOL: &str = "encounter_protocol";

impl IssueCatalog {
    /// The maritime standoff scenario shipped with the engine
    pub fn maritime_standoff() -> IssueCatalog {
        let hotline_factors: BTreeMap<String, RiskFactor> = [
            ("none", RiskFactor::new(1.30, 1.15, 1.10)),
            ("business_hours", RiskFactor::NEUTRAL),
            ("always_available", RiskFactor::new(0.70, 0.85, 0.90)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let protocol_factors: BTreeMap<String, RiskFactor> = [
            ("cues_code", RiskFactor::new(0.90, 0.90, 0.80)),
            ("no_lasers", RiskFactor::new(0.95, 0.95, 1.00)),
            ("unarmed_escorts", RiskFactor::new(0.95, 0.85, 0.90)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let issues = vec![
            Issue::numeric(STANDOFF_NM, 0.0, 12.0).with_risk(RiskEffect::Scaled {
                at_min: RiskFactor::new(0.90, 1.10, 1.40),
                at_max: RiskFactor::new(1.20, 0.90, 0.50),
            }),
            Issue::numeric(ESCORT_COUNT, 0.0, 6.0).with_risk(RiskEffect::Scaled {
                at_min: RiskFactor::new(0.85, 0.95, 0.90),
                at_max: RiskFactor::new(1.40, 1.10, 1.30),
            }),
            Issue::numeric(PRE_NOTIFICATION_HOURS, 0.0, 72.0).with_risk(RiskEffect::Scaled {
                at_min: RiskFactor::new(1.25, 1.05, 1.10),
                at_max: RiskFactor::new(0.75, 0.95, 0.90),
            }),
            Issue::categorical(HOTLINE, ["none", "business_hours", "always_available"])
                .with_risk(RiskEffect::ByChoice {
                    factors: hotline_factors,
                }),
            Issue::numeric(EMBARGO_HOURS, 0.0, 48.0).with_risk(RiskEffect::Scaled {
                at_min: RiskFactor::new(1.10, 1.05, 1.00),
                at_max: RiskFactor::new(0.90, 0.95, 1.00),
            }),
            Issue::flags(ENCOUNTER_PROTOCOL, ["cues_code", "no_lasers", "unarmed_escorts"])
                .with_risk(RiskEffect::ByFlag {
                    factors: protocol_factors,
                }),
        ];

        // Static data above is well-formed; a failure here is a programming error.
        match IssueCatalog::new(issues) {
            Ok(catalog) => catalog,
            Err(err) => panic!("built-in maritime catalog is invalid: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueDomain;

    #[test]
    fn test_maritime_catalog_contents() {
        let catalog = IssueCatalog::maritime_standoff();
        assert_eq!(catalog.len(), 6);
        assert_eq!(
            catalog.get(STANDOFF_NM).unwrap().domain,
            IssueDomain::Numeric { min: 0.0, max: 12.0 }
        );
        assert!(catalog.issues().all(|i| i.risk.is_some()));
    }

    #[test]
    fn test_catalog_json_round_trip_revalidates() {
        let catalog = IssueCatalog::maritime_standoff();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: IssueCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);

        let broken = r#"[{"name":"x","domain":{"kind":"numeric","min":5.0,"max":1.0}}]"#;
        assert!(serde_json::from_str::<IssueCatalog>(broken).is_err());
    }
}
