//! Negotiation Metrics
//!
//! Summaries derived from per-party utilities:
//! - **acceptance**: logistic acceptance per party, joint probability
//! - **zopa**: zone-of-possible-agreement ranges per numeric issue
//! - **fairness**: Nash product of surpluses over BATNA
//!
//! [`evaluate`] runs all three for one candidate agreement.

pub mod acceptance;
pub mod fairness;
pub mod zopa;

pub use acceptance::{acceptance_probability, overall_agreement_probability};
pub use fairness::nash_product;
pub use zopa::{find_zopa, IssueRange, ZopaConfig, ZopaConflict, ZopaReport, DEFAULT_ZOPA_THRESHOLD};

use crate::error::ValidationError;
use crate::models::{AgreementVector, IssueCatalog, PartyProfile};
use crate::utility::{utility_breakdown, UtilityBreakdown};
use serde::Serialize;

/// One party's view of a candidate agreement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyAssessment {
    pub party: String,
    pub utility: f64,
    pub acceptance_probability: f64,
    pub batna: f64,
    pub breakdown: UtilityBreakdown,
}

/// Everything the Evaluate operation reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegotiationReport {
    pub parties: Vec<PartyAssessment>,
    pub overall_probability: f64,
    pub zopa: ZopaReport,
    pub nash_product: f64,
}

impl NegotiationReport {
    pub fn party(&self, id: &str) -> Option<&PartyAssessment> {
        self.parties.iter().find(|p| p.party == id)
    }
}

/// Score one candidate agreement for every party
///
/// Validation (agreement against catalog, party list, ZOPA config) happens
/// before any metric is computed.
pub fn evaluate(
    catalog: &IssueCatalog,
    agreement: &AgreementVector,
    profiles: &[PartyProfile],
    zopa_config: &ZopaConfig,
) -> Result<NegotiationReport, ValidationError> {
    agreement.validate(catalog)?;
    zopa::check_parties(profiles)?;
    zopa_config.validate()?;

    let mut parties = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let breakdown = utility_breakdown(agreement, profile)?;
        parties.push(PartyAssessment {
            party: profile.id().to_string(),
            utility: breakdown.utility,
            acceptance_probability: acceptance_probability(breakdown.utility, profile.steepness()),
            batna: profile.batna(),
            breakdown,
        });
    }

    let probabilities: Vec<f64> = parties.iter().map(|p| p.acceptance_probability).collect();
    let outcomes: Vec<(f64, f64)> = parties.iter().map(|p| (p.utility, p.batna)).collect();

    let report = NegotiationReport {
        overall_probability: overall_agreement_probability(&probabilities)?,
        nash_product: nash_product(&outcomes)?,
        zopa: find_zopa(catalog, agreement, profiles, zopa_config)?,
        parties,
    };

    log::debug!(
        "evaluated agreement for {} parties: overall={:.4} nash={:.4} zopa={}",
        report.parties.len(),
        report.overall_probability,
        report.nash_product,
        report.zopa.exists
    );

    Ok(report)
}
