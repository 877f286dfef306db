//! Utility Engine
//!
//! Converts an agreement vector and a party profile into one scalar utility
//! in [0, 1]. Deterministic: no randomness, no shared state.
//!
//! # Algorithm
//!
//! ```text
//! 1. raw       = Σ_i  w_i · v_i(x_i)                 (applicable issues only)
//! 2. adjusted  = raw + Σ_i w_i · g(v_i(x_i) − v_i(ref_i))
//!                g(d) = d        if d >= 0   (gain, unscaled)
//!                g(d) = λ · d    if d <  0   (loss, scaled by loss aversion)
//! 3. utility   = clamp((adjusted − BATNA) / (1 − BATNA), 0, 1)
//! ```
//!
//! Issues missing from the agreement or from the profile contribute nothing.
//! Composite (flag) issues carry their internal sub-weights inside the value
//! function. `adjusted` may leave [0, 1]; only the final value is clamped.
//!
//! # Degenerate BATNA
//!
//! A BATNA of exactly 1.0 leaves nothing to normalize against. The result is
//! 1.0 if `adjusted >= 1.0` and 0.0 otherwise; the breakdown flags it.

use crate::error::ValidationError;
use crate::models::{AgreementVector, PartyProfile};
use serde::Serialize;

/// Per-issue detail of a utility evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueContribution {
    pub issue: String,
    pub weight: f64,

    /// Value-function score of the agreed value
    pub value: f64,

    /// Value-function score of the reference point, if one is declared
    pub reference_value: Option<f64>,

    /// `weight × value`
    pub weighted: f64,

    /// Loss-averse adjustment added on top of `weighted`
    pub adjustment: f64,
}

/// Full trace of a utility evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilityBreakdown {
    pub party: String,
    pub contributions: Vec<IssueContribution>,
    pub raw: f64,
    pub adjustment: f64,
    pub adjusted: f64,
    pub batna: f64,
    pub utility: f64,

    /// BATNA was exactly 1.0
    pub degenerate: bool,
}

impl UtilityBreakdown {
    /// True when at least one issue of the profile appeared in the agreement
    pub fn is_applicable(&self) -> bool {
        !self.contributions.is_empty()
    }
}

/// Utility of `agreement` for `profile`, in [0, 1]
///
/// The agreement and the profile are usually validated against the same
/// catalog. Each agreed value is still checked against the domain the profile
/// was built on, so a vector from a different catalog cannot be scored past
/// the ends of a party's issue range.
///
/// # Errors
/// - `OutOfDomain` when an agreed value lies outside the profile's domain
/// - `KindMismatch` / `IncompleteValueFunction` when it does not fit the
///   party's value function for that issue
pub fn utility(agreement: &AgreementVector, profile: &PartyProfile) -> Result<f64, ValidationError> {
    Ok(utility_breakdown(agreement, profile)?.utility)
}

/// Utility with every intermediate term
pub fn utility_breakdown(
    agreement: &AgreementVector,
    profile: &PartyProfile,
) -> Result<UtilityBreakdown, ValidationError> {
    let lambda = profile.loss_aversion();
    let mut contributions = Vec::new();

    for (issue, pref) in profile.preferences() {
        let value = match agreement.get(issue) {
            Some(v) => v,
            None => continue,
        };
        if let Some(domain) = profile.domain(issue) {
            domain.check(issue, value)?;
        }

        let score = pref.value_function.evaluate(issue, value)?;
        let reference_value = match &pref.reference {
            Some(reference) => Some(pref.value_function.evaluate(issue, reference)?),
            None => None,
        };

        let adjustment = match reference_value {
            Some(reference) => {
                let delta = score - reference;
                let scaled = if delta < 0.0 { lambda * delta } else { delta };
                pref.weight * scaled
            }
            None => 0.0,
        };

        contributions.push(IssueContribution {
            issue: issue.clone(),
            weight: pref.weight,
            value: score,
            reference_value,
            weighted: pref.weight * score,
            adjustment,
        });
    }

    let batna = profile.batna();
    let degenerate = batna >= 1.0;

    if contributions.is_empty() {
        return Ok(UtilityBreakdown {
            party: profile.id().to_string(),
            contributions,
            raw: 0.0,
            adjustment: 0.0,
            adjusted: 0.0,
            batna,
            utility: 0.0,
            degenerate,
        });
    }

    let raw: f64 = contributions.iter().map(|c| c.weighted).sum();
    let adjustment: f64 = contributions.iter().map(|c| c.adjustment).sum();
    let adjusted = raw + adjustment;

    Ok(UtilityBreakdown {
        party: profile.id().to_string(),
        contributions,
        raw,
        adjustment,
        adjusted,
        batna,
        utility: normalize(adjusted, batna),
        degenerate,
    })
}

/// Rescale so BATNA maps to 0 and the ideal (1.0) maps to 1, clamped
pub fn normalize(adjusted: f64, batna: f64) -> f64 {
    if batna >= 1.0 {
        return if adjusted >= 1.0 { 1.0 } else { 0.0 };
    }
    let scaled = (adjusted - batna) / (1.0 - batna);
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(0.0, 1.0)
}
