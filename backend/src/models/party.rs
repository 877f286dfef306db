//! Party preference profiles
//!
//! A profile describes how one party scores an agreement:
//! - per-issue weights (non-negative, summing to 1)
//! - per-issue value functions mapping a concrete value to [0, 1]
//! - optional per-issue reference points for the loss-averse adjustment
//! - a BATNA utility, a loss-aversion coefficient and a risk attitude
//!
//! Value functions are a closed set of data shapes ([`ValueFunction`]) rather
//! than arbitrary code, so profiles can be shipped as JSON and checked up
//! front. Profiles are validated against an [`IssueCatalog`] once, in
//! [`PartyProfile::new`]; after that every value function is total over its
//! issue's domain.

use crate::error::ValidationError;
use crate::models::issue::{IssueCatalog, IssueDomain, IssueValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tolerance used for every "sums to 1" check
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Default loss-aversion coefficient (Kahneman & Tversky)
pub const DEFAULT_LOSS_AVERSION: f64 = 2.25;

// ============================================================================
// Value Functions
// ============================================================================

/// A single (value, score) point of a piecewise-linear value function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub x: f64,
    pub y: f64,
}

/// Deterministic, monotonic mapping from an issue value to satisfaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ValueFunction {
    /// 0 at `worst`, 1 at `best`, linear in between, saturating outside.
    /// `worst > best` expresses "smaller is better".
    Linear { worst: f64, best: f64 },

    /// Linear interpolation through breakpoints sorted by `x`; scores must
    /// be monotonic. Values beyond the ends take the end score.
    Piecewise { breakpoints: Vec<Breakpoint> },

    /// Fixed score per categorical option
    Categorical { scores: BTreeMap<String, f64> },

    /// Composite score over a flag set. Each flag carries a sub-weight
    /// (sub-weights sum to 1); a desired flag scores its weight when
    /// selected, an undesired flag scores its weight when absent.
    Flags {
        weights: BTreeMap<String, f64>,
        #[serde(default)]
        undesired: BTreeSet<String>,
    },
}

impl ValueFunction {
    /// Evaluate the function at `value`
    ///
    /// # Errors
    /// `KindMismatch` when the value shape does not fit the function, and
    /// `IncompleteValueFunction` for an option the function has no score for.
    pub fn evaluate(&self, issue: &str, value: &IssueValue) -> Result<f64, ValidationError> {
        let score = match (self, value) {
            (ValueFunction::Linear { worst, best }, IssueValue::Number(x)) => {
                ((x - worst) / (best - worst)).clamp(0.0, 1.0)
            }
            (ValueFunction::Piecewise { breakpoints }, IssueValue::Number(x)) => {
                interpolate(breakpoints, *x)
            }
            (ValueFunction::Categorical { scores }, IssueValue::Choice(choice)) => {
                *scores
                    .get(choice)
                    .ok_or_else(|| ValidationError::IncompleteValueFunction {
                        issue: issue.to_string(),
                        missing: choice.clone(),
                    })?
            }
            (ValueFunction::Flags { weights, undesired }, IssueValue::Flags(selected)) => weights
                .iter()
                .filter(|(flag, _)| selected.contains(*flag) != undesired.contains(*flag))
                .map(|(_, w)| w)
                .sum::<f64>()
                .clamp(0.0, 1.0),
            _ => {
                return Err(ValidationError::KindMismatch {
                    issue: issue.to_string(),
                    expected: self.expected_kind(),
                })
            }
        };
        Ok(score)
    }

    fn expected_kind(&self) -> &'static str {
        match self {
            ValueFunction::Linear { .. } | ValueFunction::Piecewise { .. } => "numeric",
            ValueFunction::Categorical { .. } => "categorical",
            ValueFunction::Flags { .. } => "flags",
        }
    }

    /// Structural checks plus totality over `domain`
    fn validate(&self, issue: &str, domain: &IssueDomain) -> Result<(), ValidationError> {
        let malformed = |reason: &str| ValidationError::MalformedValueFunction {
            issue: issue.to_string(),
            reason: reason.to_string(),
        };
        let check_score = |value: f64| {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ValidationError::ValueOutOfRange {
                    issue: issue.to_string(),
                    value,
                })
            }
        };

        if self.expected_kind() != domain.kind() {
            return Err(ValidationError::KindMismatch {
                issue: issue.to_string(),
                expected: domain.kind(),
            });
        }

        match (self, domain) {
            (ValueFunction::Linear { worst, best }, _) => {
                if !worst.is_finite() || !best.is_finite() {
                    return Err(malformed("endpoints must be finite"));
                }
                if worst == best {
                    return Err(malformed("worst and best must differ"));
                }
            }
            (ValueFunction::Piecewise { breakpoints }, _) => {
                if breakpoints.len() < 2 {
                    return Err(malformed("at least two breakpoints required"));
                }
                for bp in breakpoints {
                    if !bp.x.is_finite() {
                        return Err(malformed("breakpoint positions must be finite"));
                    }
                    check_score(bp.y)?;
                }
                if breakpoints.windows(2).any(|w| w[1].x <= w[0].x) {
                    return Err(malformed("breakpoints must be strictly increasing in x"));
                }
                let rising = breakpoints.windows(2).all(|w| w[1].y >= w[0].y);
                let falling = breakpoints.windows(2).all(|w| w[1].y <= w[0].y);
                if !rising && !falling {
                    return Err(ValidationError::NonMonotonic {
                        issue: issue.to_string(),
                    });
                }
            }
            (ValueFunction::Categorical { scores }, IssueDomain::Categorical { options }) => {
                if let Some(missing) = options.iter().find(|o| !scores.contains_key(*o)) {
                    return Err(ValidationError::IncompleteValueFunction {
                        issue: issue.to_string(),
                        missing: missing.clone(),
                    });
                }
                if let Some(extra) = scores.keys().find(|k| !options.contains(*k)) {
                    return Err(malformed(&format!("score for unknown option '{}'", extra)));
                }
                for score in scores.values() {
                    check_score(*score)?;
                }
            }
            (ValueFunction::Flags { weights, undesired }, IssueDomain::Flags { flags }) => {
                if let Some(extra) = weights.keys().find(|k| !flags.contains(*k)) {
                    return Err(malformed(&format!("weight for unknown flag '{}'", extra)));
                }
                if undesired.iter().any(|f| !weights.contains_key(f)) {
                    return Err(malformed("undesired flags must carry a weight"));
                }
                if weights.values().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(malformed("flag weights must be non-negative"));
                }
                let sum: f64 = weights.values().sum();
                if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                    return Err(malformed(&format!("flag weights sum to {}, expected 1", sum)));
                }
            }
            _ => unreachable!("kind checked above"),
        }
        Ok(())
    }
}

/// Piecewise-linear interpolation with flat extrapolation
fn interpolate(breakpoints: &[Breakpoint], x: f64) -> f64 {
    let (first, last) = match (breakpoints.first(), breakpoints.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if x <= first.x {
        return first.y;
    }
    if x >= last.x {
        return last.y;
    }
    for w in breakpoints.windows(2) {
        let (a, b) = (w[0], w[1]);
        if x <= b.x {
            let t = (x - a.x) / (b.x - a.x);
            return (a.y + (b.y - a.y) * t).clamp(0.0, 1.0);
        }
    }
    last.y
}

// ============================================================================
// Risk Attitude
// ============================================================================

/// Qualitative risk attitude, mapped to the acceptance-curve steepness `k`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAttitude {
    Averse,
    #[default]
    Neutral,
    Seeking,
    Custom { steepness: f64 },
}

impl RiskAttitude {
    /// Logistic steepness used by the acceptance model
    pub fn steepness(&self) -> f64 {
        match self {
            RiskAttitude::Averse => 8.0,
            RiskAttitude::Neutral => 5.0,
            RiskAttitude::Seeking => 3.0,
            RiskAttitude::Custom { steepness } => *steepness,
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// One issue's entry in a party profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuePreference {
    pub weight: f64,
    pub value_function: ValueFunction,

    /// Reference point for the loss-averse adjustment. `None` means the
    /// party has no expectation on this issue and no adjustment applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<IssueValue>,
}

/// Unvalidated profile record, as supplied by callers or JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyProfileSpec {
    pub id: String,
    pub preferences: BTreeMap<String, IssuePreference>,
    pub batna: f64,
    #[serde(default = "default_loss_aversion")]
    pub loss_aversion: f64,
    #[serde(default)]
    pub risk_attitude: RiskAttitude,
}

fn default_loss_aversion() -> f64 {
    DEFAULT_LOSS_AVERSION
}

/// Validated party profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "PartyProfileSpec")]
pub struct PartyProfile {
    spec: PartyProfileSpec,

    /// Domains of the preferred issues, as declared by the validating catalog
    domains: BTreeMap<String, IssueDomain>,
}

impl PartyProfile {
    /// Validate a profile against the issue catalog
    ///
    /// # Errors
    /// - `InvalidBatna`, `InvalidLossAversion`, `InvalidSteepness`
    /// - `UnknownIssue` for a preference on an issue not in the catalog
    /// - `InvalidWeight` / `WeightSum` for bad weights
    /// - value-function errors (`NonMonotonic`, `ValueOutOfRange`,
    ///   `IncompleteValueFunction`, `MalformedValueFunction`, `KindMismatch`)
    /// - `OutOfDomain` for a reference point outside its issue's domain
    pub fn new(spec: PartyProfileSpec, catalog: &IssueCatalog) -> Result<Self, ValidationError> {
        let party = spec.id.clone();

        if !spec.batna.is_finite() || !(0.0..=1.0).contains(&spec.batna) {
            return Err(ValidationError::InvalidBatna {
                party,
                batna: spec.batna,
            });
        }
        if !spec.loss_aversion.is_finite() || spec.loss_aversion < 1.0 {
            return Err(ValidationError::InvalidLossAversion {
                party,
                value: spec.loss_aversion,
            });
        }
        let k = spec.risk_attitude.steepness();
        if !k.is_finite() || k <= 0.0 {
            return Err(ValidationError::InvalidSteepness { party, value: k });
        }

        let mut sum = 0.0;
        let mut domains = BTreeMap::new();
        for (issue_name, pref) in &spec.preferences {
            let issue = catalog.require(issue_name)?;
            domains.insert(issue_name.clone(), issue.domain.clone());
            if !pref.weight.is_finite() || !(0.0..=1.0).contains(&pref.weight) {
                return Err(ValidationError::InvalidWeight {
                    party,
                    issue: issue_name.clone(),
                    weight: pref.weight,
                });
            }
            sum += pref.weight;

            pref.value_function.validate(issue_name, &issue.domain)?;
            if let Some(reference) = &pref.reference {
                issue.domain.check(issue_name, reference)?;
            }
        }
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ValidationError::WeightSum { party, sum });
        }

        Ok(Self { spec, domains })
    }

    pub fn builder(id: impl Into<String>) -> PartyProfileBuilder {
        PartyProfileBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn batna(&self) -> f64 {
        self.spec.batna
    }

    pub fn loss_aversion(&self) -> f64 {
        self.spec.loss_aversion
    }

    pub fn risk_attitude(&self) -> RiskAttitude {
        self.spec.risk_attitude
    }

    pub fn steepness(&self) -> f64 {
        self.spec.risk_attitude.steepness()
    }

    pub fn preference(&self, issue: &str) -> Option<&IssuePreference> {
        self.spec.preferences.get(issue)
    }

    /// Domain the profile was validated against for `issue`
    pub fn domain(&self, issue: &str) -> Option<&IssueDomain> {
        self.domains.get(issue)
    }

    pub fn preferences(&self) -> impl Iterator<Item = (&String, &IssuePreference)> {
        self.spec.preferences.iter()
    }

    pub fn spec(&self) -> &PartyProfileSpec {
        &self.spec
    }
}

impl From<PartyProfile> for PartyProfileSpec {
    fn from(profile: PartyProfile) -> Self {
        profile.spec
    }
}

/// Fluent construction of profiles, mostly for scenarios and tests
#[derive(Debug, Clone)]
pub struct PartyProfileBuilder {
    spec: PartyProfileSpec,
}

impl PartyProfileBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            spec: PartyProfileSpec {
                id: id.into(),
                preferences: BTreeMap::new(),
                batna: 0.0,
                loss_aversion: DEFAULT_LOSS_AVERSION,
                risk_attitude: RiskAttitude::default(),
            },
        }
    }

    pub fn batna(mut self, batna: f64) -> Self {
        self.spec.batna = batna;
        self
    }

    pub fn loss_aversion(mut self, value: f64) -> Self {
        self.spec.loss_aversion = value;
        self
    }

    pub fn risk_attitude(mut self, attitude: RiskAttitude) -> Self {
        self.spec.risk_attitude = attitude;
        self
    }

    pub fn issue(mut self, issue: impl Into<String>, weight: f64, value_function: ValueFunction) -> Self {
        self.spec.preferences.insert(
            issue.into(),
            IssuePreference {
                weight,
                value_function,
                reference: None,
            },
        );
        self
    }

    pub fn issue_with_reference(
        mut self,
        issue: impl Into<String>,
        weight: f64,
        value_function: ValueFunction,
        reference: impl Into<IssueValue>,
    ) -> Self {
        self.spec.preferences.insert(
            issue.into(),
            IssuePreference {
                weight,
                value_function,
                reference: Some(reference.into()),
            },
        );
        self
    }

    pub fn into_spec(self) -> PartyProfileSpec {
        self.spec
    }

    pub fn build(self, catalog: &IssueCatalog) -> Result<PartyProfile, ValidationError> {
        PartyProfile::new(self.spec, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(x: f64, y: f64) -> Breakpoint {
        Breakpoint { x, y }
    }

    #[test]
    fn test_linear_decreasing_direction() {
        let vf = ValueFunction::Linear {
            worst: 72.0,
            best: 0.0,
        };
        let at_zero = vf.evaluate("pre_notification_hours", &IssueValue::Number(0.0)).unwrap();
        let at_36 = vf.evaluate("pre_notification_hours", &IssueValue::Number(36.0)).unwrap();
        assert_eq!(at_zero, 1.0);
        assert!((at_36 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_piecewise_flat_extrapolation() {
        let vf = ValueFunction::Piecewise {
            breakpoints: vec![bp(2.0, 0.2), bp(6.0, 1.0)],
        };
        assert_eq!(vf.evaluate("x", &IssueValue::Number(0.0)).unwrap(), 0.2);
        assert_eq!(vf.evaluate("x", &IssueValue::Number(9.0)).unwrap(), 1.0);
        assert!((vf.evaluate("x", &IssueValue::Number(4.0)).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_piecewise_non_monotonic_rejected() {
        let vf = ValueFunction::Piecewise {
            breakpoints: vec![bp(0.0, 0.0), bp(5.0, 1.0), bp(10.0, 0.5)],
        };
        let domain = IssueDomain::Numeric { min: 0.0, max: 12.0 };
        assert_eq!(
            vf.validate("standoff_nm", &domain),
            Err(ValidationError::NonMonotonic {
                issue: "standoff_nm".into()
            })
        );
    }

    #[test]
    fn test_flags_undesired_scores_when_absent() {
        let mut weights = BTreeMap::new();
        weights.insert("cues_code".to_string(), 0.6);
        weights.insert("unarmed_escorts".to_string(), 0.4);
        let vf = ValueFunction::Flags {
            weights,
            undesired: ["unarmed_escorts".to_string()].into_iter().collect(),
        };

        let none = vf.evaluate("p", &IssueValue::flags(Vec::<String>::new())).unwrap();
        let both = vf.evaluate("p", &IssueValue::flags(["cues_code", "unarmed_escorts"])).unwrap();
        let best = vf.evaluate("p", &IssueValue::flags(["cues_code"])).unwrap();

        assert!((none - 0.4).abs() < 1e-12);
        assert!((both - 0.6).abs() < 1e-12);
        assert!((best - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_risk_attitude_steepness_defaults() {
        assert_eq!(RiskAttitude::Averse.steepness(), 8.0);
        assert_eq!(RiskAttitude::Neutral.steepness(), 5.0);
        assert_eq!(RiskAttitude::default(), RiskAttitude::Neutral);
    }
}
