//! Negotiable issues and their value domains
//!
//! An issue is a named dimension of an agreement (a distance, a count, a
//! duration, a categorical choice or a set of boolean sub-options). Each issue
//! declares a domain; every concrete value placed in an agreement vector is
//! checked against it.
//!
//! Issues may also carry a [`RiskEffect`]: data describing how the chosen
//! value scales incident probability, severity and collision-type likelihood
//! in the durability simulation.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Domains and Values
// ============================================================================

/// Declared value domain of an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueDomain {
    /// Closed numeric interval [min, max]
    Numeric { min: f64, max: f64 },

    /// One of an enumerated set of options
    Categorical { options: Vec<String> },

    /// Any subset of a fixed set of flags
    Flags { flags: Vec<String> },
}

/// A concrete value chosen for an issue
///
/// Serialized untagged so agreements read naturally as JSON:
/// `{"standoff_nm": 3, "hotline": "always_available", "encounter_protocol": ["cues_code"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueValue {
    Number(f64),
    Choice(String),
    Flags(BTreeSet<String>),
}

impl IssueValue {
    /// Convenience constructor for flag sets
    pub fn flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IssueValue::Flags(flags.into_iter().map(Into::into).collect())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        IssueValue::Choice(value.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IssueValue::Number(_) => "numeric",
            IssueValue::Choice(_) => "categorical",
            IssueValue::Flags(_) => "flags",
        }
    }
}

impl From<f64> for IssueValue {
    fn from(value: f64) -> Self {
        IssueValue::Number(value)
    }
}

impl From<&str> for IssueValue {
    fn from(value: &str) -> Self {
        IssueValue::Choice(value.to_string())
    }
}

impl IssueDomain {
    pub fn kind(&self) -> &'static str {
        match self {
            IssueDomain::Numeric { .. } => "numeric",
            IssueDomain::Categorical { .. } => "categorical",
            IssueDomain::Flags { .. } => "flags",
        }
    }

    /// Numeric bounds, if the domain is ordered
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            IssueDomain::Numeric { min, max } => Some((*min, *max)),
            _ => None,
        }
    }

    fn validate(&self, issue: &str) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidDomain {
            issue: issue.to_string(),
            reason: reason.to_string(),
        };

        match self {
            IssueDomain::Numeric { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(invalid("bounds must be finite"));
                }
                if min >= max {
                    return Err(invalid("min must be less than max"));
                }
            }
            IssueDomain::Categorical { options } => {
                if options.is_empty() {
                    return Err(invalid("no options declared"));
                }
                if options.iter().collect::<BTreeSet<_>>().len() != options.len() {
                    return Err(invalid("duplicate options"));
                }
            }
            IssueDomain::Flags { flags } => {
                if flags.is_empty() {
                    return Err(invalid("no flags declared"));
                }
                if flags.iter().collect::<BTreeSet<_>>().len() != flags.len() {
                    return Err(invalid("duplicate flags"));
                }
            }
        }
        Ok(())
    }

    /// Check that `value` lies inside this domain
    pub fn check(&self, issue: &str, value: &IssueValue) -> Result<(), ValidationError> {
        let out_of_domain = |reason: String| ValidationError::OutOfDomain {
            issue: issue.to_string(),
            reason,
        };

        match (self, value) {
            (IssueDomain::Numeric { min, max }, IssueValue::Number(n)) => {
                if !n.is_finite() || n < min || n > max {
                    return Err(out_of_domain(format!("{} not in [{}, {}]", n, min, max)));
                }
                Ok(())
            }
            (IssueDomain::Categorical { options }, IssueValue::Choice(choice)) => {
                if !options.iter().any(|o| o == choice) {
                    return Err(out_of_domain(format!("unknown option '{}'", choice)));
                }
                Ok(())
            }
            (IssueDomain::Flags { flags }, IssueValue::Flags(selected)) => {
                if let Some(unknown) = selected.iter().find(|f| !flags.contains(*f)) {
                    return Err(out_of_domain(format!("unknown flag '{}'", unknown)));
                }
                Ok(())
            }
            _ => Err(ValidationError::KindMismatch {
                issue: issue.to_string(),
                expected: self.kind(),
            }),
        }
    }
}

// ============================================================================
// Risk Effects
// ============================================================================

/// Multiplicative effect on the three simulated risk channels
///
/// 1.0 on every channel is neutral. Values below 1.0 make the agreement
/// safer on that channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Scales the per-tick incident probability
    pub probability: f64,

    /// Scales drawn incident severity
    pub severity: f64,

    /// Scales the weight of collision-type incidents (ramming, water cannon)
    pub collision: f64,
}

impl RiskFactor {
    pub const NEUTRAL: RiskFactor = RiskFactor {
        probability: 1.0,
        severity: 1.0,
        collision: 1.0,
    };

    pub fn new(probability: f64, severity: f64, collision: f64) -> Self {
        Self {
            probability,
            severity,
            collision,
        }
    }

    /// Channel-wise product
    pub fn combine(self, other: RiskFactor) -> RiskFactor {
        RiskFactor {
            probability: self.probability * other.probability,
            severity: self.severity * other.severity,
            collision: self.collision * other.collision,
        }
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1)
    pub fn lerp(self, other: RiskFactor, t: f64) -> RiskFactor {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        RiskFactor {
            probability: mix(self.probability, other.probability),
            severity: mix(self.severity, other.severity),
            collision: mix(self.collision, other.collision),
        }
    }

    fn is_valid(&self) -> bool {
        [self.probability, self.severity, self.collision]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for RiskFactor {
    fn default() -> Self {
        RiskFactor::NEUTRAL
    }
}

/// How an issue's chosen value moves simulated risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskEffect {
    /// Numeric issues: interpolate between the factor at the domain minimum
    /// and the factor at the domain maximum
    Scaled { at_min: RiskFactor, at_max: RiskFactor },

    /// Categorical issues: factor per option; unlisted options are neutral
    ByChoice { factors: BTreeMap<String, RiskFactor> },

    /// Flag issues: product of the factors of every selected flag
    ByFlag { factors: BTreeMap<String, RiskFactor> },
}

impl RiskEffect {
    /// Resolve the factor for a value already checked against `domain`
    pub fn factor_for(&self, domain: &IssueDomain, value: &IssueValue) -> RiskFactor {
        match (self, domain, value) {
            (
                RiskEffect::Scaled { at_min, at_max },
                IssueDomain::Numeric { min, max },
                IssueValue::Number(n),
            ) => {
                let t = ((n - min) / (max - min)).clamp(0.0, 1.0);
                at_min.lerp(*at_max, t)
            }
            (RiskEffect::ByChoice { factors }, _, IssueValue::Choice(choice)) => {
                factors.get(choice).copied().unwrap_or(RiskFactor::NEUTRAL)
            }
            (RiskEffect::ByFlag { factors }, _, IssueValue::Flags(selected)) => selected
                .iter()
                .filter_map(|flag| factors.get(flag))
                .fold(RiskFactor::NEUTRAL, |acc, f| acc.combine(*f)),
            _ => RiskFactor::NEUTRAL,
        }
    }

    fn validate(&self, issue: &str, domain: &IssueDomain) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidDomain {
            issue: issue.to_string(),
            reason,
        };

        match (self, domain) {
            (RiskEffect::Scaled { at_min, at_max }, IssueDomain::Numeric { .. }) => {
                if !at_min.is_valid() || !at_max.is_valid() {
                    return Err(invalid("risk factors must be positive".to_string()));
                }
            }
            (RiskEffect::ByChoice { factors }, IssueDomain::Categorical { options }) => {
                for (choice, factor) in factors {
                    if !options.contains(choice) {
                        return Err(invalid(format!("risk effect names unknown option '{}'", choice)));
                    }
                    if !factor.is_valid() {
                        return Err(invalid("risk factors must be positive".to_string()));
                    }
                }
            }
            (RiskEffect::ByFlag { factors }, IssueDomain::Flags { flags }) => {
                for (flag, factor) in factors {
                    if !flags.contains(flag) {
                        return Err(invalid(format!("risk effect names unknown flag '{}'", flag)));
                    }
                    if !factor.is_valid() {
                        return Err(invalid("risk factors must be positive".to_string()));
                    }
                }
            }
            _ => {
                return Err(invalid(format!(
                    "risk effect does not fit a {} domain",
                    domain.kind()
                )))
            }
        }
        Ok(())
    }
}

// ============================================================================
// Issues and Catalog
// ============================================================================

/// A named negotiable dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub name: String,
    pub domain: IssueDomain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskEffect>,
}

impl Issue {
    pub fn numeric(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            domain: IssueDomain::Numeric { min, max },
            risk: None,
        }
    }

    pub fn categorical<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            domain: IssueDomain::Categorical {
                options: options.into_iter().map(Into::into).collect(),
            },
            risk: None,
        }
    }

    pub fn flags<I, S>(name: impl Into<String>, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            domain: IssueDomain::Flags {
                flags: flags.into_iter().map(Into::into).collect(),
            },
            risk: None,
        }
    }

    pub fn with_risk(mut self, risk: RiskEffect) -> Self {
        self.risk = Some(risk);
        self
    }
}

/// The full set of issues known to a negotiation
///
/// Validated on construction and on deserialization; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Issue>", into = "Vec<Issue>")]
pub struct IssueCatalog {
    issues: BTreeMap<String, Issue>,
}

impl IssueCatalog {
    /// Build a catalog, rejecting duplicate names and malformed domains
    pub fn new(issues: Vec<Issue>) -> Result<Self, ValidationError> {
        let mut map = BTreeMap::new();
        for issue in issues {
            issue.domain.validate(&issue.name)?;
            if let Some(risk) = &issue.risk {
                risk.validate(&issue.name, &issue.domain)?;
            }
            if map.contains_key(&issue.name) {
                return Err(ValidationError::DuplicateIssue(issue.name));
            }
            map.insert(issue.name.clone(), issue);
        }
        Ok(Self { issues: map })
    }

    pub fn get(&self, name: &str) -> Option<&Issue> {
        self.issues.get(name)
    }

    /// Look up an issue, failing with a validation error if unknown
    pub fn require(&self, name: &str) -> Result<&Issue, ValidationError> {
        self.issues
            .get(name)
            .ok_or_else(|| ValidationError::UnknownIssue(name.to_string()))
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl TryFrom<Vec<Issue>> for IssueCatalog {
    type Error = ValidationError;

    fn try_from(issues: Vec<Issue>) -> Result<Self, Self::Error> {
        IssueCatalog::new(issues)
    }
}

impl From<IssueCatalog> for Vec<Issue> {
    fn from(catalog: IssueCatalog) -> Self {
        catalog.issues.into_values().collect()
    }
}
