//! Zone of Possible Agreement
//!
//! For every numeric issue in a candidate agreement, find the sub-range of the
//! issue's domain that keeps each party strictly above a utility threshold
//! while all other issues stay at the candidate's values, then intersect the
//! per-party ranges.
//!
//! Value functions are monotonic, so each party's feasible set on an issue is
//! an interval touching one end of the domain (or the whole domain, or
//! nothing). A grid scan locates it and bisection sharpens the edges; edges
//! are only ever moved onto points that were tested feasible, so every point
//! of a reported range satisfies every party.

use crate::error::ValidationError;
use crate::models::{AgreementVector, IssueCatalog, IssueValue, PartyProfile};
use crate::utility::utility;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default "strictly better than marginal" threshold
pub const DEFAULT_ZOPA_THRESHOLD: f64 = 0.4;

/// Search parameters for ZOPA detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZopaConfig {
    /// Parties must score strictly above this utility
    pub threshold: f64,

    /// Number of grid intervals per issue domain
    pub resolution: usize,

    /// Bisection steps per range edge
    pub refine_iterations: usize,
}

impl Default for ZopaConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ZOPA_THRESHOLD,
            resolution: 200,
            refine_iterations: 40,
        }
    }
}

impl ZopaConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.threshold.is_finite() || !(0.0..1.0).contains(&self.threshold) {
            return Err(ValidationError::InvalidParameter {
                name: "threshold",
                reason: format!("{} must lie in [0, 1)", self.threshold),
            });
        }
        if self.resolution < 2 {
            return Err(ValidationError::InvalidParameter {
                name: "resolution",
                reason: "at least 2 grid intervals required".to_string(),
            });
        }
        Ok(())
    }
}

/// Closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IssueRange {
    pub min: f64,
    pub max: f64,
}

impl IssueRange {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }
}

/// Why no zone of agreement was found
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZopaConflict {
    /// No value of `issue` lifts `party` above the threshold
    NoFeasibleRange { issue: String, party: String },

    /// The two parties' feasible ranges on `issue` do not overlap.
    /// Party ids are in lexical order.
    Disjoint {
        issue: String,
        parties: (String, String),
    },

    /// Candidate has no numeric issue to move and `party` is below threshold
    BelowThreshold { party: String },
}

/// ZOPA verdict for one candidate agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZopaReport {
    pub exists: bool,
    pub threshold: f64,

    /// Intersecting range per numeric issue (only when `exists`)
    pub ranges: BTreeMap<String, IssueRange>,

    /// Sorted list of blocking conflicts (only when not `exists`)
    pub conflicts: Vec<ZopaConflict>,
}

/// Detect a ZOPA around `agreement`
///
/// The result does not depend on the order of `profiles`.
///
/// # Errors
/// `NoParties`, `DuplicateParty`, an invalid config, or an agreement that
/// does not validate against `catalog`.
pub fn find_zopa(
    catalog: &IssueCatalog,
    agreement: &AgreementVector,
    profiles: &[PartyProfile],
    config: &ZopaConfig,
) -> Result<ZopaReport, ValidationError> {
    config.validate()?;
    agreement.validate(catalog)?;
    check_parties(profiles)?;

    let numeric_issues: Vec<(&String, f64, f64)> = agreement
        .iter()
        .filter_map(|(name, value)| match value {
            IssueValue::Number(_) => catalog
                .get(name)
                .and_then(|issue| issue.domain.bounds())
                .map(|(lo, hi)| (name, lo, hi)),
            _ => None,
        })
        .collect();

    let mut ranges = BTreeMap::new();
    let mut conflicts = Vec::new();

    if numeric_issues.is_empty() {
        for profile in profiles {
            if utility(agreement, profile)? <= config.threshold {
                conflicts.push(ZopaConflict::BelowThreshold {
                    party: profile.id().to_string(),
                });
            }
        }
    }

    for (issue, lo, hi) in numeric_issues {
        let mut feasible: Vec<(&str, IssueRange)> = Vec::with_capacity(profiles.len());
        let mut blocked = false;

        for profile in profiles {
            match feasible_range(agreement, profile, issue, lo, hi, config)? {
                Some(range) => feasible.push((profile.id(), range)),
                None => {
                    blocked = true;
                    conflicts.push(ZopaConflict::NoFeasibleRange {
                        issue: issue.clone(),
                        party: profile.id().to_string(),
                    });
                }
            }
        }
        if blocked {
            continue;
        }

        // Tie-break on party id so the choice is order independent
        let tightest_low = feasible
            .iter()
            .max_by(|a, b| a.1.min.total_cmp(&b.1.min).then_with(|| b.0.cmp(a.0)));
        let tightest_high = feasible
            .iter()
            .min_by(|a, b| a.1.max.total_cmp(&b.1.max).then_with(|| a.0.cmp(b.0)));

        if let (Some((low_party, low)), Some((high_party, high))) = (tightest_low, tightest_high) {
            if low.min <= high.max {
                ranges.insert(
                    issue.clone(),
                    IssueRange {
                        min: low.min,
                        max: high.max,
                    },
                );
            } else {
                let (a, b) = if low_party <= high_party {
                    (low_party, high_party)
                } else {
                    (high_party, low_party)
                };
                conflicts.push(ZopaConflict::Disjoint {
                    issue: issue.clone(),
                    parties: (a.to_string(), b.to_string()),
                });
            }
        }
    }

    conflicts.sort();
    let exists = conflicts.is_empty();
    if !exists {
        ranges.clear();
    }

    Ok(ZopaReport {
        exists,
        threshold: config.threshold,
        ranges,
        conflicts,
    })
}

pub(crate) fn check_parties(profiles: &[PartyProfile]) -> Result<(), ValidationError> {
    if profiles.is_empty() {
        return Err(ValidationError::NoParties);
    }
    let mut seen = BTreeSet::new();
    for profile in profiles {
        if !seen.insert(profile.id()) {
            return Err(ValidationError::DuplicateParty(profile.id().to_string()));
        }
    }
    Ok(())
}

/// Feasible interval of `issue` for one party, or `None` if empty
fn feasible_range(
    agreement: &AgreementVector,
    profile: &PartyProfile,
    issue: &str,
    lo: f64,
    hi: f64,
    config: &ZopaConfig,
) -> Result<Option<IssueRange>, ValidationError> {
    let probe = |x: f64| -> Result<bool, ValidationError> {
        let candidate = agreement.with_value_unchecked(issue, IssueValue::Number(x));
        Ok(utility(&candidate, profile)? > config.threshold)
    };

    let n = config.resolution;
    let point = |i: usize| {
        if i == n {
            hi
        } else {
            (lo + (hi - lo) * i as f64 / n as f64).min(hi)
        }
    };

    let mut first = None;
    let mut last = None;
    for i in 0..=n {
        if probe(point(i))? {
            if first.is_none() {
                first = Some(i);
            }
            last = Some(i);
        }
    }

    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => return Ok(None),
    };

    let mut min = point(first);
    if first > 0 {
        // point(first - 1) infeasible, point(first) feasible
        let (mut out, mut inside) = (point(first - 1), min);
        for _ in 0..config.refine_iterations {
            let mid = 0.5 * (out + inside);
            if probe(mid)? {
                inside = mid;
            } else {
                out = mid;
            }
        }
        min = inside;
    }

    let mut max = point(last);
    if last < n {
        let (mut inside, mut out) = (max, point(last + 1));
        for _ in 0..config.refine_iterations {
            let mid = 0.5 * (inside + out);
            if probe(mid)? {
                inside = mid;
            } else {
                out = mid;
            }
        }
        max = inside;
    }

    Ok(Some(IssueRange { min, max }))
}
