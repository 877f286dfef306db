//! Agreement vectors
//!
//! An agreement vector maps issue names to concrete values for a subset of the
//! catalog. Issues left out are "not applicable" to this negotiation.
//!
//! Vectors are validated against an [`IssueCatalog`] when built and are never
//! mutated afterwards: [`AgreementVector::revise`] produces a new vector.

use crate::error::ValidationError;
use crate::models::issue::{IssueCatalog, IssueValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// Immutable, validated issue → value mapping
///
/// # Example
/// ```
/// use negotiation_engine_core_rs::models::{AgreementVector, IssueCatalog, IssueValue};
///
/// let catalog = IssueCatalog::maritime_standoff();
/// let agreement = AgreementVector::builder()
///     .set("standoff_nm", 3.0)
///     .set("hotline", "always_available")
///     .build(&catalog)
///     .unwrap();
///
/// assert_eq!(agreement.get("standoff_nm"), Some(&IssueValue::Number(3.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AgreementVector {
    values: BTreeMap<String, IssueValue>,
}

impl AgreementVector {
    /// Validate `values` against `catalog`
    ///
    /// # Errors
    /// - `UnknownIssue` if a name is not in the catalog
    /// - `OutOfDomain` / `KindMismatch` if a value does not fit its issue
    pub fn new(
        values: BTreeMap<String, IssueValue>,
        catalog: &IssueCatalog,
    ) -> Result<Self, ValidationError> {
        for (name, value) in &values {
            let issue = catalog.require(name)?;
            issue.domain.check(name, value)?;
        }
        Ok(Self { values })
    }

    pub fn builder() -> AgreementBuilder {
        AgreementBuilder::default()
    }

    pub fn get(&self, issue: &str) -> Option<&IssueValue> {
        self.values.get(issue)
    }

    pub fn contains(&self, issue: &str) -> bool {
        self.values.contains_key(issue)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IssueValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-check every value against `catalog`
    ///
    /// Used at engine entry points when the vector may have been built
    /// against a different catalog.
    pub fn validate(&self, catalog: &IssueCatalog) -> Result<(), ValidationError> {
        for (name, value) in &self.values {
            catalog.require(name)?.domain.check(name, value)?;
        }
        Ok(())
    }

    /// Produce a revised vector with one issue replaced or added
    pub fn revise(
        &self,
        issue: &str,
        value: impl Into<IssueValue>,
        catalog: &IssueCatalog,
    ) -> Result<Self, ValidationError> {
        let mut values = self.values.clone();
        values.insert(issue.to_string(), value.into());
        Self::new(values, catalog)
    }

    /// Copy with `issue` replaced by `value`, skipping catalog validation
    ///
    /// Only for internal probing where `value` is known to lie inside the
    /// issue's domain (e.g. ZOPA range scans).
    pub(crate) fn with_value_unchecked(&self, issue: &str, value: IssueValue) -> Self {
        let mut values = self.values.clone();
        values.insert(issue.to_string(), value);
        Self { values }
    }

    pub fn into_values(self) -> BTreeMap<String, IssueValue> {
        self.values
    }
}

/// Incremental builder for [`AgreementVector`]
#[derive(Debug, Default, Clone)]
pub struct AgreementBuilder {
    values: BTreeMap<String, IssueValue>,
}

impl AgreementBuilder {
    pub fn set(mut self, issue: impl Into<String>, value: impl Into<IssueValue>) -> Self {
        self.values.insert(issue.into(), value.into());
        self
    }

    pub fn build(self, catalog: &IssueCatalog) -> Result<AgreementVector, ValidationError> {
        AgreementVector::new(self.values, catalog)
    }
}
