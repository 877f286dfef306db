//! Nash-product fairness score
//!
//! `∏ (U_party − BATNA_party)`. Any party below its BATNA zeroes the whole
//! score: an agreement is only "fair" when it beats the fallback for
//! everyone. A ranking statistic between candidates, not an acceptance gate.

use crate::error::ValidationError;

/// Nash product over `(utility, batna)` pairs
///
/// # Errors
/// `NoParties` for an empty slice.
pub fn nash_product(outcomes: &[(f64, f64)]) -> Result<f64, ValidationError> {
    if outcomes.is_empty() {
        return Err(ValidationError::NoParties);
    }
    let mut product = 1.0;
    for (utility, batna) in outcomes {
        let surplus = utility - batna;
        if surplus < 0.0 {
            return Ok(0.0);
        }
        product *= surplus;
    }
    Ok(product)
}
