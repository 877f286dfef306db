//! Logistic acceptance model

use crate::error::ValidationError;

/// Probability that a party accepts an agreement giving it `utility`
///
/// `P = 1 / (1 + e^{-k (U - 0.5)})`. Monotonic in `U`; exactly 0.5 at
/// `U = 0.5` for every `k`. Larger `k` means a sharper cutoff.
pub fn acceptance_probability(utility: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (utility - 0.5)).exp())
}

/// Joint acceptance under independence: the product, never an average
///
/// # Errors
/// `NoParties` for an empty slice.
pub fn overall_agreement_probability(probabilities: &[f64]) -> Result<f64, ValidationError> {
    if probabilities.is_empty() {
        return Err(ValidationError::NoParties);
    }
    Ok(probabilities.iter().product())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_is_exactly_half() {
        for k in [0.5, 3.0, 5.0, 8.0, 40.0] {
            assert_eq!(acceptance_probability(0.5, k), 0.5);
        }
    }

    #[test]
    fn test_steeper_curve_is_more_decisive() {
        let soft = acceptance_probability(0.7, 3.0);
        let sharp = acceptance_probability(0.7, 8.0);
        assert!(sharp > soft);
        assert!(acceptance_probability(0.3, 8.0) < acceptance_probability(0.3, 3.0));
    }

    #[test]
    fn test_single_low_party_dominates() {
        let p = overall_agreement_probability(&[0.95, 0.9, 0.1]).unwrap();
        assert!(p < 0.1);
        assert_eq!(overall_agreement_probability(&[0.73]).unwrap(), 0.73);
        assert_eq!(overall_agreement_probability(&[]), Err(ValidationError::NoParties));
    }
}
