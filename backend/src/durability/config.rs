//! Simulation configuration
//!
//! Every tunable of the durability model lives in one immutable value passed
//! into each run. Calibration returns new `alpha` / `base_p` values; callers
//! apply them with [`SimulationConfig::with_calibration`]. Nothing here is
//! process-global, so concurrent callers with different calibrations never
//! interfere.

use crate::core::time::RunBudget;
use crate::error::{EngineError, ValidationError};
use crate::models::MediaVisibility;
use serde::{Deserialize, Serialize};

/// Probability multipliers applied after a recent incident, per media level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaCascade {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for MediaCascade {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 1.25,
            high: 1.5,
        }
    }
}

impl MediaCascade {
    pub fn multiplier(&self, media: MediaVisibility) -> f64 {
        match media {
            MediaVisibility::Low => self.low,
            MediaVisibility::Medium => self.medium,
            MediaVisibility::High => self.high,
        }
    }
}

/// Parameters of the durability simulation
///
/// # Example
/// ```
/// use negotiation_engine_core_rs::durability::SimulationConfig;
///
/// let config = SimulationConfig::default().with_calibration(1.4, 0.2);
/// assert_eq!(config.alpha, 1.4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Global risk-scale calibration constant
    pub alpha: f64,

    /// Base per-tick incident probability
    pub base_p: f64,

    /// Probability multiplier under rough weather
    pub rough_probability_multiplier: f64,

    /// Additive severity shift under rough weather
    pub rough_severity_shift: f64,

    /// Follow-on incident multipliers by media visibility
    pub media_cascade: MediaCascade,

    /// Ticks after an incident during which the media cascade applies
    pub cascade_window: usize,

    /// Ticks looked back for the escalation (reinforcement) term
    pub escalation_window: usize,

    /// Severity added per incident inside the escalation window
    pub escalation_step: f64,

    /// Maximum total escalation bonus
    pub escalation_cap: f64,

    /// Weight of party discontent on incident probability
    pub discontent_weight: f64,

    /// Target number of buckets in the time series
    pub bucket_count: usize,

    /// Number of equal-width severity histogram bins over [0, 1]
    pub severity_bins: usize,

    /// Step cap and optional wall-clock limit
    pub budget: RunBudget,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            base_p: 0.15,
            rough_probability_multiplier: 1.5,
            rough_severity_shift: 0.10,
            media_cascade: MediaCascade::default(),
            cascade_window: 3,
            escalation_window: 3,
            escalation_step: 0.08,
            escalation_cap: 0.24,
            discontent_weight: 0.5,
            bucket_count: 10,
            severity_bins: 10,
            budget: RunBudget::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Copy with calibrated risk constants applied
    pub fn with_calibration(&self, alpha: f64, base_p: f64) -> Self {
        Self {
            alpha,
            base_p,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        fn positive(name: &'static str, value: f64) -> Result<(), ValidationError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ValidationError::InvalidParameter {
                    name,
                    reason: format!("{} must be a positive number", value),
                })
            }
        }
        fn non_negative(name: &'static str, value: f64) -> Result<(), ValidationError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ValidationError::InvalidParameter {
                    name,
                    reason: format!("{} must be a non-negative number", value),
                })
            }
        }

        positive("alpha", self.alpha)?;
        positive("base_p", self.base_p)?;
        if self.base_p > 1.0 {
            return Err(ValidationError::InvalidParameter {
                name: "base_p",
                reason: format!("{} is not a probability", self.base_p),
            });
        }
        positive("rough_probability_multiplier", self.rough_probability_multiplier)?;
        non_negative("rough_severity_shift", self.rough_severity_shift)?;
        positive("media_cascade.low", self.media_cascade.low)?;
        positive("media_cascade.medium", self.media_cascade.medium)?;
        positive("media_cascade.high", self.media_cascade.high)?;
        non_negative("escalation_step", self.escalation_step)?;
        non_negative("escalation_cap", self.escalation_cap)?;
        non_negative("discontent_weight", self.discontent_weight)?;

        if self.bucket_count == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "bucket_count",
                reason: "at least one bucket required".to_string(),
            });
        }
        if self.severity_bins == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "severity_bins",
                reason: "at least one bin required".to_string(),
            });
        }
        if self.budget.max_steps == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "budget.max_steps",
                reason: "step cap must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SimulationConfig::from_json(r#"{"alpha": 1.8, "base_p": 0.3}"#).unwrap();
        assert_eq!(config.alpha, 1.8);
        assert_eq!(config.base_p, 0.3);
        assert_eq!(config.bucket_count, 10);
        assert_eq!(config.media_cascade, MediaCascade::default());
    }

    #[test]
    fn test_from_json_rejects_bad_probability() {
        let err = SimulationConfig::from_json(r#"{"base_p": 1.5}"#).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_with_calibration_does_not_touch_original() {
        let original = SimulationConfig::default();
        let tuned = original.with_calibration(2.0, 0.4);
        assert_eq!(original.alpha, 1.0);
        assert_eq!(tuned.alpha, 2.0);
        assert_eq!(tuned.base_p, 0.4);
        assert_eq!(tuned.bucket_count, original.bucket_count);
    }
}
