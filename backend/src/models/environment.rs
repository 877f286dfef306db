//! Environment configuration for durability simulation
//!
//! Conditions that hold for a whole simulation run: sea state, how visible
//! incidents are to the media, and a scenario-level baseline tension.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Sea/weather state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Calm,
    Rough,
}

/// Ordinal media-visibility level
///
/// Higher visibility makes follow-on incidents more likely after a first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaVisibility {
    Low,
    #[default]
    Medium,
    High,
}

/// Immutable per-run environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub weather: Weather,

    #[serde(default)]
    pub media: MediaVisibility,

    /// Scenario baseline tension, multiplies incident probability (1.0 = nominal)
    #[serde(default = "default_tension")]
    pub baseline_tension: f64,
}

fn default_tension() -> f64 {
    1.0
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            weather: Weather::Calm,
            media: MediaVisibility::Medium,
            baseline_tension: 1.0,
        }
    }
}

impl EnvironmentConfig {
    pub fn new(weather: Weather, media: MediaVisibility) -> Self {
        Self {
            weather,
            media,
            baseline_tension: 1.0,
        }
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.baseline_tension = tension;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.baseline_tension.is_finite() || self.baseline_tension < 0.0 {
            return Err(ValidationError::InvalidParameter {
                name: "baseline_tension",
                reason: format!("{} must be a non-negative number", self.baseline_tension),
            });
        }
        Ok(())
    }
}
