//! Simulated incident events
//!
//! Produced only by the durability simulator. The core never persists them.

use serde::{Deserialize, Serialize};

/// Kind of adverse encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    WaterCannon,
    Ramming,
    Detention,
    NearMiss,
    Harassment,
}

impl IncidentType {
    /// All types in sampling order
    pub const ALL: [IncidentType; 5] = [
        IncidentType::WaterCannon,
        IncidentType::Ramming,
        IncidentType::Detention,
        IncidentType::NearMiss,
        IncidentType::Harassment,
    ];

    /// Physical-contact types, damped by safe-distance commitments
    pub fn is_collision(&self) -> bool {
        matches!(self, IncidentType::WaterCannon | IncidentType::Ramming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::WaterCannon => "water_cannon",
            IncidentType::Ramming => "ramming",
            IncidentType::Detention => "detention",
            IncidentType::NearMiss => "near_miss",
            IncidentType::Harassment => "harassment",
        }
    }
}

impl std::fmt::Display for IncidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated adverse encounter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidentEvent {
    pub kind: IncidentType,

    /// Severity in [0, 1]
    pub severity: f64,

    /// Simulation tick at which the incident occurred
    pub tick: usize,
}

impl IncidentEvent {
    pub fn new(kind: IncidentType, severity: f64, tick: usize) -> Self {
        Self {
            kind,
            severity,
            tick,
        }
    }
}
