//! Simulation results and their aggregates
//!
//! A [`SimulationResult`] owns the ordered incident list of one run plus the
//! statistics derived from it. Aggregation is a pure function of the events
//! and the run shape, so synthetic event lists (e.g. for trend tests) go
//! through exactly the same code as simulated ones.

use crate::models::{IncidentEvent, IncidentType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Late-third count below this share of the early-third count is declining
pub const DECLINING_RATIO: f64 = 0.8;

/// Late-third count above this share of the early-third count is escalating
pub const ESCALATING_RATIO: f64 = 1.2;

/// Direction of incident frequency over a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Declining,
    Stable,
    Escalating,
}

impl Trend {
    /// Compare the last third against the first third
    ///
    /// Boundaries are strict, so exact ratios fall to `Stable`.
    pub fn classify(early: usize, late: usize) -> Trend {
        let early = early as f64;
        let late = late as f64;
        if late < DECLINING_RATIO * early {
            Trend::Declining
        } else if late > ESCALATING_RATIO * early {
            Trend::Escalating
        } else {
            Trend::Stable
        }
    }
}

/// Outcome of one durability simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub steps: usize,
    pub seed: u64,

    /// Per-tick incident probability before cascade multipliers
    pub base_probability: f64,

    /// Incidents in tick order
    pub events: Vec<IncidentEvent>,

    pub total_incidents: usize,
    pub mean_severity: f64,
    pub max_severity: f64,

    pub trend: Trend,
    pub early_count: usize,
    pub late_count: usize,

    /// Ticks per bucket of `series`
    pub bucket_width: usize,

    /// Incident count per fixed-width time bucket; sums to `total_incidents`
    pub series: Vec<usize>,

    /// Counts over equal-width severity bins on [0, 1]
    pub severity_histogram: Vec<usize>,

    pub counts_by_type: BTreeMap<IncidentType, usize>,
}

impl SimulationResult {
    /// Aggregate an event list for a run of `steps` ticks
    ///
    /// `bucket_count` and `severity_bins` are clamped to at least 1.
    pub fn from_events(
        events: Vec<IncidentEvent>,
        steps: usize,
        seed: u64,
        base_probability: f64,
        bucket_count: usize,
        severity_bins: usize,
    ) -> Self {
        let total_incidents = events.len();

        let (mean_severity, max_severity) = if events.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = events.iter().map(|e| e.severity).sum();
            let max = events.iter().map(|e| e.severity).fold(0.0, f64::max);
            (sum / total_incidents as f64, max)
        };

        let third = steps / 3;
        let early_count = events.iter().filter(|e| e.tick < third).count();
        let late_start = steps - third;
        let late_count = events.iter().filter(|e| e.tick >= late_start).count();

        let bucket_width = bucket_width(steps, bucket_count);
        let num_buckets = steps.div_ceil(bucket_width).max(1);
        let mut series = vec![0usize; num_buckets];
        for event in &events {
            let idx = (event.tick / bucket_width).min(num_buckets - 1);
            series[idx] += 1;
        }

        let bins = severity_bins.max(1);
        let mut severity_histogram = vec![0usize; bins];
        for event in &events {
            severity_histogram[severity_bin(event.severity, bins)] += 1;
        }

        let mut counts_by_type = BTreeMap::new();
        for event in &events {
            *counts_by_type.entry(event.kind).or_insert(0) += 1;
        }

        Self {
            steps,
            seed,
            base_probability,
            events,
            total_incidents,
            mean_severity,
            max_severity,
            trend: Trend::classify(early_count, late_count),
            early_count,
            late_count,
            bucket_width,
            series,
            severity_histogram,
            counts_by_type,
        }
    }

    /// SHA-256 over the canonical byte encoding of the incident sequence
    ///
    /// Two runs are byte-identical exactly when their digests match.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.events.len() as u64).to_le_bytes());
        for event in &self.events {
            hasher.update((event.tick as u64).to_le_bytes());
            hasher.update(event.kind.as_str().as_bytes());
            hasher.update(event.severity.to_bits().to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Fixed bucket width that splits `steps` into at most `bucket_count` buckets
pub fn bucket_width(steps: usize, bucket_count: usize) -> usize {
    steps.div_ceil(bucket_count.max(1)).max(1)
}

fn severity_bin(severity: f64, bins: usize) -> usize {
    let scaled = (severity.clamp(0.0, 1.0) * bins as f64) as usize;
    scaled.min(bins - 1)
}
