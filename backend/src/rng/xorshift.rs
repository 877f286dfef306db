//! xorshift64* random number generator
//!
//! # Algorithm
//!
//! xorshift64* passes TestU01's BigCrush and keeps a single 64-bit state word,
//! so a run's whole stochastic history is determined by its seed.
//!
//! # Determinism
//!
//! Same seed → same sequence of draws → same incident sequence. Seeds for
//! replicate runs are spread with splitmix64 ([`RngManager::derive_seed`]) so
//! consecutive integers do not produce correlated streams.

use serde::{Deserialize, Serialize};

/// Per-run deterministic generator
///
/// # Example
/// ```
/// use negotiation_engine_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let p = rng.next_f64();
/// assert!((0.0..1.0).contains(&p));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a generator; a zero seed is remapped since xorshift cannot leave 0
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// splitmix64 finalizer: derive an independent seed for `stream` of `base`
    pub fn derive_seed(base: u64, stream: u64) -> u64 {
        let mut z = base.wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next raw 64-bit value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Current internal state
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Uniform f64 in [0.0, 1.0) built from the top 53 bits
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli trial: true with probability `p` (clamped into [0, 1])
    ///
    /// Always consumes exactly one draw so the stream stays aligned across
    /// runs whose probabilities differ.
    pub fn chance(&mut self, p: f64) -> bool {
        let u = self.next_f64();
        u < p.clamp(0.0, 1.0)
    }

    /// Triangular distribution on [min, max] with peak at `mode`
    ///
    /// Bounded by construction, which is what severity draws need.
    ///
    /// # Panics
    /// Panics unless `min <= mode <= max`
    pub fn triangular(&mut self, min: f64, mode: f64, max: f64) -> f64 {
        assert!(min <= mode && mode <= max, "require min <= mode <= max");
        if max == min {
            return min;
        }
        let u = self.next_f64();
        let split = (mode - min) / (max - min);
        if u < split {
            min + ((max - min) * (mode - min) * u).sqrt()
        } else {
            max - ((max - min) * (max - mode) * (1.0 - u)).sqrt()
        }
    }

    /// Index drawn with probability proportional to `weights`
    ///
    /// Non-positive weights are never chosen. Returns `None` when no weight
    /// is positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        let u = self.next_f64();
        if total <= 0.0 {
            return None;
        }
        let mut target = u * total;
        let mut last_positive = None;
        for (idx, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            last_positive = Some(idx);
            if target < *w {
                return Some(idx);
            }
            target -= *w;
        }
        // Floating-point residue lands on the last eligible index
        last_positive
    }
}
