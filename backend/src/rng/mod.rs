//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible streams.
//! CRITICAL: every stochastic draw in the engine goes through an
//! [`RngManager`] owned by exactly one simulation run. There is no shared or
//! global generator.

mod xorshift;

pub use xorshift::RngManager;
