//! Run-level infrastructure shared by simulation entry points

pub mod time;

pub use time::{RunBudget, RunClock, DEFAULT_MAX_STEPS};
