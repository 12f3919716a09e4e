//! Compatibility scoring and lead ranking for B2G sales intelligence.
//!
//! The [`matching`] module holds the core: weight profiles, the six criterion
//! evaluators, the [`ScoringEngine`](matching::scoring::ScoringEngine) and the
//! lead ranking pipeline. [`config`], [`telemetry`] and [`error`] carry the
//! process-level plumbing shared with the command-line front end.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
