//! Matching engine: scoring and greedy pairing of webreports against
//! bank statements.
//!
//! The engine is pure and deterministic — no storage access, no clock,
//! no business errors. The service layer snapshots pending records,
//! hands them in here, and materializes the returned candidates.

pub mod engine;

pub use engine::{MatchCandidate, MatchingConfig, MatchingRunOutcome, run_matching};
