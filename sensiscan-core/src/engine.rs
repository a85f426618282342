// sensiscan-core/src/engine.rs
//! Defines the core MatchingEngine trait.
//!
//! The `MatchingEngine` trait provides a pluggable interface for quantifying how
//! much a candidate column overlaps a reference field. It decouples the
//! orchestrator from the engine-specific query, so the orchestrator can be driven
//! by a different engine (or a test double) without change.
//!
//! License: MIT OR APACHE 2.0

use crate::model::{CandidateField, MatchResult, SensitiveFieldReference};

/// Counts distinct reference values that also occur in a candidate column.
pub trait MatchingEngine {
    /// Number of distinct, non-placeholder reference values found in the
    /// candidate column, capped by the engine's configured bound.
    ///
    /// Failures are not propagated: a comparison that cannot run is evidence of
    /// nothing and yields 0.
    fn count_overlap(&self, reference: &SensitiveFieldReference, candidate: &CandidateField) -> u64;

    /// Wraps `count_overlap` in a `MatchResult`.
    fn evaluate<'a>(&self, reference: &'a SensitiveFieldReference, candidate: &'a CandidateField) -> MatchResult<'a> {
        MatchResult {
            candidate,
            reference,
            overlap_count: self.count_overlap(reference, candidate),
        }
    }
}
