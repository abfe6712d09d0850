//! Candidate selection for ingestion.
//!
//! A video only yields a valid path geometry when its samples cover at
//! least two distinct positions. The MySQL source expresses this predicate
//! as an `EXISTS` self-join; the in-memory source calls
//! [`has_distinct_positions`] directly.

use crate::types::Sample;

/// Returns `true` when at least two samples differ in latitude or longitude.
///
/// Positions are compared exactly, the same way the SQL `!=` filter does.
pub fn has_distinct_positions(samples: &[Sample]) -> bool {
    match samples.split_first() {
        Some((first, rest)) => rest.iter().any(|s| s.position() != first.position()),
        None => false,
    }
}
