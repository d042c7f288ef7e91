//! Identity resolution for Weft.
//!
//! Two stages, run in order over the deduplicated row set:
//!
//! 1. [`CandidateKeyIndex`] — one global pass that records, per candidate
//!    key, the distinct values of every other scheme it co-occurs with.
//!    This is the synchronisation barrier between ingestion and resolution.
//! 2. [`IdentityResolver`] — per row, resolves every present key through the
//!    authoritative lookup, classifies agreement/disagreement, applies the
//!    acceptance policy, and emits an audit record whether or not the row is
//!    accepted.
//!
//! Row-level defects (unlinkable rows, conflicting links) never abort the
//! batch; they are counted and carried in the audit output for manual
//! review.

pub mod audit;
pub mod index;
pub mod resolver;

pub use audit::{MatchQuality, ResolutionAudit, ResolutionStats};
pub use index::CandidateKeyIndex;
pub use resolver::{AcceptancePolicy, IdentityResolver, Resolution};
