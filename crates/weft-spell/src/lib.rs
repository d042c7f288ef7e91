//! Spell construction for Weft.
//!
//! Converts resolved point observations into gap-free attribute histories:
//!
//! 1. [`dedupe`] — collapse multiple observations for the same
//!    (entity, source, date) into one, combining attribute values.
//! 2. [`severity`] — collapse a measure family's sub-values into one overall
//!    ordinal per observation (worst non-null wins).
//! 3. [`SpellBuilder`] — turn the time-ordered observations per entity into
//!    closed intervals, with an open-ended final interval.
//!
//! Every function here is a pure transformation: inputs are never mutated,
//! and identical input always produces identical output.

pub mod builder;
pub mod dedup;
pub mod severity;

pub use builder::{DateCollision, SourceOrdering, SpellBuilder, SpellOutcome};
pub use dedup::{CombineRule, dedupe};
pub use severity::{MeasureFamily, aggregate, aggregate_observations};
