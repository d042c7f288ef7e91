//! Observations — point-in-time attribute measurements for one entity.
//!
//! An [`Observation`] is a [`crate::row::RawLinkRow`] that survived identity
//! resolution: the candidate keys are gone, replaced by the resolved
//! [`EntityId`]. Observations are created once and never mutated; every later
//! stage produces new values.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::key::EntityId;

// ─── Ordinal ─────────────────────────────────────────────────────────────────

/// A canonical ordinal measure value. Higher means worse; source adapters own
/// the mapping from raw survey/assessment codes to this scale.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct Ordinal(pub u8);

impl Ordinal {
  pub const fn get(self) -> u8 { self.0 }
}

impl std::fmt::Display for Ordinal {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

/// The accepted range for ordinal values, inclusive of `max`. Values outside
/// the scale mark the whole observation as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalScale {
  pub max: u8,
}

impl Default for OrdinalScale {
  /// Five levels (0–4): none, mild, moderate, severe, profound.
  fn default() -> Self { Self { max: 4 } }
}

impl OrdinalScale {
  pub fn contains(&self, value: Ordinal) -> bool { value.get() <= self.max }
}

// ─── Observation ─────────────────────────────────────────────────────────────

/// A resolved point observation: one entity, one source, one date, a map of
/// attribute name → ordinal value (or null where the source did not measure
/// that attribute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
  pub entity_id:  EntityId,
  pub source:     String,
  /// May be a documented proxy (e.g. a mid-period date) when the true date
  /// is unknown; that is the source adapter's responsibility.
  pub event_date: NaiveDate,
  pub values:     BTreeMap<String, Option<Ordinal>>,
}

impl Observation {
  pub fn value_of(&self, attribute: &str) -> Option<Ordinal> {
    self.values.get(attribute).copied().flatten()
  }
}

// ─── AggregatedObservation ───────────────────────────────────────────────────

/// One record per (entity, source, event_date) after deduplication and
/// severity aggregation. `overall` is `None` only when every sub-measure in
/// the aggregated family was null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedObservation {
  pub entity_id:  EntityId,
  pub source:     String,
  pub event_date: NaiveDate,
  /// Sub-measure values, plus the aggregated family value under the family
  /// name so spell construction can target it like any other attribute.
  pub values:     BTreeMap<String, Option<Ordinal>>,
  pub overall:    Option<Ordinal>,
}

impl AggregatedObservation {
  pub fn value_of(&self, attribute: &str) -> Option<Ordinal> {
    self.values.get(attribute).copied().flatten()
  }
}
