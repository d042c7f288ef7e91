//! Observation deduplication.
//!
//! Several rows from one source can describe the same entity on the same
//! date (repeated assessments, duplicated extracts). They are collapsed to
//! one observation per (entity, source, event_date) using a per-attribute
//! combining rule. Deduplicating an already-deduplicated set is a no-op.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use weft_core::{EntityId, Observation, Ordinal};

/// How to combine several non-null values of one attribute within a group.
/// Null values are absent for combination purposes; the result is null only
/// when every value in the group is null.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CombineRule {
  /// Take the worst (maximum) value — the default.
  #[default]
  Max,
  /// Take the best (minimum) value.
  Min,
}

impl CombineRule {
  fn combine(self, a: Ordinal, b: Ordinal) -> Ordinal {
    match self {
      Self::Max => a.max(b),
      Self::Min => a.min(b),
    }
  }
}

/// Collapse `observations` to one per (entity, source, event_date).
///
/// Output is sorted by that group key; attribute maps within a group are
/// merged (union of attribute names), with `rule` applied per attribute.
pub fn dedupe(
  observations: Vec<Observation>,
  rule: CombineRule,
) -> Vec<Observation> {
  let mut groups: BTreeMap<(EntityId, String, NaiveDate), Observation> =
    BTreeMap::new();

  for obs in observations {
    let key = (obs.entity_id, obs.source.clone(), obs.event_date);
    match groups.entry(key) {
      std::collections::btree_map::Entry::Vacant(slot) => {
        slot.insert(obs);
      }
      std::collections::btree_map::Entry::Occupied(mut slot) => {
        let merged = &mut slot.get_mut().values;
        for (attribute, value) in obs.values {
          let entry = merged.entry(attribute).or_insert(None);
          *entry = match (*entry, value) {
            (Some(a), Some(b)) => Some(rule.combine(a, b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
          };
        }
      }
    }
  }

  groups.into_values().collect()
}
