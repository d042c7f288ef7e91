//! Spell construction.
//!
//! Per (entity, attribute_type), each observation opens a candidate spell at
//! its event date; the spell closes one day before the next observation for
//! that entity and attribute, regardless of source. The most recent
//! observation yields an open-ended spell. Adjacent spells with equal values
//! are deliberately *not* merged — a source change with the same value still
//! starts a new spell, preserving provenance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use weft_core::{AggregatedObservation, EntityId, OPEN_FINISH, Ordinal, Spell};

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Deterministic tie-break between sources observed on the same date.
///
/// Sources named in the priority list sort first, in list order; everything
/// else follows, lexicographically. The default (empty list) is plain
/// lexicographic order. Callers reproducing an existing source set should
/// supply that set's ordering explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOrdering {
  priority: Vec<String>,
}

impl SourceOrdering {
  pub fn lexicographic() -> Self { Self::default() }

  pub fn with_priority(
    sources: impl IntoIterator<Item = impl Into<String>>,
  ) -> Self {
    Self {
      priority: sources.into_iter().map(Into::into).collect(),
    }
  }

  /// Sort key: (position in the priority list or list length, name).
  fn rank<'a>(&self, source: &'a str) -> (usize, &'a str) {
    let position = self
      .priority
      .iter()
      .position(|p| p == source)
      .unwrap_or(self.priority.len());
    (position, source)
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Two observations for the same entity and attribute on the same date, from
/// different sources. A data-quality signal, surfaced rather than resolved:
/// the degenerate spells remain in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCollision {
  pub entity_id:      EntityId,
  pub attribute_type: String,
  pub event_date:     NaiveDate,
  /// Sources that observed this date, in tie-break order.
  pub sources:        Vec<String>,
}

/// Spells plus the accumulated data-quality signals for one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellOutcome {
  /// Sorted by (entity_id, start_date); per entity: no gaps, one open tail.
  pub spells:     Vec<Spell>,
  pub collisions: Vec<DateCollision>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Converts deduplicated observations into spells for one attribute type.
#[derive(Debug, Clone, Default)]
pub struct SpellBuilder {
  ordering: SourceOrdering,
}

/// One contributing observation: the attribute's value is known non-null.
struct Point<'a> {
  obs:   &'a AggregatedObservation,
  value: Ordinal,
}

impl SpellBuilder {
  pub fn new(ordering: SourceOrdering) -> Self { Self { ordering } }

  /// Build the spell sequence for `attribute_type`.
  ///
  /// Observations with a null value for the attribute contribute nothing.
  /// An entity with exactly one contributing observation yields exactly one
  /// open-ended spell. Entities are independent: the output for one never
  /// depends on the observations of another.
  pub fn build(
    &self,
    observations: &[AggregatedObservation],
    attribute_type: &str,
  ) -> SpellOutcome {
    let mut per_entity: BTreeMap<EntityId, Vec<Point<'_>>> = BTreeMap::new();
    for obs in observations {
      if let Some(value) = obs.value_of(attribute_type) {
        per_entity
          .entry(obs.entity_id)
          .or_default()
          .push(Point { obs, value });
      }
    }

    let mut outcome = SpellOutcome::default();

    for (entity_id, mut points) in per_entity {
      points.sort_by(|a, b| {
        a.obs.event_date.cmp(&b.obs.event_date).then_with(|| {
          self
            .ordering
            .rank(&a.obs.source)
            .cmp(&self.ordering.rank(&b.obs.source))
        })
      });

      self.record_collisions(entity_id, attribute_type, &points, &mut outcome);

      for (i, point) in points.iter().enumerate() {
        let finish_date = match points.get(i + 1) {
          Some(next) => {
            next.obs.event_date.pred_opt().unwrap_or(next.obs.event_date)
          }
          None => OPEN_FINISH,
        };
        outcome.spells.push(Spell {
          entity_id,
          attribute_type: attribute_type.to_string(),
          value: point.value,
          source: point.obs.source.clone(),
          start_date: point.obs.event_date,
          finish_date,
        });
      }
    }

    outcome
  }

  fn record_collisions(
    &self,
    entity_id: EntityId,
    attribute_type: &str,
    points: &[Point<'_>],
    outcome: &mut SpellOutcome,
  ) {
    let mut i = 0;
    while i < points.len() {
      let date = points[i].obs.event_date;
      let mut j = i + 1;
      while j < points.len() && points[j].obs.event_date == date {
        j += 1;
      }
      if j - i > 1 {
        let sources: Vec<String> =
          points[i..j].iter().map(|p| p.obs.source.clone()).collect();
        warn!(
          entity = %entity_id,
          attribute = attribute_type,
          date = %date,
          sources = ?sources,
          "same-date observation collision"
        );
        outcome.collisions.push(DateCollision {
          entity_id,
          attribute_type: attribute_type.to_string(),
          event_date: date,
          sources,
        });
      }
      i = j;
    }
  }
}
