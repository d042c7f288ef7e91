//! One-call composition of the Weft pipeline stages.
//!
//! Each stage remains independently callable from its own crate; this crate
//! only chains them in the fixed order — intake validation, duplicate-row
//! removal, key indexing, identity resolution, observation dedup, severity
//! aggregation, spell construction — and collects the run-level statistics.
//!
//! Everything is recomputed from scratch on every run. Row-level defects
//! (malformed ordinals, unlinkable rows, conflicting links, same-date
//! collisions) never abort a run; they are accumulated in the returned
//! [`PipelineRun`] alongside the two lasting artifacts, the resolution audit
//! and the spell table.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use weft_core::{
  OrdinalScale, RawLinkRow, Spell, dedup_rows, lookup::IdentityLookup,
};
use weft_link::{
  AcceptancePolicy, CandidateKeyIndex, IdentityResolver, ResolutionAudit,
  ResolutionStats,
};
use weft_spell::{
  CombineRule, DateCollision, MeasureFamily, SourceOrdering, SpellBuilder,
  aggregate_observations, dedupe,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("measure family {0:?} has no member attributes")]
  EmptyMeasureFamily(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Configuration ───────────────────────────────────────────────────────────

/// The full pipeline configuration. Every field defaults to the standard
/// behaviour; override individual fields to depart from it.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
  pub scale:    OrdinalScale,
  pub policy:   AcceptancePolicy,
  pub combine:  CombineRule,
  /// When set, the family's overall value is recorded under its name and
  /// can be requested as a spell attribute like any sub-measure.
  pub family:   Option<MeasureFamily>,
  pub ordering: SourceOrdering,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// A row rejected at intake, with the reason. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRow {
  pub row_id: Uuid,
  pub reason: String,
}

/// Run-level counts across all stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
  pub rows_in:        usize,
  pub rows_malformed: usize,
  /// Exact duplicates removed before resolution.
  pub rows_duplicate: usize,
  pub resolution:     ResolutionStats,
  /// Observations remaining after (entity, source, date) dedup.
  pub observations:   usize,
  pub spells:         usize,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
  /// One record per deduplicated input row, accepted or not.
  pub audit:      Vec<ResolutionAudit>,
  /// Sorted by (entity_id, attribute_type, start_date).
  pub spells:     Vec<Spell>,
  pub collisions: Vec<DateCollision>,
  pub malformed:  Vec<MalformedRow>,
  pub stats:      RunStats,
}

// ─── Run ─────────────────────────────────────────────────────────────────────

impl Pipeline {
  /// Run the whole batch transformation over `rows`, producing spells for
  /// each attribute named in `attributes` (a configured family's name is a
  /// valid attribute).
  pub fn run<L: IdentityLookup>(
    &self,
    rows: Vec<RawLinkRow>,
    lookup: &L,
    attributes: &[String],
  ) -> Result<PipelineRun> {
    if let Some(family) = &self.family
      && family.members.is_empty()
    {
      return Err(Error::EmptyMeasureFamily(family.name.clone()));
    }

    let rows_in = rows.len();

    // Intake: reject whole rows with out-of-scale ordinals, keep going.
    let mut malformed = Vec::new();
    let mut valid = Vec::with_capacity(rows.len());
    for row in rows {
      match row.validate(&self.scale) {
        Ok(()) => valid.push(row),
        Err(err) => malformed.push(MalformedRow {
          row_id: row.row_id,
          reason: err.to_string(),
        }),
      }
    }

    let deduped = dedup_rows(valid);
    let rows_duplicate = rows_in - malformed.len() - deduped.len();
    info!(
      rows_in,
      malformed = malformed.len(),
      duplicates = rows_duplicate,
      "intake complete"
    );

    // One global pass, then resolution.
    let index = CandidateKeyIndex::build(&deduped);
    let resolution =
      IdentityResolver::new(self.policy).resolve(&deduped, &index, lookup);

    // Collapse and aggregate.
    let observations = dedupe(resolution.observations, self.combine);
    let aggregated =
      aggregate_observations(observations, self.family.as_ref());
    info!(observations = aggregated.len(), "aggregation complete");

    // Spells per requested attribute.
    let builder = SpellBuilder::new(self.ordering.clone());
    let mut spells = Vec::new();
    let mut collisions = Vec::new();
    for attribute in attributes {
      let outcome = builder.build(&aggregated, attribute);
      spells.extend(outcome.spells);
      collisions.extend(outcome.collisions);
    }
    spells.sort_by(|a, b| {
      (a.entity_id, &a.attribute_type, a.start_date)
        .cmp(&(b.entity_id, &b.attribute_type, b.start_date))
    });
    info!(spells = spells.len(), collisions = collisions.len(), "run complete");

    let stats = RunStats {
      rows_in,
      rows_malformed: malformed.len(),
      rows_duplicate,
      resolution: resolution.stats,
      observations: aggregated.len(),
      spells: spells.len(),
    };

    Ok(PipelineRun {
      audit: resolution.audit,
      spells,
      collisions,
      malformed,
      stats,
    })
  }
}
