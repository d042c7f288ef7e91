//! Per-row identity resolution and the acceptance policy.

use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;
use tracing::{debug, warn};
use weft_core::{
  CandidateKey, EntityId, Observation, RawLinkRow, lookup::IdentityLookup,
};

use crate::{
  audit::{MatchQuality, ResolutionAudit, ResolutionStats},
  index::CandidateKeyIndex,
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// When to accept a row whose resolving schemes agree on one entity.
///
/// The default encodes a deliberate tradeoff: a row whose keys pair
/// ambiguously elsewhere in the input is accepted only when it achieves a
/// perfect match on this row — every present scheme resolved, zero link
/// failures. Rows with unambiguous keys are accepted on agreement alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptancePolicy {
  /// If true (the default), a row with `conflict_flag` set must have zero
  /// link failures to be accepted. If false, agreement alone suffices.
  pub ambiguous_requires_full_linkage: bool,
}

impl Default for AcceptancePolicy {
  fn default() -> Self {
    Self {
      ambiguous_requires_full_linkage: true,
    }
  }
}

impl AcceptancePolicy {
  fn accepts(
    &self,
    distinct_resolved: usize,
    conflict_flag: bool,
    link_failures: usize,
  ) -> bool {
    distinct_resolved == 1
      && (!conflict_flag
        || link_failures == 0
        || !self.ambiguous_requires_full_linkage)
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// The output of one resolution pass: accepted observations, the full audit
/// (one record per input row), and row counts.
#[derive(Debug, Clone)]
pub struct Resolution {
  pub observations: Vec<Observation>,
  pub audit:        Vec<ResolutionAudit>,
  pub stats:        ResolutionStats,
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Assigns a resolved entity per row, or declares it unresolved/conflicted.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
  policy: AcceptancePolicy,
}

impl IdentityResolver {
  pub fn new(policy: AcceptancePolicy) -> Self { Self { policy } }

  /// Resolve every row against `lookup`, classifying each one.
  ///
  /// The lookup is consulted exactly once, with the batch's full distinct
  /// key set. Rows are processed in input order; re-running over the same
  /// deduplicated input yields identical output.
  pub fn resolve<L: IdentityLookup>(
    &self,
    rows: &[RawLinkRow],
    index: &CandidateKeyIndex,
    lookup: &L,
  ) -> Resolution {
    let all_keys: BTreeSet<CandidateKey> =
      rows.iter().flat_map(RawLinkRow::candidate_keys).collect();
    let resolved: BTreeMap<CandidateKey, EntityId> =
      lookup.resolve_batch(&all_keys);

    let mut observations = Vec::new();
    let mut audit = Vec::with_capacity(rows.len());
    let mut stats = ResolutionStats {
      rows: rows.len(),
      ..ResolutionStats::default()
    };

    for row in rows {
      let agency_id_count = row.keys.len();

      let mut distinct: BTreeSet<EntityId> = BTreeSet::new();
      let mut link_failure_count = 0usize;
      for key in row.candidate_keys() {
        match resolved.get(&key) {
          Some(entity) => {
            distinct.insert(*entity);
          }
          None => link_failure_count += 1,
        }
      }

      let candidates: SmallVec<[EntityId; 4]> =
        distinct.iter().copied().collect();
      let distinct_resolved_id_count = candidates.len();
      let conflict_flag = index.row_conflicts(row);

      let (quality, entity_id) = match distinct_resolved_id_count {
        0 => (
          MatchQuality::Unlinkable {
            schemes: agency_id_count,
          },
          None,
        ),
        1 => (
          MatchQuality::Agreed {
            schemes:  agency_id_count,
            failures: link_failure_count,
          },
          candidates.first().copied(),
        ),
        n => (
          MatchQuality::Conflicting {
            schemes:  agency_id_count,
            entities: n,
          },
          None,
        ),
      };

      let accepted = self.policy.accepts(
        distinct_resolved_id_count,
        conflict_flag,
        link_failure_count,
      );

      match quality {
        MatchQuality::Unlinkable { .. } => stats.unlinkable += 1,
        MatchQuality::Conflicting { .. } => {
          stats.conflicting += 1;
          warn!(
            row_id = %row.row_id,
            candidates = ?candidates,
            "conflicting-link row dropped"
          );
        }
        MatchQuality::Agreed { .. } if accepted => stats.accepted += 1,
        MatchQuality::Agreed { .. } => stats.policy_rejected += 1,
      }

      if accepted && let Some(entity) = entity_id {
        observations.push(Observation {
          entity_id:  entity,
          source:     row.source.clone(),
          event_date: row.event_date,
          values:     row.values.clone(),
        });
      }

      audit.push(ResolutionAudit {
        row_id: row.row_id,
        entity_id,
        accepted,
        candidates,
        agency_id_count,
        link_failure_count,
        distinct_resolved_id_count,
        conflict_flag,
        quality,
        match_quality: quality.to_string(),
      });
    }

    debug!(
      rows = stats.rows,
      accepted = stats.accepted,
      unlinkable = stats.unlinkable,
      conflicting = stats.conflicting,
      policy_rejected = stats.policy_rejected,
      "resolution pass complete"
    );

    Resolution {
      observations,
      audit,
      stats,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use chrono::NaiveDate;
  use weft_core::{Scheme, lookup::TableLookup};

  use super::*;

  fn row(keys: &[(Scheme, &str)]) -> RawLinkRow {
    RawLinkRow::new(
      keys
        .iter()
        .map(|(s, v)| (s.clone(), v.to_string()))
        .collect(),
      "CEN",
      NaiveDate::from_ymd_opt(2018, 3, 6).unwrap(),
      BTreeMap::new(),
    )
  }

  fn lookup(entries: &[(Scheme, &str, u64)]) -> TableLookup {
    entries
      .iter()
      .map(|(s, v, e)| (CandidateKey::new(s.clone(), *v), EntityId(*e)))
      .collect()
  }

  fn resolve(rows: &[RawLinkRow], lookup: &TableLookup) -> Resolution {
    let index = CandidateKeyIndex::build(rows);
    IdentityResolver::default().resolve(rows, &index, lookup)
  }

  #[test]
  fn agreement_with_one_unknown_scheme_is_accepted() {
    // census → E1, health → E1, tax → unknown.
    let rows = vec![row(&[
      (Scheme::Census, "c1"),
      (Scheme::Health, "h1"),
      (Scheme::Tax, "t1"),
    ])];
    let lookup =
      lookup(&[(Scheme::Census, "c1", 1), (Scheme::Health, "h1", 1)]);

    let res = resolve(&rows, &lookup);
    assert_eq!(res.observations.len(), 1);
    assert_eq!(res.observations[0].entity_id, EntityId(1));

    let rec = &res.audit[0];
    assert!(rec.accepted);
    assert_eq!(rec.entity_id, Some(EntityId(1)));
    assert_eq!(rec.agency_id_count, 3);
    assert_eq!(rec.link_failure_count, 1);
    assert_eq!(rec.distinct_resolved_id_count, 1);
    assert_eq!(rec.match_quality, "agreed: 2 of 3 schemes linked");
  }

  #[test]
  fn disagreement_is_rejected_with_both_entities_recorded() {
    let rows =
      vec![row(&[(Scheme::Census, "c1"), (Scheme::Health, "h1")])];
    let lookup =
      lookup(&[(Scheme::Census, "c1", 1), (Scheme::Health, "h1", 2)]);

    let res = resolve(&rows, &lookup);
    assert!(res.observations.is_empty());
    assert_eq!(res.stats.conflicting, 1);

    let rec = &res.audit[0];
    assert!(!rec.accepted);
    assert_eq!(rec.entity_id, None);
    assert_eq!(rec.distinct_resolved_id_count, 2);
    assert_eq!(rec.candidates.as_slice(), &[EntityId(1), EntityId(2)]);
  }

  #[test]
  fn unlinkable_row_is_dropped_and_counted() {
    let rows = vec![row(&[(Scheme::Census, "c1")])];
    let res = resolve(&rows, &TableLookup::default());

    assert!(res.observations.is_empty());
    assert_eq!(res.stats.unlinkable, 1);
    assert_eq!(res.audit[0].match_quality, "unlinkable: 0 of 1 schemes linked");
  }

  #[test]
  fn ambiguous_key_requires_full_linkage() {
    // "c1" pairs with two different health keys, so both rows carry the
    // conflict flag. Row `a` resolves every scheme (full corroboration) and
    // is accepted; row `b` has a link failure and is rejected by policy.
    let a = row(&[(Scheme::Census, "c1"), (Scheme::Health, "h1")]);
    let b = row(&[(Scheme::Census, "c1"), (Scheme::Health, "h2")]);
    let rows = vec![a, b];
    let lookup =
      lookup(&[(Scheme::Census, "c1", 1), (Scheme::Health, "h1", 1)]);

    let res = resolve(&rows, &lookup);
    assert_eq!(res.stats.accepted, 1);
    assert_eq!(res.stats.policy_rejected, 1);

    assert!(res.audit[0].accepted);
    assert!(res.audit[0].conflict_flag);
    assert!(!res.audit[1].accepted);
    // The rejected row still resolved to a single entity; the audit keeps
    // it for review.
    assert_eq!(res.audit[1].entity_id, Some(EntityId(1)));
  }

  #[test]
  fn relaxed_policy_accepts_ambiguous_partial_rows() {
    let a = row(&[(Scheme::Census, "c1"), (Scheme::Health, "h1")]);
    let b = row(&[(Scheme::Census, "c1"), (Scheme::Health, "h2")]);
    let rows = vec![a, b];
    let lookup =
      lookup(&[(Scheme::Census, "c1", 1), (Scheme::Health, "h1", 1)]);

    let index = CandidateKeyIndex::build(&rows);
    let resolver = IdentityResolver::new(AcceptancePolicy {
      ambiguous_requires_full_linkage: false,
    });
    let res = resolver.resolve(&rows, &index, &lookup);
    assert_eq!(res.stats.accepted, 2);
    assert_eq!(res.stats.policy_rejected, 0);
  }

  #[test]
  fn resolution_is_idempotent_over_deduplicated_input() {
    let rows = vec![
      row(&[(Scheme::Census, "c1"), (Scheme::Health, "h1")]),
      row(&[(Scheme::Census, "c2")]),
      row(&[(Scheme::Census, "c1"), (Scheme::Health, "h2")]),
    ];
    let lookup = lookup(&[
      (Scheme::Census, "c1", 1),
      (Scheme::Health, "h1", 1),
      (Scheme::Health, "h2", 2),
    ]);

    let first = resolve(&rows, &lookup);
    let second = resolve(&rows, &lookup);
    assert_eq!(first.audit, second.audit);
    assert_eq!(first.observations, second.observations);
  }
}
