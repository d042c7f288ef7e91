//! Resolution audit records.
//!
//! Every input row yields exactly one audit record, accepted or not. The
//! audit is one of the two lasting artifacts of a run; it exists to support
//! manual review, so conflicting entity ids are retained, never silently
//! discarded.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;
use weft_core::EntityId;

// ─── MatchQuality ────────────────────────────────────────────────────────────

/// Classification of how a row's candidate keys resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchQuality {
  /// Every resolving scheme named the same entity.
  Agreed { schemes: usize, failures: usize },
  /// Resolving schemes named two or more distinct entities.
  Conflicting { schemes: usize, entities: usize },
  /// No candidate key resolved at all.
  Unlinkable { schemes: usize },
}

impl fmt::Display for MatchQuality {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Agreed { schemes, failures } => write!(
        f,
        "agreed: {} of {schemes} schemes linked",
        schemes - failures
      ),
      Self::Conflicting { schemes, entities } => {
        write!(f, "conflicting: {entities} entities across {schemes} schemes")
      }
      Self::Unlinkable { schemes } => {
        write!(f, "unlinkable: 0 of {schemes} schemes linked")
      }
    }
  }
}

// ─── ResolutionAudit ─────────────────────────────────────────────────────────

/// One row of the resolution audit artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAudit {
  pub row_id: Uuid,
  /// The agreed entity when exactly one was named, whether or not the row
  /// was accepted by policy. Null for unlinkable and conflicting rows.
  pub entity_id: Option<EntityId>,
  pub accepted: bool,
  /// All distinct entities named by this row's keys, sorted. Carries both
  /// sides of a conflict.
  pub candidates: SmallVec<[EntityId; 4]>,
  /// Schemes present on the row.
  pub agency_id_count: usize,
  /// Present keys the lookup could not resolve.
  pub link_failure_count: usize,
  /// 0 (no links), 1 (agreement), or ≥2 (disagreement).
  pub distinct_resolved_id_count: usize,
  /// True if any key on this row pairs differently elsewhere in the input.
  pub conflict_flag: bool,
  pub quality: MatchQuality,
  /// Human-readable rendering of `quality`, for review listings.
  pub match_quality: String,
}

// ─── ResolutionStats ─────────────────────────────────────────────────────────

/// Row counts for one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
  pub rows:            usize,
  pub accepted:        usize,
  pub unlinkable:      usize,
  pub conflicting:     usize,
  /// Agreed rows rejected by the acceptance policy (ambiguous keys without
  /// full corroboration).
  pub policy_rejected: usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quality_labels_read_naturally() {
    assert_eq!(
      MatchQuality::Agreed {
        schemes:  3,
        failures: 1,
      }
      .to_string(),
      "agreed: 2 of 3 schemes linked"
    );
    assert_eq!(
      MatchQuality::Conflicting {
        schemes:  3,
        entities: 2,
      }
      .to_string(),
      "conflicting: 2 entities across 3 schemes"
    );
    assert_eq!(
      MatchQuality::Unlinkable { schemes: 2 }.to_string(),
      "unlinkable: 0 of 2 schemes linked"
    );
  }
}
