//! The authoritative identity lookup contract.
//!
//! Resolution from (scheme, raw_value) to [`EntityId`] is owned by an
//! external system. The contract is deliberately bulk: the resolver collects
//! every distinct candidate key in the batch and resolves them in one call,
//! never per row.

use std::collections::{BTreeMap, BTreeSet};

use crate::key::{CandidateKey, EntityId};

/// Abstraction over the authoritative (scheme, raw_value) → entity table.
///
/// Keys absent from the returned map are "unknown" — the lookup has no entity
/// for them. Implementations must be pure with respect to a batch: the same
/// key set always yields the same map within one run.
pub trait IdentityLookup {
  fn resolve_batch(
    &self,
    keys: &BTreeSet<CandidateKey>,
  ) -> BTreeMap<CandidateKey, EntityId>;
}

/// In-memory lookup backed by a plain map — the shipped implementation for
/// lookups already materialised as a table, and the test double.
#[derive(Debug, Clone, Default)]
pub struct TableLookup {
  table: BTreeMap<CandidateKey, EntityId>,
}

impl TableLookup {
  pub fn insert(&mut self, key: CandidateKey, entity: EntityId) {
    self.table.insert(key, entity);
  }

  pub fn len(&self) -> usize { self.table.len() }

  pub fn is_empty(&self) -> bool { self.table.is_empty() }
}

impl FromIterator<(CandidateKey, EntityId)> for TableLookup {
  fn from_iter<I: IntoIterator<Item = (CandidateKey, EntityId)>>(
    iter: I,
  ) -> Self {
    Self {
      table: iter.into_iter().collect(),
    }
  }
}

impl IdentityLookup for TableLookup {
  fn resolve_batch(
    &self,
    keys: &BTreeSet<CandidateKey>,
  ) -> BTreeMap<CandidateKey, EntityId> {
    keys
      .iter()
      .filter_map(|key| {
        self.table.get(key).map(|entity| (key.clone(), *entity))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::key::Scheme;

  #[test]
  fn unknown_keys_are_absent_from_result() {
    let lookup: TableLookup =
      [(CandidateKey::new(Scheme::Census, "c1"), EntityId(1))]
        .into_iter()
        .collect();

    let keys: BTreeSet<_> = [
      CandidateKey::new(Scheme::Census, "c1"),
      CandidateKey::new(Scheme::Health, "h1"),
    ]
    .into_iter()
    .collect();

    let resolved = lookup.resolve_batch(&keys);
    assert_eq!(resolved.len(), 1);
    assert_eq!(
      resolved.get(&CandidateKey::new(Scheme::Census, "c1")),
      Some(&EntityId(1))
    );
  }
}
