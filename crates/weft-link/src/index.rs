//! Candidate-key co-occurrence index.
//!
//! For every candidate key, records the set of distinct raw values of every
//! *other* scheme that co-occurs with it anywhere in the input. Built in one
//! linear pass over the deduplicated rows — no pairwise row comparison. The
//! index only feeds the conflict predicate; it resolves nothing itself.

use std::collections::{BTreeMap, BTreeSet};

use weft_core::{CandidateKey, RawLinkRow, Scheme};

/// Read-only co-occurrence index over one row set.
#[derive(Debug, Default)]
pub struct CandidateKeyIndex {
  co: BTreeMap<CandidateKey, BTreeMap<Scheme, BTreeSet<String>>>,
}

impl CandidateKeyIndex {
  /// Single pass over `rows`: for each ordered pair of schemes present on a
  /// row, record the co-occurring value.
  pub fn build(rows: &[RawLinkRow]) -> Self {
    let mut co: BTreeMap<CandidateKey, BTreeMap<Scheme, BTreeSet<String>>> =
      BTreeMap::new();

    for row in rows {
      for key in row.candidate_keys() {
        let entry = co.entry(key.clone()).or_default();
        for (other_scheme, other_value) in &row.keys {
          if *other_scheme == key.scheme {
            continue;
          }
          entry
            .entry(other_scheme.clone())
            .or_default()
            .insert(other_value.clone());
        }
      }
    }

    Self { co }
  }

  /// How many distinct values of `other` scheme co-occur with `key`.
  pub fn fan_out(&self, key: &CandidateKey, other: &Scheme) -> usize {
    self
      .co
      .get(key)
      .and_then(|schemes| schemes.get(other))
      .map_or(0, BTreeSet::len)
  }

  /// True if `key` co-occurs with two or more distinct values of any other
  /// scheme anywhere in the input.
  pub fn is_ambiguous(&self, key: &CandidateKey) -> bool {
    self
      .co
      .get(key)
      .is_some_and(|schemes| schemes.values().any(|values| values.len() >= 2))
  }

  /// The conflict predicate for one row: does any key on this row co-occur,
  /// elsewhere in the input, with a *different* value for a scheme than the
  /// value this row carries? For schemes the row does not carry, a fan-out
  /// of two or more counts as a conflict.
  pub fn row_conflicts(&self, row: &RawLinkRow) -> bool {
    for key in row.candidate_keys() {
      let Some(schemes) = self.co.get(&key) else {
        continue;
      };
      for (other_scheme, values) in schemes {
        match row.keys.get(other_scheme) {
          Some(own) => {
            if values.iter().any(|v| v != own) {
              return true;
            }
          }
          None => {
            if values.len() >= 2 {
              return true;
            }
          }
        }
      }
    }
    false
  }

  /// Per scheme, the number of keys with an ambiguous co-occurrence.
  /// Descriptive only — used for run statistics and log events.
  pub fn ambiguous_key_counts(&self) -> BTreeMap<Scheme, usize> {
    let mut counts: BTreeMap<Scheme, usize> = BTreeMap::new();
    for (key, schemes) in &self.co {
      if schemes.values().any(|values| values.len() >= 2) {
        *counts.entry(key.scheme.clone()).or_default() += 1;
      }
    }
    counts
  }
}
