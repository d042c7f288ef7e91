//! Raw link rows — the unit every source adapter emits.
//!
//! A row carries zero or more candidate keys (at most one per scheme) plus
//! the observation payload. Rows are created once by ingestion and never
//! mutated; exact duplicates are removed once, before resolution.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  key::{CandidateKey, Scheme},
  observation::{Ordinal, OrdinalScale},
};

/// One input record: candidate keys plus a dated attribute payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLinkRow {
  /// Assigned at ingestion; exists only so audit records can be joined back
  /// to the input. Excluded from duplicate detection.
  pub row_id:     Uuid,
  /// At most one raw identifier per scheme.
  pub keys:       BTreeMap<Scheme, String>,
  pub source:     String,
  pub event_date: NaiveDate,
  pub values:     BTreeMap<String, Option<Ordinal>>,
}

/// Everything except `row_id` — the identity used for duplicate removal.
type RowContent = (
  BTreeMap<Scheme, String>,
  String,
  NaiveDate,
  BTreeMap<String, Option<Ordinal>>,
);

impl RawLinkRow {
  /// Build a row with a freshly assigned `row_id`.
  pub fn new(
    keys: BTreeMap<Scheme, String>,
    source: impl Into<String>,
    event_date: NaiveDate,
    values: BTreeMap<String, Option<Ordinal>>,
  ) -> Self {
    Self {
      row_id: Uuid::new_v4(),
      keys,
      source: source.into(),
      event_date,
      values,
    }
  }

  /// The candidate keys present on this row.
  pub fn candidate_keys(&self) -> impl Iterator<Item = CandidateKey> + '_ {
    self
      .keys
      .iter()
      .map(|(scheme, raw)| CandidateKey::new(scheme.clone(), raw.clone()))
  }

  /// Reject the whole row if any attribute value falls outside `scale`.
  pub fn validate(&self, scale: &OrdinalScale) -> Result<()> {
    for (attribute, value) in &self.values {
      if let Some(v) = value
        && !scale.contains(*v)
      {
        return Err(Error::OrdinalOutOfRange {
          row_id:    self.row_id,
          attribute: attribute.clone(),
          value:     v.get(),
          max:       scale.max,
        });
      }
    }
    Ok(())
  }

  fn content(&self) -> RowContent {
    (
      self.keys.clone(),
      self.source.clone(),
      self.event_date,
      self.values.clone(),
    )
  }
}

/// Remove exact-duplicate rows (identity excluding `row_id`), keeping the
/// first occurrence and preserving input order otherwise. Idempotent.
pub fn dedup_rows(rows: Vec<RawLinkRow>) -> Vec<RawLinkRow> {
  let mut seen: HashSet<RowContent> = HashSet::with_capacity(rows.len());
  rows
    .into_iter()
    .filter(|row| seen.insert(row.content()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(key: &str, date: (i32, u32, u32), value: u8) -> RawLinkRow {
    let mut keys = BTreeMap::new();
    keys.insert(Scheme::Census, key.to_string());
    let mut values = BTreeMap::new();
    values.insert("seeing".to_string(), Some(Ordinal(value)));
    RawLinkRow::new(
      keys,
      "CEN",
      NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
      values,
    )
  }

  #[test]
  fn dedup_ignores_row_id() {
    let a = row("c1", (2018, 3, 6), 2);
    let b = row("c1", (2018, 3, 6), 2);
    assert_ne!(a.row_id, b.row_id);

    let deduped = dedup_rows(vec![a.clone(), b]);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].row_id, a.row_id);
  }

  #[test]
  fn dedup_keeps_distinct_rows_in_order() {
    let a = row("c1", (2018, 3, 6), 2);
    let b = row("c1", (2018, 3, 6), 3);
    let c = row("c2", (2018, 3, 6), 2);

    let deduped = dedup_rows(vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(
      deduped.iter().map(|r| r.row_id).collect::<Vec<_>>(),
      vec![a.row_id, b.row_id, c.row_id]
    );
  }

  #[test]
  fn dedup_is_idempotent() {
    let rows = vec![row("c1", (2018, 3, 6), 2), row("c1", (2018, 3, 6), 2)];
    let once = dedup_rows(rows);
    let twice = dedup_rows(once.clone());
    assert_eq!(once, twice);
  }

  #[test]
  fn validate_rejects_out_of_scale_values() {
    let bad = row("c1", (2018, 3, 6), 9);
    let err = bad.validate(&OrdinalScale::default()).unwrap_err();
    assert!(matches!(err, Error::OrdinalOutOfRange { value: 9, .. }));

    let ok = row("c1", (2018, 3, 6), 4);
    assert!(ok.validate(&OrdinalScale::default()).is_ok());
  }
}
