//! Spells — the terminal, persisted output of the pipeline.
//!
//! A spell asserts that an attribute held a constant value over a closed date
//! interval. For a fixed (entity, attribute_type), spells are totally ordered
//! by start date, mutually exclusive, and jointly exhaustive from the first
//! observation to the open sentinel on the last spell.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{key::EntityId, observation::Ordinal};

/// Sentinel finish date meaning "still in effect as of data extraction".
pub const OPEN_FINISH: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31)
{
  Some(date) => date,
  None => panic!("sentinel date is valid"),
};

/// A closed date interval during which `attribute_type` held `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
  pub entity_id:      EntityId,
  pub attribute_type: String,
  pub value:          Ordinal,
  pub source:         String,
  pub start_date:     NaiveDate,
  pub finish_date:    NaiveDate,
}

impl Spell {
  /// True for the final spell of a sequence — no successor observation has
  /// closed it yet.
  pub fn is_open(&self) -> bool { self.finish_date == OPEN_FINISH }

  /// True if `date` falls within `[start_date, finish_date]`.
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.finish_date
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn spell(start: (i32, u32, u32), finish: Option<(i32, u32, u32)>) -> Spell {
    Spell {
      entity_id:      EntityId(1),
      attribute_type: "seeing".into(),
      value:          Ordinal(2),
      source:         "CEN".into(),
      start_date:     NaiveDate::from_ymd_opt(start.0, start.1, start.2)
        .unwrap(),
      finish_date:    finish
        .map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
        .unwrap_or(OPEN_FINISH),
    }
  }

  #[test]
  fn open_spell_contains_far_future() {
    let s = spell((2020, 1, 10), None);
    assert!(s.is_open());
    assert!(s.contains(NaiveDate::from_ymd_opt(2093, 6, 1).unwrap()));
  }

  #[test]
  fn closed_spell_bounds_are_inclusive() {
    let s = spell((2018, 3, 6), Some((2020, 1, 9)));
    assert!(!s.is_open());
    assert!(s.contains(NaiveDate::from_ymd_opt(2018, 3, 6).unwrap()));
    assert!(s.contains(NaiveDate::from_ymd_opt(2020, 1, 9).unwrap()));
    assert!(!s.contains(NaiveDate::from_ymd_opt(2020, 1, 10).unwrap()));
    assert!(!s.contains(NaiveDate::from_ymd_opt(2018, 3, 5).unwrap()));
  }
}
