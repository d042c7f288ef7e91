//! Severity aggregation across the sub-measures of one observation.
//!
//! A measure family (e.g. the six functional domains: seeing, hearing,
//! walking, cognition, self-care, communication) collapses to one overall
//! ordinal by taking the worst non-null sub-value. Time plays no part here;
//! aggregation is per observation, never across observations.

use serde::{Deserialize, Serialize};
use weft_core::{AggregatedObservation, Observation, Ordinal};

/// Worst (maximum) of the non-null values; `None` when all are null.
pub fn aggregate<I>(values: I) -> Option<Ordinal>
where
  I: IntoIterator<Item = Option<Ordinal>>,
{
  values.into_iter().flatten().max()
}

/// A named group of sub-measure attributes aggregated into one overall value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureFamily {
  /// The attribute name the overall value is recorded under.
  pub name:    String,
  pub members: Vec<String>,
}

impl MeasureFamily {
  pub fn new(
    name: impl Into<String>,
    members: impl IntoIterator<Item = impl Into<String>>,
  ) -> Self {
    Self {
      name:    name.into(),
      members: members.into_iter().map(Into::into).collect(),
    }
  }

  /// The overall value for one observation. Sub-measures absent from the
  /// observation count as null.
  pub fn apply(&self, obs: &Observation) -> Option<Ordinal> {
    aggregate(self.members.iter().map(|member| obs.value_of(member)))
  }
}

/// Attach the overall value to each deduplicated observation.
///
/// With a family, the overall is computed over its members and also recorded
/// in the value map under the family name, so spell construction can target
/// it like any other attribute. Without one, the overall is computed across
/// every attribute on the observation.
pub fn aggregate_observations(
  observations: Vec<Observation>,
  family: Option<&MeasureFamily>,
) -> Vec<AggregatedObservation> {
  observations
    .into_iter()
    .map(|obs| {
      let overall = match family {
        Some(f) => f.apply(&obs),
        None => aggregate(obs.values.values().copied()),
      };
      let Observation {
        entity_id,
        source,
        event_date,
        mut values,
      } = obs;
      if let Some(f) = family {
        values.insert(f.name.clone(), overall);
      }
      AggregatedObservation {
        entity_id,
        source,
        event_date,
        values,
        overall,
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use weft_core::EntityId;

  use super::*;

  #[test]
  fn worst_non_null_wins() {
    let values = [Some(Ordinal(2)), None, Some(Ordinal(1)), None];
    assert_eq!(aggregate(values), Some(Ordinal(2)));
  }

  #[test]
  fn all_null_yields_null() {
    assert_eq!(aggregate([None, None]), None);
  }

  #[test]
  fn zero_is_a_value_not_null() {
    assert_eq!(aggregate([Some(Ordinal(0))]), Some(Ordinal(0)));
  }

  fn obs(values: &[(&str, Option<u8>)]) -> Observation {
    Observation {
      entity_id:  EntityId(1),
      source:     "CEN".into(),
      event_date: NaiveDate::from_ymd_opt(2018, 3, 6).unwrap(),
      values:     values
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(Ordinal)))
        .collect(),
    }
  }

  #[test]
  fn family_ignores_attributes_outside_its_members() {
    let family = MeasureFamily::new("functional", ["seeing", "hearing"]);
    let o = obs(&[
      ("seeing", Some(1)),
      ("hearing", None),
      ("qualification", Some(4)),
    ]);
    assert_eq!(family.apply(&o), Some(Ordinal(1)));
  }

  #[test]
  fn aggregated_observation_carries_overall_under_family_name() {
    let family = MeasureFamily::new("functional", ["seeing", "hearing"]);
    let out = aggregate_observations(
      vec![obs(&[("seeing", Some(2)), ("hearing", Some(1))])],
      Some(&family),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].overall, Some(Ordinal(2)));
    assert_eq!(out[0].value_of("functional"), Some(Ordinal(2)));
  }

  #[test]
  fn without_family_overall_spans_all_attributes() {
    let out = aggregate_observations(
      vec![obs(&[("seeing", Some(1)), ("walking", Some(3))])],
      None,
    );
    assert_eq!(out[0].overall, Some(Ordinal(3)));
    assert_eq!(out[0].values, obs(&[("seeing", Some(1)), ("walking", Some(3))]).values);
  }

  #[test]
  fn family_with_all_null_members_yields_null_overall() {
    let family = MeasureFamily::new("functional", ["seeing", "hearing"]);
    let out = aggregate_observations(
      vec![obs(&[("seeing", None), ("hearing", None)])],
      Some(&family),
    );
    assert_eq!(out[0].overall, None);
    assert_eq!(out[0].values.get("functional"), Some(&None));
  }
}
