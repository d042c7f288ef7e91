//! Identifier schemes, candidate keys, and the canonical entity id.
//!
//! A candidate key is an identifier drawn from one agency's ID space. It may
//! or may not resolve to a canonical [`EntityId`]; resolution is the job of
//! the authoritative lookup, not of the key itself.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Scheme ──────────────────────────────────────────────────────────────────

/// An identifier system — the agency ID space a raw key was drawn from.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
  Census,
  Health,
  Education,
  Welfare,
  Tax,
  /// Escape hatch for ID spaces outside the fixed taxonomy.
  Other(String),
}

impl Scheme {
  /// Stable short name, used in audit labels and log events.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Census => "census",
      Self::Health => "health",
      Self::Education => "education",
      Self::Welfare => "welfare",
      Self::Tax => "tax",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Scheme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── EntityId ────────────────────────────────────────────────────────────────

/// The canonical person identifier, assigned by the authoritative lookup.
/// Opaque: the value carries no meaning beyond equality.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

// ─── CandidateKey ────────────────────────────────────────────────────────────

/// One raw identifier as it appeared on an input row. Immutable.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CandidateKey {
  pub scheme:    Scheme,
  pub raw_value: String,
}

impl CandidateKey {
  pub fn new(scheme: Scheme, raw_value: impl Into<String>) -> Self {
    Self {
      scheme,
      raw_value: raw_value.into(),
    }
  }
}

impl fmt::Display for CandidateKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.scheme, self.raw_value)
  }
}
