//! Error types for `weft-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// An attribute value fell outside the configured ordinal scale. The whole
  /// observation is rejected; clamping would corrupt severity aggregation.
  #[error(
    "row {row_id}: ordinal value {value} for attribute {attribute:?} exceeds scale maximum {max}"
  )]
  OrdinalOutOfRange {
    row_id:    Uuid,
    attribute: String,
    value:     u8,
    max:       u8,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
