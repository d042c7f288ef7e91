//! The source adapter contract.
//!
//! Each external feed (census return, assessment register, benefit file, …)
//! is mapped into canonical [`RawLinkRow`]s by one adapter. Adapters own all
//! code-table knowledge: the mapping from raw survey/assessment codes to the
//! canonical ordinal scale, and the semantics of the event date (including
//! any documented proxy, e.g. a mid-period date).
//!
//! The core never sees raw codes; a misbehaving adapter surfaces as
//! out-of-scale ordinals, which the pipeline rejects row by row.

use crate::row::RawLinkRow;

/// Maps one raw feed into a stream of canonical rows.
pub trait SourceAdapter {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The source label stamped on every emitted row (e.g. `"CEN"`).
  fn source_name(&self) -> &str;

  /// Produce the full canonical row set for this feed.
  fn observations(&self) -> Result<Vec<RawLinkRow>, Self::Error>;
}
