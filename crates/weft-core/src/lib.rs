//! Core types and trait definitions for the Weft record-linkage pipeline.
//!
//! This crate is deliberately free of I/O: it holds the data contracts shared
//! by every pipeline stage (candidate keys, link rows, observations, spells)
//! and the two external-collaborator traits (source adapters and the
//! authoritative identity lookup). All other crates depend on it; it depends
//! on nothing heavier than chrono and serde.

pub mod adapter;
pub mod error;
pub mod key;
pub mod lookup;
pub mod observation;
pub mod row;
pub mod spell;

pub use adapter::SourceAdapter;
pub use error::{Error, Result};
pub use key::{CandidateKey, EntityId, Scheme};
pub use lookup::{IdentityLookup, TableLookup};
pub use observation::{AggregatedObservation, Observation, Ordinal, OrdinalScale};
pub use row::{RawLinkRow, dedup_rows};
pub use spell::{OPEN_FINISH, Spell};
