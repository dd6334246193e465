//! Pure domain logic for the FluxDeck generation service.
//!
//! No I/O lives here: the model registry, per-model parameter
//! normalization, media file naming, and content-type classification are
//! all plain functions over plain data, unit-tested in isolation.

pub mod content_type;
pub mod error;
pub mod naming;
pub mod params;
pub mod registry;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
