//! Media persistence and gallery projection.
//!
//! [`persist::MediaPersister`] downloads generated artifacts, converts
//! images to the canonical PNG format, and writes them to the media
//! directory with JSON metadata sidecars. [`gallery::GalleryStore`]
//! reads that directory back as a time-sorted gallery listing. The
//! directory itself is the only index; nothing in memory survives a
//! restart.

pub mod error;
pub mod fetch;
pub mod gallery;
pub mod persist;

pub use error::MediaError;
pub use fetch::{HttpFetcher, MediaFetcher};
pub use gallery::{GalleryEntry, GalleryStore};
pub use persist::{GenerationMetadata, MediaPersister, SavedMedia};
