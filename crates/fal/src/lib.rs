//! Client for the external generation service (fal.ai queue API).
//!
//! The service is opaque to the rest of the system: jobs go in under an
//! endpoint identifier, media descriptors and a seed come out, and
//! progress lines surface through a side-channel sink with no semantic
//! effect. [`service::GenerationService`] is the seam the API layer
//! depends on; [`client::FalQueueClient`] is the real implementation.

pub mod client;
pub mod error;
pub mod progress;
pub mod service;

pub use client::FalQueueClient;
pub use error::FalError;
pub use progress::{tracing_sink, ProgressSink, ProgressUpdate};
pub use service::{GenerationService, JobOutput, RemoteFile};
