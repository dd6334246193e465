//! The [`GenerationService`] seam between the API layer and the
//! external service, plus the job output types shared by both.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fluxdeck_core::params::ParamBag;

use crate::error::FalError;
use crate::progress::ProgressSink;

/// A media descriptor returned by a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Public URL the bytes can be fetched from.
    pub url: String,
    /// Content type as reported by the service, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Output of a completed generation job.
///
/// Image jobs fill `images`; the video job fills `video`. Extra fields
/// in the remote payload are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobOutput {
    #[serde(default)]
    pub images: Vec<RemoteFile>,
    #[serde(default)]
    pub video: Option<RemoteFile>,
    /// Seed the service actually used (it assigns one when the request
    /// carried none).
    #[serde(default)]
    pub seed: Option<i64>,
}

/// Asynchronous job submission against the external generation service.
///
/// The real implementation is [`crate::FalQueueClient`]; integration
/// tests inject a mock.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submit `input` under the external `endpoint` identifier and
    /// block until the job reaches a terminal state. Progress is
    /// surfaced through `progress` for observability only.
    async fn run_job(
        &self,
        endpoint: &str,
        input: &ParamBag,
        progress: &ProgressSink,
    ) -> Result<JobOutput, FalError>;

    /// Upload raw bytes to the service's blob store, returning the
    /// public URL under which they are reachable.
    async fn upload_blob(&self, bytes: Vec<u8>, file_name: &str) -> Result<String, FalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_output_deserializes() {
        let out: JobOutput = serde_json::from_str(
            r#"{
                "images": [
                    { "url": "https://cdn/a.jpeg", "content_type": "image/jpeg" },
                    { "url": "https://cdn/b.jpeg" }
                ],
                "seed": 1234,
                "timings": { "inference": 1.2 }
            }"#,
        )
        .unwrap();
        assert_eq!(out.images.len(), 2);
        assert!(out.video.is_none());
        assert_eq!(out.seed, Some(1234));
        assert_eq!(out.images[1].content_type, None);
    }

    #[test]
    fn video_output_deserializes() {
        let out: JobOutput = serde_json::from_str(
            r#"{ "video": { "url": "https://cdn/clip.mp4", "content_type": "video/mp4" }, "seed": 7 }"#,
        )
        .unwrap();
        assert!(out.images.is_empty());
        assert_eq!(out.video.unwrap().url, "https://cdn/clip.mp4");
    }

    #[test]
    fn empty_output_deserializes_to_neither() {
        let out: JobOutput = serde_json::from_str("{}").unwrap();
        assert!(out.images.is_empty());
        assert!(out.video.is_none());
        assert!(out.seed.is_none());
    }
}
