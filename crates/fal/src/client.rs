//! REST client for the fal.ai queue API.
//!
//! Wraps the queue endpoints (job submission, status polling with log
//! retrieval, result fetch) and the storage upload flow using
//! [`reqwest`]. Jobs are polled until they reach a terminal state; the
//! caller is responsible for any overall deadline.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use fluxdeck_core::params::ParamBag;

use crate::error::FalError;
use crate::progress::{ProgressSink, ProgressUpdate};
use crate::service::{GenerationService, JobOutput};

/// Default base URL for the queue API.
pub const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";
/// Default base URL for the REST API (storage uploads).
pub const DEFAULT_REST_URL: &str = "https://rest.alpha.fal.ai";
/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Status token for a completed job.
const STATUS_COMPLETED: &str = "COMPLETED";

/// HTTP client for the fal.ai queue and storage APIs.
pub struct FalQueueClient {
    http: reqwest::Client,
    queue_url: String,
    rest_url: String,
    api_key: String,
    poll_interval: Duration,
}

/// Response to a queue submission.
#[derive(Debug, Deserialize)]
struct QueuedJob {
    request_id: String,
}

/// One status poll of a queued job.
#[derive(Debug, Deserialize)]
struct JobStatus {
    status: String,
    #[serde(default)]
    queue_position: Option<u32>,
    #[serde(default)]
    logs: Option<Vec<LogEntry>>,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    message: String,
}

/// Response to a storage upload initiation.
#[derive(Debug, Deserialize)]
struct InitiatedUpload {
    upload_url: String,
    file_url: String,
}

impl FalQueueClient {
    /// Create a client with the given base URLs and API key.
    pub fn new(queue_url: String, rest_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            queue_url,
            rest_url,
            api_key,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    /// Queue a job under `endpoint`, returning its request ID.
    async fn submit(&self, endpoint: &str, input: &ParamBag) -> Result<QueuedJob, FalError> {
        let response = self
            .http
            .post(format!("{}/{endpoint}", self.queue_url))
            .header("Authorization", self.auth_header())
            .json(input)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Poll the status of a queued job, including any new log lines.
    async fn poll_status(&self, endpoint: &str, request_id: &str) -> Result<JobStatus, FalError> {
        let response = self
            .http
            .get(format!(
                "{}/{endpoint}/requests/{request_id}/status",
                self.queue_url
            ))
            .query(&[("logs", "1")])
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the output of a completed job.
    ///
    /// A failed job surfaces here as a non-2xx response whose body is
    /// the remote error payload; it is propagated verbatim inside
    /// [`FalError::Api`].
    async fn fetch_result(&self, endpoint: &str, request_id: &str) -> Result<JobOutput, FalError> {
        let response = self
            .http
            .get(format!(
                "{}/{endpoint}/requests/{request_id}",
                self.queue_url
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`FalError::Api`] carrying
    /// the status and raw body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FalError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FalError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, FalError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationService for FalQueueClient {
    async fn run_job(
        &self,
        endpoint: &str,
        input: &ParamBag,
        progress: &ProgressSink,
    ) -> Result<JobOutput, FalError> {
        let queued = self.submit(endpoint, input).await?;
        tracing::info!(endpoint, request_id = %queued.request_id, "Job queued");

        loop {
            let status = self.poll_status(endpoint, &queued.request_id).await?;
            let logs = status
                .logs
                .unwrap_or_default()
                .into_iter()
                .map(|entry| entry.message)
                .collect();

            (**progress)(ProgressUpdate {
                status: status.status.clone(),
                queue_position: status.queue_position,
                logs,
            });

            if status.status == STATUS_COMPLETED {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        self.fetch_result(endpoint, &queued.request_id).await
    }

    async fn upload_blob(&self, bytes: Vec<u8>, file_name: &str) -> Result<String, FalError> {
        let body = serde_json::json!({
            "file_name": file_name,
            "content_type": fluxdeck_core::content_type::from_file_name(file_name),
        });

        let response = self
            .http
            .post(format!("{}/storage/upload/initiate", self.rest_url))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| FalError::UploadFailed(e.to_string()))?;

        let initiated: InitiatedUpload = Self::parse_response(response)
            .await
            .map_err(|e| FalError::UploadFailed(e.to_string()))?;

        let put = self
            .http
            .put(&initiated.upload_url)
            .body(bytes)
            .send()
            .await
            .map_err(|e| FalError::UploadFailed(e.to_string()))?;

        if !put.status().is_success() {
            return Err(FalError::UploadFailed(format!(
                "Blob store returned status {}",
                put.status()
            )));
        }

        Ok(initiated.file_url)
    }
}
