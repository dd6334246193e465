/// Errors from the generation-service client.
#[derive(Debug, thiserror::Error)]
pub enum FalError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code. The body is the
    /// remote diagnostic payload, passed through verbatim.
    #[error("Generation service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// Uploading a local file to the service's blob store failed.
    #[error("Failed to upload file to generation service: {0}")]
    UploadFailed(String),

    /// The job did not reach a terminal state before the deadline.
    #[error("Generation did not complete within {0} seconds")]
    Timeout(u64),

    /// A completed job carried neither image nor video descriptors.
    #[error("Unexpected result format: no images or video in job output")]
    UnexpectedResultShape,
}
