use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use fluxdeck_core::error::CoreError;
use fluxdeck_fal::FalError;
use fluxdeck_media::MediaError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors from the core, client, and media crates and
/// implements [`IntoResponse`] to produce consistent JSON error bodies
/// of the shape `{ "error", "code", "body"? }`, where `body` is the
/// remote diagnostic payload when the external service supplied one.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request validation failed (unknown model, missing field).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Uploading a local source image to the external blob store failed.
    #[error("Failed to upload image to generation service: {0}")]
    Upload(#[source] FalError),

    /// The external generation job failed, timed out, or returned
    /// malformed output.
    #[error("Error in content generation: {0}")]
    Generation(#[source] FalError),

    /// Persisting media to disk failed fatally (video only; image
    /// failures degrade to a shorter batch instead).
    #[error("Failed to save media: {0}")]
    Media(#[from] MediaError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, remote_body) = match &self {
            AppError::Core(core) => {
                let code = match core {
                    CoreError::InvalidModel(_) => "INVALID_MODEL",
                    CoreError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
                };
                (StatusCode::BAD_REQUEST, code, core.to_string(), None)
            }

            AppError::Upload(cause) => {
                tracing::error!(error = %cause, "Source image upload failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPLOAD_FAILED",
                    self.to_string(),
                    remote_payload(cause),
                )
            }

            AppError::Generation(cause) => {
                tracing::error!(error = %cause, "Generation failed");
                let (status, code) = match cause {
                    FalError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT"),
                    _ => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
                };
                (status, code, self.to_string(), remote_payload(cause))
            }

            AppError::Media(cause) => {
                tracing::error!(error = %cause, "Media persistence failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILED",
                    self.to_string(),
                    None,
                )
            }

            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(remote) = remote_body {
            body["body"] = remote;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Extract the remote diagnostic payload from a service error, verbatim.
///
/// The raw body is parsed as JSON when possible so clients see the
/// structured payload the service sent, and as a plain string otherwise.
fn remote_payload(err: &FalError) -> Option<Value> {
    match err {
        FalError::Api { body, .. } => Some(
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_payload_parses_json_bodies() {
        let err = FalError::Api {
            status: 422,
            body: r#"{"detail":[{"msg":"invalid prompt"}]}"#.to_string(),
        };
        let payload = remote_payload(&err).unwrap();
        assert_eq!(payload["detail"][0]["msg"], "invalid prompt");
    }

    #[test]
    fn remote_payload_keeps_non_json_verbatim() {
        let err = FalError::Api {
            status: 500,
            body: "upstream exploded".to_string(),
        };
        assert_eq!(
            remote_payload(&err).unwrap(),
            Value::String("upstream exploded".to_string())
        );
    }

    #[test]
    fn remote_payload_absent_for_transport_errors() {
        assert!(remote_payload(&FalError::Timeout(600)).is_none());
        assert!(remote_payload(&FalError::UnexpectedResultShape).is_none());
    }
}
