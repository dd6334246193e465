//! `POST /upload`: multipart upload of a source image.
//!
//! Files land in the upload directory under a collision-resistant name
//! (millisecond timestamp prefix plus the sanitized original name) and
//! are served back at `/uploads/{name}` for later use as an
//! image-conditioned model's source.

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use fluxdeck_core::naming;
use fluxdeck_media::MediaError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        let file_name =
            naming::upload_file_name(&original_name, chrono::Utc::now().timestamp_millis());
        tokio::fs::write(state.config.upload_dir.join(&file_name), &bytes)
            .await
            .map_err(MediaError::from)?;

        tracing::info!(file_name = %file_name, size = bytes.len(), "Stored upload");
        let file_url = format!("{}/uploads/{file_name}", state.config.public_base_url);
        return Ok(Json(json!({ "fileUrl": file_url })));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}
