//! The generation pipeline behind `POST /generate`.
//!
//! Normalizes the request for its model, resolves a self-served source
//! image to a durable remote URL, runs the external job under a
//! deadline, and hands the resulting artifacts to the persister. The
//! JSON value returned here is the response body.

use std::time::Duration;

use serde_json::{json, Value};

use fluxdeck_core::params::{self, ParamBag};
use fluxdeck_core::registry;
use fluxdeck_fal::{tracing_sink, FalError};
use fluxdeck_media::GenerationMetadata;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Run one generation request end to end.
pub async fn run_generation(
    state: &AppState,
    model_id: &str,
    input: &ParamBag,
) -> AppResult<Value> {
    let spec = registry::resolve(model_id)?;
    let mut adjusted = params::normalize(spec, input, state.config.seed_policy)?;
    tracing::debug!(model = model_id, params = ?adjusted, "Adjusted input for model");

    if spec.requires_source_image {
        resolve_source_image(state, &mut adjusted).await?;
    }

    let progress = tracing_sink();
    let deadline = Duration::from_secs(state.config.job_timeout_secs);
    let output = tokio::time::timeout(
        deadline,
        state.service.run_job(spec.endpoint, &adjusted, &progress),
    )
    .await
    .map_err(|_| AppError::Generation(FalError::Timeout(state.config.job_timeout_secs)))?
    .map_err(AppError::Generation)?;

    let prompt = input
        .get("prompt")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if let Some(video) = output.video {
        let saved = state.persister.persist_video(&video.url, prompt).await?;
        return Ok(json!({ "video": saved, "seed": output.seed }));
    }

    if !output.images.is_empty() {
        // Defensive: the remote may return more images than requested.
        let urls: Vec<String> = output
            .images
            .iter()
            .take(params::num_images(&adjusted))
            .map(|file| file.url.clone())
            .collect();

        let metadata = GenerationMetadata::from_params(prompt, &adjusted, output.seed);
        let seed = metadata.seed;
        let saved = state.persister.persist_images(&urls, &metadata).await;
        return Ok(json!({ "images": saved, "seed": seed }));
    }

    Err(AppError::Generation(FalError::UnexpectedResultShape))
}

/// If `image_url` points at our own upload directory, push the file to
/// the external blob store and rewrite the reference to the returned
/// public URL. External URLs pass through untouched.
async fn resolve_source_image(state: &AppState, params: &mut ParamBag) -> AppResult<()> {
    let Some(url) = params
        .get("image_url")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return Ok(());
    };

    let Some(file_name) = local_upload_name(&url, &state.config.public_base_url) else {
        return Ok(());
    };

    let path = state.config.upload_dir.join(&file_name);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        AppError::Upload(FalError::UploadFailed(format!(
            "Could not read local file {}: {e}",
            path.display()
        )))
    })?;

    let public_url = state
        .service
        .upload_blob(bytes, &file_name)
        .await
        .map_err(AppError::Upload)?;
    tracing::info!(local = %url, remote = %public_url, "Uploaded source image");

    params.insert("image_url".into(), public_url.into());
    Ok(())
}

/// Extract the upload file name from a URL that points back at this
/// server's upload directory, or `None` for any other URL.
///
/// Only the final path component is used, so a crafted URL cannot
/// escape the upload directory.
fn local_upload_name(url: &str, public_base_url: &str) -> Option<String> {
    let path = url.strip_prefix(public_base_url).unwrap_or(url);
    let rest = path.strip_prefix("/uploads/")?;
    let name = std::path::Path::new(rest).file_name()?.to_str()?;
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:3000";

    #[test]
    fn absolute_self_url_resolves_to_file_name() {
        assert_eq!(
            local_upload_name("http://localhost:3000/uploads/123-cat.png", BASE),
            Some("123-cat.png".to_string())
        );
    }

    #[test]
    fn relative_upload_path_resolves() {
        assert_eq!(
            local_upload_name("/uploads/123-cat.png", BASE),
            Some("123-cat.png".to_string())
        );
    }

    #[test]
    fn external_url_passes_through() {
        assert_eq!(local_upload_name("https://cdn.example.com/a.png", BASE), None);
    }

    #[test]
    fn traversal_components_are_dropped() {
        assert_eq!(
            local_upload_name("/uploads/../secrets/key.pem", BASE),
            Some("key.pem".to_string())
        );
    }
}
