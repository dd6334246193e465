//! Writing generated media to the gallery directory.
//!
//! Every artifact becomes a uniquely named file plus (for images) a
//! `<file>.json` metadata sidecar. Images are re-encoded to PNG no
//! matter what format the service returned; videos are written as
//! opaque byte streams. A failure on one image does not abort the rest
//! of the batch.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fluxdeck_core::naming;
use fluxdeck_core::params::ParamBag;

use crate::error::MediaError;
use crate::fetch::MediaFetcher;

/// Content type of every persisted image (canonical format).
pub const IMAGE_CONTENT_TYPE: &str = "image/png";
/// Content type of persisted videos.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Generation parameters recorded in the sidecar next to each image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl GenerationMetadata {
    /// Pull the sidecar-worthy fields out of a normalized parameter bag.
    ///
    /// `seed` is the seed the service reports back, which wins over
    /// anything in the bag.
    pub fn from_params(prompt: &str, params: &ParamBag, seed: Option<i64>) -> Self {
        Self {
            prompt: prompt.to_string(),
            image_size: params
                .get("image_size")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            num_inference_steps: params.get("num_inference_steps").and_then(|v| v.as_i64()),
            seed: seed.or_else(|| params.get("seed").and_then(|v| v.as_i64())),
        }
    }
}

/// A successfully persisted artifact, as reported back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct SavedMedia {
    /// URL the file is served under (e.g. `/saved_images/acat_..._1.png`).
    pub url: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerationMetadata>,
}

/// Downloads artifacts and writes them (plus sidecars) to the media
/// directory.
pub struct MediaPersister {
    media_dir: PathBuf,
    public_prefix: String,
    fetcher: Arc<dyn MediaFetcher>,
}

impl MediaPersister {
    /// * `media_dir`      - directory persisted media lands in.
    /// * `public_prefix`  - URL prefix the directory is served under
    ///                      (e.g. `/saved_images`).
    pub fn new(media_dir: PathBuf, public_prefix: String, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self {
            media_dir,
            public_prefix,
            fetcher,
        }
    }

    /// Persist a batch of generated images.
    ///
    /// Returns the subset that saved successfully; per-artifact
    /// failures are logged and skipped so that one bad download does
    /// not cost the caller the rest of the batch.
    pub async fn persist_images(
        &self,
        urls: &[String],
        metadata: &GenerationMetadata,
    ) -> Vec<SavedMedia> {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut saved = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            let file_name = naming::image_file_name(
                &metadata.prompt,
                metadata.image_size.as_deref(),
                metadata.num_inference_steps,
                millis,
                i + 1,
            );

            match self.save_image(url, &file_name, metadata).await {
                Ok(media) => saved.push(media),
                Err(e) => {
                    tracing::error!(url = %url, file_name = %file_name, error = %e,
                        "Failed to persist image, skipping");
                }
            }
        }

        saved
    }

    /// Persist a generated video as an opaque byte stream.
    ///
    /// Unlike images, a video failure is fatal: there is only one
    /// artifact, so there is no partial batch to salvage.
    pub async fn persist_video(&self, url: &str, prompt: &str) -> Result<SavedMedia, MediaError> {
        let millis = chrono::Utc::now().timestamp_millis();
        let file_name = naming::video_file_name(prompt, millis);

        let bytes = self.fetcher.fetch(url).await?;
        tokio::fs::write(self.media_dir.join(&file_name), &bytes).await?;

        Ok(SavedMedia {
            url: self.public_url(&file_name),
            content_type: VIDEO_CONTENT_TYPE.to_string(),
            metadata: None,
        })
    }

    async fn save_image(
        &self,
        url: &str,
        file_name: &str,
        metadata: &GenerationMetadata,
    ) -> Result<SavedMedia, MediaError> {
        let bytes = self.fetcher.fetch(url).await?;
        let png = reencode_png(&bytes)?;

        let path = self.media_dir.join(file_name);
        tokio::fs::write(&path, &png).await?;

        // Sidecar goes in only after the media file exists; a sidecar
        // must never point at a file that is not there. The reverse is
        // tolerated, so a sidecar write failure only logs.
        if let Err(e) = write_sidecar(&path, metadata).await {
            tracing::warn!(file_name = %file_name, error = %e,
                "Media file saved but sidecar write failed");
        }

        Ok(SavedMedia {
            url: self.public_url(file_name),
            content_type: IMAGE_CONTENT_TYPE.to_string(),
            metadata: Some(metadata.clone()),
        })
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.public_prefix)
    }
}

/// Re-encode arbitrary image bytes (JPEG, WebP, PNG, ...) to PNG.
fn reencode_png(bytes: &[u8]) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory(bytes)?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}

async fn write_sidecar(media_path: &Path, metadata: &GenerationMetadata) -> Result<(), MediaError> {
    let sidecar_path = sidecar_path(media_path);
    let json = serde_json::to_vec(metadata).map_err(std::io::Error::other)?;
    tokio::fs::write(sidecar_path, json).await?;
    Ok(())
}

/// Sidecar naming: the media file name with `.json` appended
/// (`a.png` -> `a.png.json`).
pub fn sidecar_path(media_path: &Path) -> PathBuf {
    let mut os = media_path.as_os_str().to_owned();
    os.push(".json");
    PathBuf::from(os)
}
