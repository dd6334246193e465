//! Read projection of the media directory as a gallery listing.
//!
//! The directory scan is the only index: every call enumerates the
//! files, pairs them with their sidecars best-effort, and sorts by
//! creation time. O(n) per call, which is fine at single-gallery scale.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use fluxdeck_core::{content_type, Timestamp};

use crate::persist::sidecar_path;

/// One gallery item: a persisted media file plus whatever metadata its
/// sidecar yields.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryEntry {
    /// URL the file is served under.
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    pub content_type: String,
    /// Parsed sidecar contents; an empty object when the sidecar is
    /// missing or corrupt.
    pub metadata: Value,
}

/// Read-only view over the media directory.
pub struct GalleryStore {
    media_dir: PathBuf,
    public_prefix: String,
}

impl GalleryStore {
    pub fn new(media_dir: PathBuf, public_prefix: String) -> Self {
        Self {
            media_dir,
            public_prefix,
        }
    }

    /// List up to `limit` gallery entries, most recent first.
    ///
    /// Degrades rather than fails: a missing directory yields an empty
    /// list, an unreadable file is skipped, and a missing or corrupt
    /// sidecar yields `metadata = {}`.
    pub async fn list(&self, limit: usize) -> Vec<GalleryEntry> {
        let mut dir = match tokio::fs::read_dir(&self.media_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(dir = %self.media_dir.display(), error = %e,
                    "Media directory not readable, returning empty gallery");
                return Vec::new();
            }
        };

        let mut entries = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Error while scanning media directory");
                    break;
                }
            };

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.ends_with(".json") {
                continue;
            }

            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            // Creation time is not available on every filesystem; fall
            // back to the modification time.
            let Ok(created) = meta.created().or_else(|_| meta.modified()) else {
                continue;
            };

            let metadata = read_sidecar(&entry.path()).await;

            entries.push(GalleryEntry {
                url: format!("{}/{file_name}", self.public_prefix),
                created_at: created.into(),
                content_type: content_type::from_file_name(&file_name).to_string(),
                metadata,
            });
        }

        // Newest first; ties broken by name so the ordering is total.
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.url.cmp(&a.url)));
        entries.truncate(limit);
        entries
    }
}

/// Parse a media file's sidecar, yielding an empty object on any
/// failure.
async fn read_sidecar(media_path: &std::path::Path) -> Value {
    let path = sidecar_path(media_path);
    match tokio::fs::read(&path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) if value.is_object() => value,
            _ => {
                tracing::warn!(path = %path.display(), "Corrupt metadata sidecar, ignoring");
                Value::Object(Default::default())
            }
        },
        Err(_) => Value::Object(Default::default()),
    }
}
