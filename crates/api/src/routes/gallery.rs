//! `GET /previous-images`: list prior generations, newest first.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use fluxdeck_media::GalleryEntry;

use crate::state::AppState;

/// GET /previous-images
///
/// The listing degrades rather than fails: entries with missing or
/// corrupt sidecars appear with empty metadata.
pub async fn previous_images(State(state): State<AppState>) -> Json<Vec<GalleryEntry>> {
    Json(state.gallery.list(state.config.gallery_page_size).await)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/previous-images", get(previous_images))
}
