use std::sync::Arc;

use fluxdeck_fal::GenerationService;
use fluxdeck_media::{GalleryStore, MediaPersister};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`). The
/// generation service is a trait object so integration tests can swap
/// in a mock.
#[derive(Clone)]
pub struct AppState {
    /// Immutable server configuration.
    pub config: Arc<ServerConfig>,
    /// External generation service client.
    pub service: Arc<dyn GenerationService>,
    /// Writes generated media and sidecars to the media directory.
    pub persister: Arc<MediaPersister>,
    /// Read-only gallery projection over the media directory.
    pub gallery: Arc<GalleryStore>,
}
