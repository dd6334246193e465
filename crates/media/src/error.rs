/// Errors while persisting or reading back media files.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Downloading artifact bytes from the remote URL failed.
    #[error("Failed to fetch media from {url}: {reason}")]
    Fetch {
        /// Remote URL the fetch was issued against.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// Decoding or re-encoding image bytes failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
