//! Content-type classification by file extension.

/// Fallback for unrecognized extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Map a file extension (without the dot, any case) to a MIME type.
pub fn from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => OCTET_STREAM,
    }
}

/// Classify a file name by its extension, defaulting to
/// [`OCTET_STREAM`] when there is none.
pub fn from_file_name(name: &str) -> &'static str {
    match name.rsplit_once('.') {
        Some((_, ext)) => from_extension(ext),
        None => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(from_extension("png"), "image/png");
        assert_eq!(from_extension("JPG"), "image/jpeg");
        assert_eq!(from_extension("mp4"), "video/mp4");
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(from_extension("xyz"), OCTET_STREAM);
    }

    #[test]
    fn file_name_classification() {
        assert_eq!(from_file_name("acat_123_1.png"), "image/png");
        assert_eq!(from_file_name("clip_123.mp4"), "video/mp4");
        assert_eq!(from_file_name("no_extension"), OCTET_STREAM);
    }
}
