//! Deterministic file naming for persisted media.
//!
//! Names are derived from the prompt plus the salient generation
//! parameters, then made collision-proof with a millisecond timestamp
//! and a 1-based batch index. Two artifacts from the same request with
//! identical prompts still get distinct names.

/// Reduce a prompt to a filesystem-safe slug: ASCII alphanumerics only,
/// lowercased, truncated to 20 characters.
pub fn prompt_slug(prompt: &str) -> String {
    prompt
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(20)
        .collect()
}

/// File name for a persisted image.
///
/// Format: `{slug}_{image_size}_s{steps}_{millis}_{index}.png`, where
/// the image-size and steps segments are omitted when the model carried
/// no such parameter. `index` is 1-based within the batch.
pub fn image_file_name(
    prompt: &str,
    image_size: Option<&str>,
    steps: Option<i64>,
    timestamp_millis: i64,
    index: usize,
) -> String {
    let mut name = prompt_slug(prompt);
    if let Some(size) = image_size {
        name.push('_');
        name.push_str(size);
    }
    if let Some(steps) = steps {
        name.push_str(&format!("_s{steps}"));
    }
    name.push_str(&format!("_{timestamp_millis}_{index}.png"));
    name
}

/// File name for a persisted video: `{slug}_{millis}.mp4`.
pub fn video_file_name(prompt: &str, timestamp_millis: i64) -> String {
    format!("{}_{timestamp_millis}.mp4", prompt_slug(prompt))
}

/// Sanitize an uploaded file's original name: anything outside
/// `[A-Za-z0-9.\-_]` is stripped.
pub fn sanitize_upload_name(original: &str) -> String {
    original
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// Collision-resistant name for an uploaded file:
/// `{millis}-{sanitized original name}`.
pub fn upload_file_name(original: &str, timestamp_millis: i64) -> String {
    format!("{timestamp_millis}-{}", sanitize_upload_name(original))
}
