//! Fixed registry mapping logical model names to external job types.
//!
//! Each entry is a data record: the external endpoint identifier, the
//! kind of media the job produces, whether a source image is required,
//! and which normalization profile applies. Adding a model is a new
//! entry in [`MODELS`], not a new code path.

use crate::error::CoreError;

/// Kind of media a model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Image,
    Video,
}

/// Which per-model normalization rules apply.
///
/// Several logical models share a profile (e.g. `text-to-image` and
/// `flux-reference` are both plain flux/dev-style jobs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeProfile {
    /// Pass-through with common parsing/clamping (flux/dev family).
    FluxDev,
    /// flux/dev rules, then steps capped at 12 and guidance removed.
    Schnell,
    /// Classic flux-pro: rebuilt bag with guidance/steps defaults and
    /// the most permissive safety tolerance.
    FluxProClassic,
    /// Newer flux-pro job types that ignore guidance/steps entirely.
    FluxProSlim,
    /// flux/dev rules plus LoRA weight list sanitization.
    FluxLora,
    /// Image-conditioned generation (requires `image_url`).
    ImageToImage,
    /// Image-conditioned video generation (requires `image_url`).
    ImageToVideo,
}

/// One registry entry for a logical model.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    /// Logical name clients send (e.g. `flux-lora`).
    pub id: &'static str,
    /// Opaque external job-type identifier.
    pub endpoint: &'static str,
    /// Media kind the job produces.
    pub kind: ModelKind,
    /// Whether `image_url` must be present in the input.
    pub requires_source_image: bool,
    /// Normalization rules to apply.
    pub profile: NormalizeProfile,
}

/// The fixed model registry.
pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "flux-reference",
        endpoint: "fal-ai/flux-reference",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::FluxDev,
    },
    ModelSpec {
        id: "text-to-image",
        endpoint: "fal-ai/flux/dev",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::FluxDev,
    },
    ModelSpec {
        id: "text-to-image-schnell",
        endpoint: "fal-ai/flux/schnell",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::Schnell,
    },
    ModelSpec {
        id: "flux-pro",
        endpoint: "fal-ai/flux-pro",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::FluxProClassic,
    },
    ModelSpec {
        id: "flux-pro-v1.1",
        endpoint: "fal-ai/flux-pro/v1.1",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::FluxProSlim,
    },
    ModelSpec {
        id: "flux-pro-new",
        endpoint: "fal-ai/flux-pro/new",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::FluxProSlim,
    },
    ModelSpec {
        id: "flux-lora",
        endpoint: "fal-ai/flux-lora",
        kind: ModelKind::Image,
        requires_source_image: false,
        profile: NormalizeProfile::FluxLora,
    },
    ModelSpec {
        id: "image-to-image",
        endpoint: "fal-ai/flux/dev/image-to-image",
        kind: ModelKind::Image,
        requires_source_image: true,
        profile: NormalizeProfile::ImageToImage,
    },
    ModelSpec {
        id: "image-to-video",
        endpoint: "fal-ai/runway-gen3/turbo/image-to-video",
        kind: ModelKind::Video,
        requires_source_image: true,
        profile: NormalizeProfile::ImageToVideo,
    },
];

/// Look up a model by its logical name.
pub fn resolve(model_id: &str) -> Result<&'static ModelSpec, CoreError> {
    MODELS
        .iter()
        .find(|spec| spec.id == model_id)
        .ok_or_else(|| CoreError::InvalidModel(model_id.to_string()))
}
