//! Per-model parameter normalization.
//!
//! [`normalize`] takes the loosely-typed parameter bag a browser form
//! submits and produces the exact field set the external job type
//! accepts: numerics parsed from strings, bounds clamped, per-model
//! defaults filled in, and fields the model does not understand left
//! out entirely. Fields that are not meaningful for a model are absent
//! from the output, never left at stale defaults.

use rand::Rng;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::registry::{ModelSpec, NormalizeProfile};

/// A loosely-typed parameter bag headed for (or from) the wire.
pub type ParamBag = Map<String, Value>;

// ---------------------------------------------------------------------------
// Defaults and bounds
// ---------------------------------------------------------------------------

/// Batch size bounds for all image models.
pub const MIN_NUM_IMAGES: i64 = 1;
/// Upper bound on images per request.
pub const MAX_NUM_IMAGES: i64 = 4;

/// Hard cap on inference steps for the schnell (fast) model.
pub const SCHNELL_MAX_STEPS: i64 = 12;
/// Steps value assumed for schnell when the caller supplies none
/// (capped to [`SCHNELL_MAX_STEPS`] like any other value).
pub const SCHNELL_DEFAULT_STEPS: i64 = 35;

/// Default image size token for models that rebuild their bag.
pub const DEFAULT_IMAGE_SIZE: &str = "landscape_4_3";
/// Default inference steps for the flux-pro and image-to-image jobs.
pub const DEFAULT_STEPS: i64 = 40;
/// Default guidance scale for classic flux-pro.
pub const FLUX_PRO_DEFAULT_GUIDANCE: f64 = 7.5;
/// Default guidance scale for image-to-image.
pub const IMG2IMG_DEFAULT_GUIDANCE: f64 = 3.5;
/// Default strength for image-to-image.
pub const IMG2IMG_DEFAULT_STRENGTH: f64 = 0.95;
/// Most permissive safety tolerance, forced for the flux-pro family.
pub const SAFETY_TOLERANCE_PERMISSIVE: &str = "6";
/// Default clip duration (seconds, string-encoded) for image-to-video.
pub const DEFAULT_VIDEO_DURATION: &str = "5";

/// Exclusive upper bound for locally generated seeds.
const LOCAL_SEED_BOUND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Seed policy
// ---------------------------------------------------------------------------

/// What to do when the caller supplies no seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Leave the seed absent; the external service assigns one and
    /// reports it back in the result.
    #[default]
    ServiceAssigned,
    /// Fill in a locally generated random seed in `[0, 1e9)`.
    LocalRandom,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Normalize a raw parameter bag for the given model.
///
/// Fails with [`CoreError::MissingRequiredField`] when an
/// image-conditioned model is invoked without an `image_url`.
pub fn normalize(
    spec: &ModelSpec,
    raw: &ParamBag,
    seed_policy: SeedPolicy,
) -> Result<ParamBag, CoreError> {
    match spec.profile {
        NormalizeProfile::FluxDev => Ok(flux_dev_bag(raw, seed_policy)),
        NormalizeProfile::Schnell => {
            let mut out = flux_dev_bag(raw, seed_policy);
            let steps = parse_i64(raw.get("num_inference_steps"))
                .unwrap_or(SCHNELL_DEFAULT_STEPS)
                .min(SCHNELL_MAX_STEPS);
            out.insert("num_inference_steps".into(), steps.into());
            // The fast job type rejects guidance_scale outright.
            out.remove("guidance_scale");
            Ok(out)
        }
        NormalizeProfile::FluxProClassic => {
            let mut out = ParamBag::new();
            copy_string(raw, &mut out, "prompt");
            out.insert("image_size".into(), image_size_or_default(raw));
            out.insert("num_images".into(), clamp_num_images(raw).into());
            out.insert(
                "guidance_scale".into(),
                f64_or(raw.get("guidance_scale"), FLUX_PRO_DEFAULT_GUIDANCE).into(),
            );
            out.insert(
                "num_inference_steps".into(),
                i64_or(raw.get("num_inference_steps"), DEFAULT_STEPS).into(),
            );
            insert_seed(&mut out, raw, seed_policy);
            out.insert(
                "safety_tolerance".into(),
                SAFETY_TOLERANCE_PERMISSIVE.into(),
            );
            out.insert(
                "enable_safety_checker".into(),
                safety_checker_flag(raw).into(),
            );
            Ok(out)
        }
        NormalizeProfile::FluxProSlim => {
            // The v1.1/new job types ignore steps and guidance, so those
            // fields are dropped rather than defaulted.
            let mut out = ParamBag::new();
            copy_string(raw, &mut out, "prompt");
            out.insert("image_size".into(), image_size_or_default(raw));
            out.insert("num_images".into(), clamp_num_images(raw).into());
            insert_seed(&mut out, raw, seed_policy);
            out.insert(
                "safety_tolerance".into(),
                SAFETY_TOLERANCE_PERMISSIVE.into(),
            );
            out.insert(
                "enable_safety_checker".into(),
                safety_checker_flag(raw).into(),
            );
            Ok(out)
        }
        NormalizeProfile::FluxLora => {
            let mut out = flux_dev_bag(raw, seed_policy);
            out.insert("loras".into(), Value::Array(sanitize_loras(raw)));
            Ok(out)
        }
        NormalizeProfile::ImageToImage => {
            let image_url = require_image_url(spec, raw)?;
            let mut out = ParamBag::new();
            out.insert("image_url".into(), image_url.into());
            copy_string(raw, &mut out, "prompt");
            out.insert(
                "strength".into(),
                f64_or(raw.get("strength"), IMG2IMG_DEFAULT_STRENGTH).into(),
            );
            out.insert("image_size".into(), image_size_or_default(raw));
            out.insert(
                "num_inference_steps".into(),
                i64_or(raw.get("num_inference_steps"), DEFAULT_STEPS).into(),
            );
            insert_seed(&mut out, raw, seed_policy);
            out.insert(
                "guidance_scale".into(),
                f64_or(raw.get("guidance_scale"), IMG2IMG_DEFAULT_GUIDANCE).into(),
            );
            out.insert("num_images".into(), clamp_num_images(raw).into());
            out.insert(
                "enable_safety_checker".into(),
                safety_checker_flag(raw).into(),
            );
            Ok(out)
        }
        NormalizeProfile::ImageToVideo => {
            let image_url = require_image_url(spec, raw)?;
            let mut out = ParamBag::new();
            copy_string(raw, &mut out, "prompt");
            out.insert("image_url".into(), image_url.into());
            out.insert("duration".into(), duration_token(raw).into());
            Ok(out)
        }
    }
}

/// Read the clamped batch size back out of a normalized bag.
///
/// Defaults to 1 for bags (e.g. image-to-video) that carry no
/// `num_images` field.
pub fn num_images(params: &ParamBag) -> usize {
    parse_i64(params.get("num_images"))
        .unwrap_or(MIN_NUM_IMAGES)
        .clamp(MIN_NUM_IMAGES, MAX_NUM_IMAGES) as usize
}

// ---------------------------------------------------------------------------
// Common field handling
// ---------------------------------------------------------------------------

/// Base bag for the flux/dev family: known fields copied with parsing,
/// batch size clamped, safety checker defaulted off, seed per policy.
fn flux_dev_bag(raw: &ParamBag, seed_policy: SeedPolicy) -> ParamBag {
    let mut out = ParamBag::new();
    copy_string(raw, &mut out, "prompt");
    copy_string(raw, &mut out, "image_size");
    out.insert("num_images".into(), clamp_num_images(raw).into());
    if let Some(steps) = parse_i64(raw.get("num_inference_steps")) {
        out.insert("num_inference_steps".into(), steps.into());
    }
    if let Some(guidance) = parse_f64(raw.get("guidance_scale")) {
        out.insert("guidance_scale".into(), guidance.into());
    }
    out.insert(
        "enable_safety_checker".into(),
        safety_checker_flag(raw).into(),
    );
    insert_seed(&mut out, raw, seed_policy);
    out
}

fn copy_string(raw: &ParamBag, out: &mut ParamBag, key: &str) {
    if let Some(Value::String(s)) = raw.get(key) {
        out.insert(key.into(), s.clone().into());
    }
}

fn image_size_or_default(raw: &ParamBag) -> Value {
    match raw.get("image_size") {
        Some(Value::String(s)) if !s.is_empty() => s.clone().into(),
        _ => DEFAULT_IMAGE_SIZE.into(),
    }
}

fn clamp_num_images(raw: &ParamBag) -> i64 {
    parse_i64(raw.get("num_images"))
        .unwrap_or(MIN_NUM_IMAGES)
        .clamp(MIN_NUM_IMAGES, MAX_NUM_IMAGES)
}

/// Safety filtering is off unless the caller explicitly enables it.
fn safety_checker_flag(raw: &ParamBag) -> bool {
    matches!(raw.get("enable_safety_checker"), Some(Value::Bool(true)))
}

fn insert_seed(out: &mut ParamBag, raw: &ParamBag, policy: SeedPolicy) {
    if let Some(seed) = parse_i64(raw.get("seed")) {
        out.insert("seed".into(), seed.into());
        return;
    }
    if policy == SeedPolicy::LocalRandom {
        let seed = rand::rng().random_range(0..LOCAL_SEED_BOUND);
        out.insert("seed".into(), seed.into());
    }
}

fn require_image_url(spec: &ModelSpec, raw: &ParamBag) -> Result<String, CoreError> {
    match raw.get("image_url") {
        Some(Value::String(url)) if !url.trim().is_empty() => Ok(url.clone()),
        _ => Err(CoreError::missing_field("image_url", spec.id)),
    }
}

/// LoRA weights: paths trimmed, scales parsed (zero or unparseable
/// counts as unset and falls back to 1.0), entries with an empty path
/// dropped. The result may be empty.
fn sanitize_loras(raw: &ParamBag) -> Vec<Value> {
    let entries = match raw.get("loras") {
        Some(Value::Array(entries)) => entries.as_slice(),
        _ => &[],
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let path = obj.get("path")?.as_str()?.trim().to_string();
            if path.is_empty() {
                return None;
            }
            let scale = f64_or(obj.get("scale"), 1.0);
            Some(serde_json::json!({ "path": path, "scale": scale }))
        })
        .collect()
}

/// The video job wants `duration` as a string token regardless of how
/// the caller encoded it.
fn duration_token(raw: &ParamBag) -> String {
    match raw.get("duration") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => DEFAULT_VIDEO_DURATION.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scalar parsing
// ---------------------------------------------------------------------------

/// Parse an integer from a JSON number or numeric string. Fractional
/// values truncate toward zero.
fn parse_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// Parse a float from a JSON number or numeric string.
fn parse_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Float with a default. A zero value counts as unset.
fn f64_or(value: Option<&Value>, default: f64) -> f64 {
    match parse_f64(value) {
        Some(v) if v != 0.0 => v,
        _ => default,
    }
}

/// Integer with a default. A zero value counts as unset.
fn i64_or(value: Option<&Value>, default: i64) -> i64 {
    match parse_i64(value) {
        Some(v) if v != 0 => v,
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
