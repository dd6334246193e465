//! `POST /generate`: run a generation job and persist its output.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use fluxdeck_core::params::ParamBag;

use crate::error::AppResult;
use crate::orchestrator;
use crate::state::AppState;

/// Request body: a logical model name plus the raw parameter bag from
/// the browser form.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    #[serde(default)]
    pub input: ParamBag,
}

/// POST /generate
///
/// Responds with `{ "images": [...], "seed" }` for image models or
/// `{ "video": {...}, "seed" }` for the video model.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<Value>> {
    tracing::info!(model = %request.model, "Received generate request");
    let body = orchestrator::run_generation(&state, &request.model, &request.input).await?;
    Ok(Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate))
}
