//! Health and model status handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState, MODEL_NOT_LOADED};
use paisa_core::ModelSummary;

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" while no model is loaded
    pub status: &'static str,
    pub model_loaded: bool,
}

/// GET /api/health - Liveness and model status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_loaded = state.model.is_loaded();
    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "degraded" },
        model_loaded,
    })
}

/// GET /api/model - Describe the loaded model
pub async fn model_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelSummary>, AppError> {
    state
        .model
        .model()
        .map(|m| Json(m.summary()))
        .ok_or_else(|| AppError::service_unavailable(MODEL_NOT_LOADED))
}
