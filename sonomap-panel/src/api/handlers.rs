//! HTTP request handlers
//!
//! Thin adapters from JSON requests to [`Panel`](crate::Panel) operations.
//! Analysis results are never returned from mutations; clients read
//! `/api/state` or follow `/events`.

use crate::error::{ApiError, ApiResult};
use crate::explain::explain;
use crate::state::PanelSnapshot;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sonomap_common::events::{AnalysisKind, Dimensionality, ReductionMethod};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PointClickRequest {
    pub file: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Partial configuration update; absent fields are left unchanged
///
/// An empty `dataset` string deselects the dataset.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigUpdateRequest {
    pub model: Option<String>,
    pub dataset: Option<String>,
    pub files: Option<Vec<String>>,
    pub method: Option<ReductionMethod>,
    pub dimensions: Option<Dimensionality>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisKindRequest {
    pub kind: AnalysisKind,
}

#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub seq: u64,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub feature: String,
    pub explanation: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<PanelSnapshot> {
    Json(state.panel.snapshot())
}

/// POST /api/selection/angle
pub async fn update_angle_selection(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Json<ChangeResponse> {
    let changed = state.panel.update_angle_selection(req.files);
    Json(ChangeResponse { changed })
}

/// POST /api/selection/planar
pub async fn update_planar_selection(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Json<ChangeResponse> {
    let changed = state.panel.update_planar_selection(req.files);
    Json(ChangeResponse { changed })
}

/// POST /api/point
///
/// The clicked file must belong to the current file universe.
pub async fn record_point_click(
    State(state): State<AppState>,
    Json(req): Json<PointClickRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let snapshot = state.panel.snapshot();
    if !snapshot.config.files.iter().any(|f| f == &req.file) {
        return Err(ApiError::NotFound(format!("file '{}'", req.file)));
    }
    state.panel.record_point_click(req.file, req.coordinates);
    Ok(Json(ChangeResponse { changed: true }))
}

/// POST /api/config
pub async fn update_config(
    State(state): State<AppState>,
    Json(req): Json<ConfigUpdateRequest>,
) -> ApiResult<Json<PanelSnapshot>> {
    if matches!(req.model.as_deref(), Some(m) if m.trim().is_empty()) {
        return Err(ApiError::BadRequest("model must not be empty".to_string()));
    }

    let panel = &state.panel;
    if let Some(model) = req.model {
        info!(model = %model, "Model selected");
        panel.set_model(model);
    }
    if let Some(dataset) = req.dataset {
        panel.set_dataset(Some(dataset).filter(|d| !d.is_empty()));
    }
    if let Some(files) = req.files {
        panel.set_files(files);
    }
    if let Some(method) = req.method {
        panel.set_reduction_method(method);
    }
    if let Some(dimensions) = req.dimensions {
        panel.set_dimensionality(dimensions);
    }

    Ok(Json(panel.snapshot()))
}

/// POST /api/analysis/kind
pub async fn set_analysis_kind(
    State(state): State<AppState>,
    Json(req): Json<AnalysisKindRequest>,
) -> ApiResult<Json<ChangeResponse>> {
    let changed = state.panel.set_analysis_kind(req.kind)?;
    Ok(Json(ChangeResponse { changed }))
}

/// POST /api/embedding/refresh
pub async fn refresh_embedding(State(state): State<AppState>) -> ApiResult<Json<RefreshResponse>> {
    let seq = state.panel.refresh_embedding().ok_or_else(|| {
        ApiError::BadRequest("model, dataset and files must be set before projecting".to_string())
    })?;
    Ok(Json(RefreshResponse { seq }))
}

/// GET /api/explain/:feature
pub async fn explain_feature(Path(feature): Path<String>) -> Json<ExplainResponse> {
    let explanation = explain(&feature);
    Json(ExplainResponse {
        feature,
        explanation,
    })
}
