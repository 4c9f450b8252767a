//! sonomap-panel library - embedding explorer analysis panel
//!
//! Coordinates gesture selections over a projected audio embedding with
//! debounced, sequence-checked batch analyses from the analysis backend.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod analysis_mode;
pub mod api;
pub mod backend;
pub mod debounce;
pub mod dispatcher;
pub mod embedding;
pub mod error;
pub mod explain;
pub mod fetch;
pub mod panel;
pub mod selection;
pub mod state;

pub use error::{ApiError, ApiResult, PanelError};
pub use panel::Panel;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub panel: Arc<Panel>,
}

impl AppState {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self { panel }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let panel_routes = Router::new()
        .route("/api/state", get(api::get_state))
        .route("/api/selection/angle", post(api::update_angle_selection))
        .route("/api/selection/planar", post(api::update_planar_selection))
        .route("/api/point", post(api::record_point_click))
        .route("/api/config", post(api::update_config))
        .route("/api/analysis/kind", post(api::set_analysis_kind))
        .route("/api/embedding/refresh", post(api::refresh_embedding))
        .route("/api/explain/:feature", get(api::explain_feature))
        .route("/events", get(api::event_stream));

    Router::new()
        .merge(panel_routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
