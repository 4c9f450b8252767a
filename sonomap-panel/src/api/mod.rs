//! HTTP API handlers for sonomap-panel

pub mod handlers;
pub mod health;
pub mod sse;

pub use handlers::{
    explain_feature, get_state, record_point_click, refresh_embedding, set_analysis_kind,
    update_angle_selection, update_config, update_planar_selection,
};
pub use health::health_routes;
pub use sse::event_stream;
