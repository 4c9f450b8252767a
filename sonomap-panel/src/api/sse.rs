//! Server-Sent Events for panel activity

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE stream of every `PanelEvent`
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    sonomap_common::sse::event_bus_sse_stream(state.panel.event_bus(), "sonomap-panel")
}
