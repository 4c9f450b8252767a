//! Server-Sent Events (SSE) utilities
//!
//! Turns the EventBus into an SSE response for browser-side presentation layers.

use crate::events::EventBus;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

/// Create an SSE stream carrying every event emitted on `bus`
///
/// The first message is a `ConnectionStatus: connected` event so clients can
/// show connection state before any panel activity. Lagged receivers skip the
/// dropped events and keep streaming.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     sonomap_common::sse::event_bus_sse_stream(state.panel.event_bus(), "sonomap-panel")
/// }
/// ```
pub fn event_bus_sse_stream(
    bus: &EventBus,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);

    let connected = futures::stream::once(async {
        Ok::<_, Infallible>(Event::default().event("ConnectionStatus").data("connected"))
    });

    let events = BroadcastStream::new(bus.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    debug!("Broadcasting SSE event: {}", event.event_type());
                    Some(Ok(Event::default().event(event.event_type()).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(connected.chain(events)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
