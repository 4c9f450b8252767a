//! Test helpers for sonomap-panel integration tests
//!
//! - FakeBackend: scripted analysis backend recording every call
//! - FakeProjector: scripted projection service
//! - panel fixtures wired to both fakes

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{Call, FakeBackend, FakeProjector};

use sonomap_common::config::PanelSettings;
use sonomap_common::events::PanelEvent;
use sonomap_panel::Panel;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub const QUIET: Duration = Duration::from_millis(300);

pub fn test_settings() -> PanelSettings {
    PanelSettings {
        quiet_period: QUIET,
        event_capacity: 64,
        ..PanelSettings::default()
    }
}

/// Panel wired to fresh fakes
pub fn fake_panel() -> (Panel, Arc<FakeBackend>, Arc<FakeProjector>) {
    let backend = Arc::new(FakeBackend::default());
    let projector = Arc::new(FakeProjector::default());
    let panel = Panel::new(backend.clone(), projector.clone(), &test_settings());
    (panel, backend, projector)
}

/// Panel with `model` already selected
pub fn panel_with_model(model: &str) -> (Panel, Arc<FakeBackend>, Arc<FakeProjector>) {
    let (panel, backend, projector) = fake_panel();
    panel.set_model(model);
    (panel, backend, projector)
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Everything currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<PanelEvent>) -> Vec<PanelEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn event_types(events: &[PanelEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.event_type()).collect()
}
