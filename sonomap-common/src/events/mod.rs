//! Event types for the SonoMap event system
//!
//! Provides the panel event definitions and the EventBus that distributes them.

mod panel_types;

pub use panel_types::{AnalysisKind, ClearReason, Dimensionality, ReductionMethod, SelectionMode};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Panel event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PanelEvent {
    /// A visualization mode produced a different selection
    SelectionChanged {
        /// Mode that produced the selection
        mode: SelectionMode,
        /// Selected file identifiers, sorted
        files: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// Active analysis kind changed (user switch or model-forced)
    AnalysisKindChanged {
        old_kind: AnalysisKind,
        new_kind: AnalysisKind,
        /// True when a model change forced the switch
        forced: bool,
        timestamp: DateTime<Utc>,
    },

    /// Analysis dispatch issued to the backend
    AnalysisStarted {
        seq: u64,
        kind: AnalysisKind,
        file_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Analysis result committed
    AnalysisCompleted {
        seq: u64,
        kind: AnalysisKind,
        timestamp: DateTime<Utc>,
    },

    /// Analysis failed; the result was cleared
    AnalysisFailed {
        seq: u64,
        kind: AnalysisKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A completion arrived after a newer request and was dropped
    AnalysisDiscarded {
        seq: u64,
        latest: u64,
        timestamp: DateTime<Utc>,
    },

    /// Analysis result cleared without a fetch
    AnalysisCleared {
        reason: ClearReason,
        timestamp: DateTime<Utc>,
    },

    /// Projection requested from the projection service
    EmbeddingRequested {
        seq: u64,
        method: ReductionMethod,
        dimensions: Dimensionality,
        file_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Projection committed
    EmbeddingCompleted {
        seq: u64,
        point_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Projection failed
    EmbeddingFailed {
        seq: u64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A projection completion arrived after a newer request and was dropped
    EmbeddingDiscarded {
        seq: u64,
        latest: u64,
        timestamp: DateTime<Utc>,
    },
}

impl PanelEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            PanelEvent::SelectionChanged { .. } => "SelectionChanged",
            PanelEvent::AnalysisKindChanged { .. } => "AnalysisKindChanged",
            PanelEvent::AnalysisStarted { .. } => "AnalysisStarted",
            PanelEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            PanelEvent::AnalysisFailed { .. } => "AnalysisFailed",
            PanelEvent::AnalysisDiscarded { .. } => "AnalysisDiscarded",
            PanelEvent::AnalysisCleared { .. } => "AnalysisCleared",
            PanelEvent::EmbeddingRequested { .. } => "EmbeddingRequested",
            PanelEvent::EmbeddingCompleted { .. } => "EmbeddingCompleted",
            PanelEvent::EmbeddingFailed { .. } => "EmbeddingFailed",
            PanelEvent::EmbeddingDiscarded { .. } => "EmbeddingDiscarded",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for panel events
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use sonomap_common::events::{EventBus, PanelEvent, ClearReason};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(PanelEvent::AnalysisCleared {
///     reason: ClearReason::EmptySelection,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PanelEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PanelEvent,
    ) -> Result<usize, broadcast::error::SendError<PanelEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PanelEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = PanelEvent::AnalysisStarted {
            seq: 4,
            kind: AnalysisKind::AudioFeatures,
            file_count: 2,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AnalysisStarted");
        assert_eq!(json["kind"], "audio-features");
        assert_eq!(json["seq"], 4);
        assert_eq!(event.event_type(), "AnalysisStarted");
    }

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(10);
        let result = bus.emit(PanelEvent::AnalysisCleared {
            reason: ClearReason::KindChanged,
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
        assert_eq!(bus.capacity(), 10);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus
            .emit(PanelEvent::SelectionChanged {
                mode: SelectionMode::Planar,
                files: vec!["a.wav".to_string()],
                timestamp: Utc::now(),
            })
            .unwrap();
        assert_eq!(delivered, 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                PanelEvent::SelectionChanged { mode, files, .. } => {
                    assert_eq!(mode, SelectionMode::Planar);
                    assert_eq!(files, vec!["a.wav".to_string()]);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }
}
