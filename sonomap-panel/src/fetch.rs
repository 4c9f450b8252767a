//! Fetch state machines
//!
//! Every logical fetch (analysis, embedding) owns a [`FetchSlot`]: the last
//! committed value, the visible fetch state and a monotonically increasing
//! request sequence. A completion may only commit if its sequence number is
//! still the latest issued; anything older is discarded so a slow stale
//! response can never overwrite fresher state.

use serde::Serialize;
use std::fmt::Display;

/// Visible state of one logical fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Ready,
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Monotonic request counter for one fetch category
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Issue the next sequence number
    pub fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }

    /// Make every outstanding sequence number stale
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

/// How a completion was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// Value committed, state is `Ready`
    Committed,
    /// Failure committed, value cleared, state is `Error(message)`
    Failed(String),
    /// Completion was stale and left state untouched
    Discarded { latest: u64 },
}

/// Value, visible state and request sequence of one fetch category
#[derive(Debug, Clone, Default)]
pub struct FetchSlot<T> {
    value: T,
    state: FetchState,
    seq: RequestSequence,
}

impl<T: Default> FetchSlot<T> {
    pub fn new() -> Self {
        Self {
            value: T::default(),
            state: FetchState::Idle,
            seq: RequestSequence::default(),
        }
    }

    /// Start a request: state becomes `Loading` (clearing any error)
    pub fn begin(&mut self) -> u64 {
        self.state = FetchState::Loading;
        self.seq.next()
    }

    /// Apply the completion of request `seq`
    ///
    /// The value is replaced as a whole; on failure it is reset to the
    /// default so no partial or previous data remains next to the error.
    pub fn commit<E: Display>(&mut self, seq: u64, outcome: Result<T, E>) -> Commit {
        if !self.seq.is_latest(seq) {
            return Commit::Discarded {
                latest: self.seq.latest(),
            };
        }

        match outcome {
            Ok(value) => {
                self.value = value;
                self.state = FetchState::Ready;
                Commit::Committed
            }
            Err(e) => {
                let message = e.to_string();
                self.value = T::default();
                self.state = FetchState::Error(message.clone());
                Commit::Failed(message)
            }
        }
    }

    /// Drop the value, return to `Idle` and discard any in-flight completion
    pub fn reset(&mut self) {
        self.seq.invalidate();
        self.value = T::default();
        self.state = FetchState::Idle;
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq.latest()
    }
}
