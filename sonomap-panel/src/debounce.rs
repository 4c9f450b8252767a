//! Trailing debounce for selection-driven fetches
//!
//! Box/lasso drags and angle sweeps emit many intermediate selections. Each
//! schedule cancels the previous pending invocation and starts a fresh quiet
//! period, so only the last selection of a burst fires.
//!
//! Cancellation is idempotent and also happens when the [`Debouncer`] is
//! dropped. The callback receives its token id; owners that keep the
//! debouncer behind a lock should confirm the token with
//! [`Debouncer::complete`] under that lock before acting, which closes the
//! window between the timer expiring and a concurrent cancel.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to one pending deferred invocation
#[derive(Debug)]
pub struct DebounceToken {
    id: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl DebounceToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancel the invocation; safe to call repeatedly
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Schedules at most one deferred callback at a time
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Option<DebounceToken>,
    next_id: u64,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
            next_id: 0,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Cancel any pending invocation and schedule `on_fire` after the quiet period
    ///
    /// Must be called from within a tokio runtime. Returns the new token id.
    pub fn schedule<F>(&mut self, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let quiet_period = self.quiet_period;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(quiet_period) => {
                    if !cancelled.is_cancelled() {
                        on_fire(id);
                    }
                }
            }
        });

        debug!(token = id, quiet_ms = quiet_period.as_millis() as u64, "Debounce scheduled");
        self.pending = Some(DebounceToken { id, cancel, handle });
        id
    }

    /// Cancel the pending invocation, if any
    ///
    /// Returns true if a live token was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                let live = !token.is_finished() && !token.is_cancelled();
                token.cancel();
                if live {
                    debug!(token = token.id(), "Debounce cancelled");
                }
                live
            }
            None => false,
        }
    }

    /// Whether `id` is the current, uncancelled token
    pub fn is_current(&self, id: u64) -> bool {
        self.pending
            .as_ref()
            .map(|token| token.id() == id && !token.is_cancelled())
            .unwrap_or(false)
    }

    /// Retire token `id` after it fired
    ///
    /// Returns false if the token was superseded or cancelled in the
    /// meantime, in which case the caller must not act.
    pub fn complete(&mut self, id: u64) -> bool {
        if self.is_current(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Id of the live pending token, if any
    pub fn pending_id(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .filter(|token| !token.is_cancelled())
            .map(|token| token.id())
    }

    /// Whether a scheduled invocation is still waiting to fire
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|token| !token.is_cancelled() && !token.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
