//! Selection-to-analysis coordinator
//!
//! [`Panel`] is the single mutation entry point for everything the
//! visualization surface and the user can do: gesture selections, model and
//! dataset choices, file universe, projection settings and analysis kind.
//!
//! Flow:
//! 1. A gesture selection goes through the [`SelectionStore`](crate::selection::SelectionStore);
//!    set-equal updates stop here.
//! 2. A real change of the authoritative selection cancels the pending
//!    debounce. Empty selections clear the analysis at once; anything else
//!    is scheduled after the quiet period.
//! 3. When the quiet period elapses the request is captured (files, active
//!    kind, model, dataset) and dispatched with a fresh sequence number.
//! 4. The completion commits only if its sequence number is still the
//!    latest; kind switches, invalidating model switches and empty
//!    selections bump the sequence so in-flight results are dropped.
//!
//! Configuration changes independently feed the embedding trigger, which
//! asks the projection service for new coordinates.
//!
//! Methods that can start background work spawn tokio tasks and must be
//! called from within a tokio runtime.

use crate::analysis_mode::ModelChangeOutcome;
use crate::backend::{AnalysisBackend, BackendError, HttpBackend};
use crate::dispatcher::{AnalysisDispatcher, DispatchRequest};
use crate::embedding::{ProjectionRequest, ProjectionService};
use crate::error::PanelError;
use crate::fetch::Commit;
use crate::selection::FileSet;
use crate::state::{PanelSnapshot, PanelState, PointClick};
use chrono::Utc;
use sonomap_common::config::PanelSettings;
use sonomap_common::events::{
    AnalysisKind, ClearReason, Dimensionality, EventBus, PanelEvent, ReductionMethod,
    SelectionMode,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// The panel coordination core
///
/// Dropping the panel cancels any pending debounced fetch.
pub struct Panel {
    inner: Arc<PanelInner>,
}

struct PanelInner {
    state: Mutex<PanelState>,
    dispatcher: AnalysisDispatcher,
    projector: Arc<dyn ProjectionService>,
    events: EventBus,
}

impl Panel {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        projector: Arc<dyn ProjectionService>,
        settings: &PanelSettings,
    ) -> Self {
        Self {
            inner: Arc::new(PanelInner {
                state: Mutex::new(PanelState::new(settings.quiet_period)),
                dispatcher: AnalysisDispatcher::new(backend),
                projector,
                events: EventBus::new(settings.event_capacity),
            }),
        }
    }

    /// Panel talking to the HTTP backend described by `settings`
    pub fn with_http(settings: &PanelSettings) -> Result<Self, BackendError> {
        let backend = Arc::new(HttpBackend::new(settings)?);
        Ok(Self::new(backend.clone(), backend, settings))
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.inner.events.subscribe()
    }

    /// Committed view of the whole panel
    pub fn snapshot(&self) -> PanelSnapshot {
        self.inner.lock().snapshot()
    }

    /// Gesture mode the visualization surface should offer
    pub fn active_selection_mode(&self) -> SelectionMode {
        self.inner.lock().selection_mode()
    }

    // ------------------------------------------------------------------
    // Selections
    // ------------------------------------------------------------------

    /// Angle-sweep selection from the 3D view; returns true on a real change
    pub fn update_angle_selection<I, S>(&self, files: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .update_selection(SelectionMode::AngleRange, collect_files(files))
    }

    /// Box/lasso selection from the 2D view; returns true on a real change
    pub fn update_planar_selection<I, S>(&self, files: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .update_selection(SelectionMode::Planar, collect_files(files))
    }

    /// Debounced fetch entry point for a settled selection
    ///
    /// Cancels the pending fetch. An empty set clears the analysis
    /// immediately; otherwise a dispatch is scheduled after the quiet period.
    pub fn on_selection_changed(&self, files: FileSet) {
        let mut state = self.inner.lock();
        self.inner.selection_changed(&mut state, files);
    }

    /// Fetch `request` now and commit the result if it is still the latest
    ///
    /// Bypasses the debounce. `request.kind` must be the active kind so the
    /// committed shape always matches it.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<Commit, PanelError> {
        let seq = {
            let mut state = self.inner.lock();
            let active = state.modes.active();
            if request.kind != active {
                return Err(PanelError::InactiveKind {
                    kind: request.kind,
                    active,
                });
            }
            self.inner.begin_dispatch(&mut state, &request)
        };
        Ok(self.inner.run_dispatch(seq, request).await)
    }

    /// Record a point click; never changes selections or fetches anything
    pub fn record_point_click(&self, file: impl Into<String>, coordinates: Vec<f64>) {
        let file = file.into();
        debug!(file = %file, "Point clicked");
        self.inner.lock().focused_point = Some(PointClick { file, coordinates });
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Switch embedding model
    ///
    /// If the active analysis kind is illegal for the new model it is forced
    /// to the model's default and selections and results are cleared.
    /// Otherwise the active selection is re-analysed with the new model.
    pub fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        let inner = &self.inner;
        let mut state = inner.lock();
        if state.config.model.as_deref() == Some(model.as_str()) {
            return;
        }
        state.config.model = Some(model.clone());

        match state.modes.on_model_changed(&model) {
            ModelChangeOutcome::Forced { previous, current } => {
                info!(
                    model = %model,
                    from = %previous,
                    to = %current,
                    "Model change forced analysis kind"
                );
                state.debouncer.cancel();
                state.selections.clear();
                inner.emit(PanelEvent::AnalysisKindChanged {
                    old_kind: previous,
                    new_kind: current,
                    forced: true,
                    timestamp: Utc::now(),
                });
                inner.clear_analysis(&mut state, ClearReason::ModelChanged);
            }
            ModelChangeOutcome::Adopted { previous, current } => {
                info!(model = %model, kind = %current, "Analysis kind set from first model");
                inner.emit(PanelEvent::AnalysisKindChanged {
                    old_kind: previous,
                    new_kind: current,
                    forced: false,
                    timestamp: Utc::now(),
                });
                inner.reanalyse_active(&mut state);
            }
            ModelChangeOutcome::Kept => inner.reanalyse_active(&mut state),
        }

        inner.observe_config(&mut state);
    }

    /// Switch dataset; `None` deselects it
    pub fn set_dataset(&self, dataset: Option<String>) {
        let inner = &self.inner;
        let mut state = inner.lock();
        if state.config.dataset == dataset {
            return;
        }
        state.config.dataset = dataset;
        inner.reanalyse_active(&mut state);
        inner.observe_config(&mut state);
    }

    /// Replace the file universe; selections and results are cleared
    pub fn set_files(&self, files: Vec<String>) {
        let inner = &self.inner;
        let mut state = inner.lock();
        if state.config.files == files {
            return;
        }
        state.config.files = files;
        state.debouncer.cancel();
        state.selections.clear();
        inner.clear_analysis(&mut state, ClearReason::FilesChanged);
        inner.observe_config(&mut state);
    }

    pub fn set_reduction_method(&self, method: ReductionMethod) {
        let inner = &self.inner;
        let mut state = inner.lock();
        if state.config.method == method {
            return;
        }
        state.config.method = method;
        inner.observe_config(&mut state);
    }

    /// Switch between 2D and 3D
    ///
    /// The selection of the newly authoritative mode is fed to the debounced
    /// fetch path so results follow what the user now sees selected.
    pub fn set_dimensionality(&self, dimensions: Dimensionality) {
        let inner = &self.inner;
        let mut state = inner.lock();
        if state.config.dimensions == dimensions {
            return;
        }
        state.config.dimensions = dimensions;
        let files = state.active_selection().clone();
        inner.selection_changed(&mut state, files);
        inner.observe_config(&mut state);
    }

    /// Switch analysis kind on user request
    ///
    /// Returns `Ok(false)` if `kind` is already active. A switch clears both
    /// selections, the pending fetch and the current result.
    pub fn set_analysis_kind(&self, kind: AnalysisKind) -> Result<bool, PanelError> {
        let inner = &self.inner;
        let mut state = inner.lock();
        let model = state.model().to_string();
        let previous = state.modes.active();

        if !state.modes.select(&model, kind)? {
            return Ok(false);
        }

        info!(from = %previous, to = %kind, "Analysis kind changed");
        state.debouncer.cancel();
        state.selections.clear();
        inner.emit(PanelEvent::AnalysisKindChanged {
            old_kind: previous,
            new_kind: kind,
            forced: false,
            timestamp: Utc::now(),
        });
        inner.clear_analysis(&mut state, ClearReason::KindChanged);
        Ok(true)
    }

    /// Re-request the projection for the current configuration
    ///
    /// Returns the request sequence number, or `None` if the configuration
    /// is incomplete.
    pub fn refresh_embedding(&self) -> Option<u64> {
        let inner = &self.inner;
        let mut state = inner.lock();
        let config = state.config.clone();
        let request = state.embedding_trigger.refresh(&config)?;
        Some(inner.request_projection(&mut state, request))
    }

    /// Cancel the pending debounced fetch
    pub fn shutdown(&self) {
        if self.inner.lock().debouncer.cancel() {
            debug!("Pending analysis cancelled on shutdown");
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn collect_files<I, S>(files: I) -> FileSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    files.into_iter().map(Into::into).collect()
}

impl PanelInner {
    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PanelEvent) {
        self.events.emit_lossy(event);
    }

    fn update_selection(self: &Arc<Self>, mode: SelectionMode, files: FileSet) -> bool {
        let mut state = self.lock();
        let change = match mode {
            SelectionMode::AngleRange => state.selections.update_angle_selection(files),
            SelectionMode::Planar => state.selections.update_planar_selection(files),
        };
        let Some(change) = change else {
            return false;
        };

        self.emit(PanelEvent::SelectionChanged {
            mode,
            files: change.files.iter().cloned().collect(),
            timestamp: Utc::now(),
        });

        if change.mode == state.selection_mode() {
            self.selection_changed(&mut state, change.files);
        } else {
            debug!(mode = %mode, "Selection stored for inactive mode");
        }
        true
    }

    fn selection_changed(self: &Arc<Self>, state: &mut PanelState, files: FileSet) {
        state.debouncer.cancel();

        if files.is_empty() {
            self.clear_analysis(state, ClearReason::EmptySelection);
            return;
        }

        let weak = Arc::downgrade(self);
        state.debouncer.schedule(move |token| {
            if let Some(inner) = weak.upgrade() {
                inner.fire_debounced(token, files);
            }
        });
    }

    /// Re-schedule analysis of the active selection after a model/dataset change
    fn reanalyse_active(self: &Arc<Self>, state: &mut PanelState) {
        let files = state.active_selection().clone();
        if !files.is_empty() {
            self.selection_changed(state, files);
        }
    }

    fn fire_debounced(self: &Arc<Self>, token: u64, files: FileSet) {
        // The sequence number is issued under the same lock as the capture,
        // so any later clear invalidates this dispatch.
        let (seq, request) = {
            let mut state = self.lock();
            if !state.debouncer.complete(token) {
                debug!(token, "Superseded debounce token ignored");
                return;
            }
            let Some(model) = state.config.model.clone() else {
                debug!("No model selected; skipping analysis");
                return;
            };
            let request = DispatchRequest {
                files: files.into_iter().collect(),
                kind: state.modes.active(),
                model,
                dataset: state.config.dataset.clone(),
            };
            (self.begin_dispatch(&mut state, &request), request)
        };

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_dispatch(seq, request).await;
        });
    }

    /// Mark the analysis loading and issue the sequence number for `request`
    fn begin_dispatch(&self, state: &mut PanelState, request: &DispatchRequest) -> u64 {
        let seq = state.analysis.begin();
        info!(
            seq,
            kind = %request.kind,
            file_count = request.files.len(),
            "Dispatching analysis"
        );
        self.emit(PanelEvent::AnalysisStarted {
            seq,
            kind: request.kind,
            file_count: request.files.len(),
            timestamp: Utc::now(),
        });
        seq
    }

    async fn run_dispatch(&self, seq: u64, request: DispatchRequest) -> Commit {
        let outcome = self.dispatcher.route(&request).await;
        let commit = self.lock().analysis.commit(seq, outcome);

        match &commit {
            Commit::Committed => {
                info!(seq, kind = %request.kind, "Analysis committed");
                self.emit(PanelEvent::AnalysisCompleted {
                    seq,
                    kind: request.kind,
                    timestamp: Utc::now(),
                });
            }
            Commit::Failed(message) => {
                warn!(seq, kind = %request.kind, error = %message, "Analysis failed");
                self.emit(PanelEvent::AnalysisFailed {
                    seq,
                    kind: request.kind,
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
            }
            Commit::Discarded { latest } => {
                debug!(seq, latest, "Stale analysis discarded");
                self.emit(PanelEvent::AnalysisDiscarded {
                    seq,
                    latest: *latest,
                    timestamp: Utc::now(),
                });
            }
        }
        commit
    }

    /// Clear the result and drop any in-flight analysis
    fn clear_analysis(&self, state: &mut PanelState, reason: ClearReason) {
        state.analysis.reset();
        debug!(?reason, "Analysis cleared");
        self.emit(PanelEvent::AnalysisCleared {
            reason,
            timestamp: Utc::now(),
        });
    }

    fn observe_config(self: &Arc<Self>, state: &mut PanelState) {
        if let Some(request) = state.embedding_trigger.observe(&state.config) {
            self.request_projection(state, request);
        }
    }

    fn request_projection(self: &Arc<Self>, state: &mut PanelState, request: ProjectionRequest) -> u64 {
        let seq = state.embedding.begin();
        info!(
            seq,
            model = %request.model,
            dataset = %request.dataset,
            method = %request.method,
            dimensions = %request.dimensions,
            file_count = request.files.len(),
            "Requesting projection"
        );
        self.emit(PanelEvent::EmbeddingRequested {
            seq,
            method: request.method,
            dimensions: request.dimensions,
            file_count: request.files.len(),
            timestamp: Utc::now(),
        });

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = inner.projector.request_projection(&request).await;
            let point_count = outcome.as_ref().map(|p| p.len()).unwrap_or(0);
            let commit = inner.lock().embedding.commit(seq, outcome.map(Some));

            match commit {
                Commit::Committed => inner.emit(PanelEvent::EmbeddingCompleted {
                    seq,
                    point_count,
                    timestamp: Utc::now(),
                }),
                Commit::Failed(message) => {
                    warn!(seq, error = %message, "Projection failed");
                    inner.emit(PanelEvent::EmbeddingFailed {
                        seq,
                        message,
                        timestamp: Utc::now(),
                    });
                }
                Commit::Discarded { latest } => {
                    debug!(seq, latest, "Stale projection discarded");
                    inner.emit(PanelEvent::EmbeddingDiscarded {
                        seq,
                        latest,
                        timestamp: Utc::now(),
                    });
                }
            }
        });

        seq
    }
}
