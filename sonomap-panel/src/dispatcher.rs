//! Analysis fetch routing
//!
//! Routes a settled selection to the one backend endpoint matching the
//! active analysis kind and wraps the response in the matching
//! [`AnalysisResult`] shape. Sequencing and commit rules live in
//! [`FetchSlot`](crate::fetch::FetchSlot); the panel drives both.

use crate::backend::{AnalysisBackend, BackendError, BatchRequest};
use crate::state::AnalysisResult;
use serde::Serialize;
use sonomap_common::events::AnalysisKind;
use std::sync::Arc;

/// One analysis request, captured at dispatch time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRequest {
    pub files: Vec<String>,
    pub kind: AnalysisKind,
    pub model: String,
    pub dataset: Option<String>,
}

impl DispatchRequest {
    /// Wire payload for the endpoint of `self.kind`
    pub fn payload(&self) -> BatchRequest {
        BatchRequest::for_kind(
            self.kind,
            self.files.clone(),
            &self.model,
            self.dataset.as_deref(),
        )
    }
}

/// Routes requests to the analysis backend
#[derive(Clone)]
pub struct AnalysisDispatcher {
    backend: Arc<dyn AnalysisBackend>,
}

impl AnalysisDispatcher {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    /// Call the endpoint for `request.kind`
    ///
    /// The returned result always has the shape of the requested kind.
    pub async fn route(&self, request: &DispatchRequest) -> Result<AnalysisResult, BackendError> {
        let payload = request.payload();
        match request.kind {
            AnalysisKind::AudioFeatures => self
                .backend
                .audio_frequency_batch(&payload)
                .await
                .map(AnalysisResult::Frequency),
            AnalysisKind::Predictions => self
                .backend
                .wav2vec2_batch(&payload)
                .await
                .map(AnalysisResult::Prediction),
            AnalysisKind::CommonTerms => self
                .backend
                .whisper_batch(&payload)
                .await
                .map(AnalysisResult::Term),
        }
    }
}
