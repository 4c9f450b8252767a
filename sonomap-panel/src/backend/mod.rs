//! Analysis backend interface
//!
//! The backend exposes one batch endpoint per analysis kind:
//! - `POST /inferences/audio-frequency-batch` → [`FrequencyAnalysis`]
//! - `POST /inferences/wav2vec2-batch` → [`PredictionAnalysis`]
//! - `POST /inferences/whisper-batch` → [`TermAnalysis`]
//!
//! [`AnalysisBackend`] is the seam the dispatcher calls through;
//! [`HttpBackend`] is the production implementation.

pub mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{
    BatchRequest, CacheStats, FeatureStatistics, FileFeatures, FilePrediction, FileTranscript,
    FrequencyAnalysis, FrequencySummary, Histogram, PredictionAnalysis, PredictionSummary,
    RankedFeature, TermAnalysis, TermCount, TermSummary,
};

use async_trait::async_trait;
use thiserror::Error;

pub const AUDIO_FREQUENCY_BATCH_PATH: &str = "/inferences/audio-frequency-batch";
pub const WAV2VEC2_BATCH_PATH: &str = "/inferences/wav2vec2-batch";
pub const WHISPER_BATCH_PATH: &str = "/inferences/whisper-batch";

/// Backend call errors
///
/// The `Display` text is what the panel shows as the fetch error message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Request never reached the server (connection refused, timeout, ...)
    #[error("Network error: could not reach the analysis backend ({0})")]
    Network(String),

    /// Server answered with a non-success status
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON shape
    #[error("Malformed response from the analysis backend: {0}")]
    Parse(String),
}

/// Batch analysis endpoints
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Audio feature statistics (`audio-features`)
    async fn audio_frequency_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<FrequencyAnalysis, BackendError>;

    /// Emotion predictions (`predictions`)
    async fn wav2vec2_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<PredictionAnalysis, BackendError>;

    /// Transcript term statistics (`common-terms`)
    async fn whisper_batch(&self, request: &BatchRequest) -> Result<TermAnalysis, BackendError>;
}
