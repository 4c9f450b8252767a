//! Scripted backend and projector

use async_trait::async_trait;
use sonomap_panel::backend::{
    AnalysisBackend, BackendError, BatchRequest, FileFeatures, FilePrediction, FileTranscript,
    FrequencyAnalysis, FrequencySummary, PredictionAnalysis, TermAnalysis,
};
use sonomap_panel::embedding::{ProjectedPoint, Projection, ProjectionRequest, ProjectionService};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: &'static str,
    pub request: BatchRequest,
}

/// Analysis backend whose responses echo the requested filenames
///
/// Each call takes the next queued delay (none once the queue is empty).
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    delays: Mutex<VecDeque<Duration>>,
    failure: Mutex<Option<BackendError>>,
}

impl FakeBackend {
    pub fn push_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    pub fn fail_with(&self, error: BackendError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn respond(&self, endpoint: &'static str, request: &BatchRequest) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(Call {
            endpoint,
            request: request.clone(),
        });

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn audio_frequency_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<FrequencyAnalysis, BackendError> {
        self.respond("audio-frequency-batch", request).await?;
        Ok(FrequencyAnalysis {
            files: request
                .filenames
                .iter()
                .map(|f| FileFeatures {
                    filename: f.clone(),
                    features: [("spectral_centroid".to_string(), 1500.0)].into(),
                })
                .collect(),
            summary: FrequencySummary {
                total_files: request.filenames.len(),
                analyzed_files: request.filenames.len(),
                failed_files: 0,
            },
            ..FrequencyAnalysis::default()
        })
    }

    async fn wav2vec2_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<PredictionAnalysis, BackendError> {
        self.respond("wav2vec2-batch", request).await?;
        Ok(PredictionAnalysis {
            predictions: request
                .filenames
                .iter()
                .map(|f| FilePrediction {
                    filename: f.clone(),
                    predicted_emotion: "neutral".to_string(),
                    confidence: 0.9,
                    ..FilePrediction::default()
                })
                .collect(),
            ..PredictionAnalysis::default()
        })
    }

    async fn whisper_batch(&self, request: &BatchRequest) -> Result<TermAnalysis, BackendError> {
        self.respond("whisper-batch", request).await?;
        Ok(TermAnalysis {
            transcripts: request
                .filenames
                .iter()
                .map(|f| FileTranscript {
                    filename: f.clone(),
                    transcript: "kids are talking by the door".to_string(),
                    word_count: 6,
                })
                .collect(),
            ..TermAnalysis::default()
        })
    }
}

/// Projection service placing file `i` at `(i, 0, ..)`
#[derive(Default)]
pub struct FakeProjector {
    requests: Mutex<Vec<ProjectionRequest>>,
    delays: Mutex<VecDeque<Duration>>,
}

impl FakeProjector {
    pub fn push_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    pub fn requests(&self) -> Vec<ProjectionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ProjectionService for FakeProjector {
    async fn request_projection(
        &self,
        request: &ProjectionRequest,
    ) -> Result<Projection, BackendError> {
        self.requests.lock().unwrap().push(request.clone());

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let dims = request.dimensions.count() as usize;
        let points = request
            .files
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let mut coordinates = vec![0.0; dims];
                coordinates[0] = i as f64;
                ProjectedPoint {
                    filename: f.clone(),
                    coordinates,
                }
            })
            .collect();
        Ok(Projection { points })
    }
}
