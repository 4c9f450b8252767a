//! HTTP client for the analysis backend
//!
//! Serves both the batch analysis endpoints and the projection endpoint,
//! which live on the same server.

use super::{
    AnalysisBackend, BackendError, BatchRequest, FrequencyAnalysis, PredictionAnalysis,
    TermAnalysis, AUDIO_FREQUENCY_BATCH_PATH, WAV2VEC2_BATCH_PATH, WHISPER_BATCH_PATH,
};
use crate::embedding::{Projection, ProjectionRequest, ProjectionService};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sonomap_common::config::PanelSettings;

const USER_AGENT: &str = concat!("sonomap-panel/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`AnalysisBackend`] and [`ProjectionService`]
#[derive(Clone)]
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
    projection_path: String,
}

impl HttpBackend {
    /// Create a client for the backend described by `settings`
    pub fn new(settings: &PanelSettings) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.backend_url.trim_end_matches('/').to_string(),
            projection_path: settings.projection_path.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST `body` as JSON and decode a JSON response
    ///
    /// Non-success statuses become [`BackendError::Status`] carrying the
    /// response text so the user sees what the server said.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST analysis backend");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn audio_frequency_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<FrequencyAnalysis, BackendError> {
        self.post_json(AUDIO_FREQUENCY_BATCH_PATH, request).await
    }

    async fn wav2vec2_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<PredictionAnalysis, BackendError> {
        self.post_json(WAV2VEC2_BATCH_PATH, request).await
    }

    async fn whisper_batch(&self, request: &BatchRequest) -> Result<TermAnalysis, BackendError> {
        self.post_json(WHISPER_BATCH_PATH, request).await
    }
}

#[async_trait]
impl ProjectionService for HttpBackend {
    async fn request_projection(
        &self,
        request: &ProjectionRequest,
    ) -> Result<Projection, BackendError> {
        let projection: Projection = self.post_json(&self.projection_path, request).await?;
        tracing::info!(
            points = projection.len(),
            method = %request.method,
            dimensions = %request.dimensions,
            "Projection received"
        );
        Ok(projection)
    }
}
