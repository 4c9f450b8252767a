//! Embedding projection trigger
//!
//! Whenever the model, dataset, file universe, reduction method or
//! dimensionality changes, a fresh projection of the whole universe is
//! requested from the projection service. There is no debounce here: every
//! configuration change is a deliberate user action. Nothing is requested
//! until a model and a dataset are chosen and the universe is non-empty.

use crate::backend::BackendError;
use crate::state::PanelConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonomap_common::events::{Dimensionality, ReductionMethod};

/// Projection request sent to the projection service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub model: String,
    pub dataset: String,
    #[serde(rename = "filenames")]
    pub files: Vec<String>,
    pub method: ReductionMethod,
    #[serde(rename = "n_components")]
    pub dimensions: Dimensionality,
}

impl ProjectionRequest {
    /// Build a request from the panel configuration, if it is complete
    pub fn from_config(config: &PanelConfig) -> Option<Self> {
        let model = config.model.as_deref().filter(|m| !m.is_empty())?;
        let dataset = config.dataset.as_deref().filter(|d| !d.is_empty())?;
        if config.files.is_empty() {
            return None;
        }

        Some(Self {
            model: model.to_string(),
            dataset: dataset.to_string(),
            files: config.files.clone(),
            method: config.method,
            dimensions: config.dimensions,
        })
    }
}

/// One projected file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub filename: String,
    pub coordinates: Vec<f64>,
}

/// Projected coordinates for a file universe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(default)]
    pub points: Vec<ProjectedPoint>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, filename: &str) -> Option<&ProjectedPoint> {
        self.points.iter().find(|p| p.filename == filename)
    }
}

/// Dimensionality-reduction service (PCA/UMAP/t-SNE run elsewhere)
#[async_trait]
pub trait ProjectionService: Send + Sync {
    async fn request_projection(
        &self,
        request: &ProjectionRequest,
    ) -> Result<Projection, BackendError>;
}

/// Decides when the configuration warrants a new projection
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTrigger {
    last: Option<PanelConfig>,
}

impl EmbeddingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the current configuration
    ///
    /// Returns a request when the configuration differs from the last one
    /// observed and is complete enough to project.
    pub fn observe(&mut self, config: &PanelConfig) -> Option<ProjectionRequest> {
        if self.last.as_ref() == Some(config) {
            return None;
        }
        self.last = Some(config.clone());
        ProjectionRequest::from_config(config)
    }

    /// Manual refresh: re-issue the request for the current configuration
    pub fn refresh(&mut self, config: &PanelConfig) -> Option<ProjectionRequest> {
        self.last = Some(config.clone());
        ProjectionRequest::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> PanelConfig {
        PanelConfig {
            model: Some("wav2vec2".into()),
            dataset: Some("ravdess".into()),
            files: vec!["a.wav".into(), "b.wav".into()],
            method: ReductionMethod::Umap,
            dimensions: Dimensionality::Three,
        }
    }

    #[test]
    fn test_incomplete_config_requests_nothing() {
        let mut trigger = EmbeddingTrigger::new();

        let mut config = complete_config();
        config.model = None;
        assert!(trigger.observe(&config).is_none());

        let mut config = complete_config();
        config.dataset = None;
        assert!(trigger.observe(&config).is_none());

        let mut config = complete_config();
        config.files.clear();
        assert!(trigger.observe(&config).is_none());
    }

    #[test]
    fn test_each_change_requests_immediately() {
        let mut trigger = EmbeddingTrigger::new();
        let mut config = complete_config();

        let request = trigger.observe(&config).unwrap();
        assert_eq!(request.files, vec!["a.wav", "b.wav"]);
        assert_eq!(request.method, ReductionMethod::Umap);

        // Unchanged configuration does not re-request
        assert!(trigger.observe(&config).is_none());

        config.dimensions = Dimensionality::Two;
        let request = trigger.observe(&config).unwrap();
        assert_eq!(request.dimensions, Dimensionality::Two);

        config.method = ReductionMethod::Tsne;
        assert!(trigger.observe(&config).is_some());
    }

    #[test]
    fn test_refresh_reissues_same_request() {
        let mut trigger = EmbeddingTrigger::new();
        let config = complete_config();

        let first = trigger.observe(&config).unwrap();
        let refreshed = trigger.refresh(&config).unwrap();
        assert_eq!(first, refreshed);
    }

    #[test]
    fn test_request_wire_format() {
        let request = ProjectionRequest::from_config(&complete_config()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["filenames"][1], "b.wav");
        assert_eq!(body["method"], "umap");
        assert_eq!(body["n_components"], 3);
    }
}
