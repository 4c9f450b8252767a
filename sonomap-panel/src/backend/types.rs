//! Analysis backend request and response shapes
//!
//! Response types deserialize leniently: every field defaults when absent so
//! a backend that omits optional sections still yields a usable result. The
//! numbers themselves are passed through unvalidated.

use serde::{Deserialize, Serialize};
use sonomap_common::events::AnalysisKind;
use std::collections::BTreeMap;

/// JSON body shared by the three batch endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub filenames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

impl BatchRequest {
    /// Build the payload for `kind`
    ///
    /// The prediction endpoint always runs its own wav2vec2 model, so the
    /// model is left out of its payload.
    pub fn for_kind(
        kind: AnalysisKind,
        filenames: Vec<String>,
        model: &str,
        dataset: Option<&str>,
    ) -> Self {
        let model = match kind {
            AnalysisKind::Predictions => None,
            AnalysisKind::AudioFeatures | AnalysisKind::CommonTerms => Some(model.to_string()),
        };
        Self {
            filenames,
            model,
            dataset: dataset.map(str::to_string),
        }
    }
}

/// Cache-hit/miss counters reported by every batch endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    #[serde(default)]
    pub cache_hits: u64,
    #[serde(default)]
    pub cache_misses: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }
}

// ============================================================================
// Audio features
// ============================================================================

/// Audio feature statistics for a batch of files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    /// Per-file feature values
    #[serde(default)]
    pub files: Vec<FileFeatures>,
    /// Aggregate statistics keyed by feature name
    #[serde(default)]
    pub statistics: BTreeMap<String, FeatureStatistics>,
    /// Value histograms keyed by feature name
    #[serde(default)]
    pub histograms: BTreeMap<String, Histogram>,
    /// Features ranked by how much they vary across the selection
    #[serde(default)]
    pub ranked_features: Vec<RankedFeature>,
    /// Feature names grouped by category (spectral, temporal, ...)
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub summary: FrequencySummary,
    #[serde(flatten)]
    pub cache: CacheStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileFeatures {
    pub filename: String,
    #[serde(default)]
    pub features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistics {
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub std: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub median: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges
    #[serde(default)]
    pub bins: Vec<f64>,
    #[serde(default)]
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub name: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencySummary {
    #[serde(default)]
    pub total_files: usize,
    #[serde(default)]
    pub analyzed_files: usize,
    #[serde(default)]
    pub failed_files: usize,
}

// ============================================================================
// Emotion predictions
// ============================================================================

/// Emotion predictions for a batch of files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionAnalysis {
    /// Share of files per predicted emotion (0.0-1.0)
    #[serde(default)]
    pub emotion_distribution: BTreeMap<String, f64>,
    /// Number of files per predicted emotion
    #[serde(default)]
    pub emotion_counts: BTreeMap<String, u64>,
    /// Per-file predictions
    #[serde(default)]
    pub predictions: Vec<FilePrediction>,
    #[serde(default)]
    pub summary: PredictionSummary,
    #[serde(flatten)]
    pub cache: CacheStats,
}

impl PredictionAnalysis {
    /// Dominant emotion from the summary, falling back to the highest count
    pub fn dominant_emotion(&self) -> Option<&str> {
        self.summary.dominant_emotion.as_deref().or_else(|| {
            self.emotion_counts
                .iter()
                .max_by_key(|(_, count)| **count)
                .map(|(emotion, _)| emotion.as_str())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePrediction {
    pub filename: String,
    #[serde(default)]
    pub predicted_emotion: String,
    #[serde(default)]
    pub probabilities: BTreeMap<String, f64>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_percentage: f64,
    #[serde(default)]
    pub total_files: usize,
}

// ============================================================================
// Transcript terms
// ============================================================================

/// Transcript term statistics for a batch of files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermAnalysis {
    /// Most common terms, highest count first
    #[serde(default)]
    pub common_terms: Vec<TermCount>,
    /// Per-file transcripts
    #[serde(default)]
    pub transcripts: Vec<FileTranscript>,
    #[serde(default)]
    pub summary: TermSummary,
    #[serde(flatten)]
    pub cache: CacheStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileTranscript {
    pub filename: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub word_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermSummary {
    #[serde(default)]
    pub total_files: usize,
    #[serde(default)]
    pub total_words: usize,
    #[serde(default)]
    pub unique_terms: usize,
}
