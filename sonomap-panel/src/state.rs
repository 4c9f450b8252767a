//! Panel state container
//!
//! All mutable panel state lives in one [`PanelState`] behind one lock. The
//! analysis result is a single enum value, so at most one of the three
//! result shapes can ever be populated and replacing it is one assignment.

use crate::analysis_mode::{legal_kinds, AnalysisModeResolver};
use crate::backend::{CacheStats, FrequencyAnalysis, PredictionAnalysis, TermAnalysis};
use crate::debounce::Debouncer;
use crate::embedding::{EmbeddingTrigger, Projection};
use crate::fetch::{FetchSlot, FetchState};
use crate::selection::{FileSet, SelectionStore};
use serde::Serialize;
use sonomap_common::events::{AnalysisKind, Dimensionality, ReductionMethod, SelectionMode};
use std::time::Duration;

/// Configuration tuple driving projections and analyses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelConfig {
    pub model: Option<String>,
    pub dataset: Option<String>,
    /// File universe projected into the view
    pub files: Vec<String>,
    pub method: ReductionMethod,
    pub dimensions: Dimensionality,
}

/// Derived analysis for the current selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum AnalysisResult {
    #[default]
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "audio-features")]
    Frequency(FrequencyAnalysis),
    #[serde(rename = "predictions")]
    Prediction(PredictionAnalysis),
    #[serde(rename = "common-terms")]
    Term(TermAnalysis),
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, AnalysisResult::Empty)
    }

    /// Analysis kind of the populated shape
    pub fn kind(&self) -> Option<AnalysisKind> {
        match self {
            AnalysisResult::Empty => None,
            AnalysisResult::Frequency(_) => Some(AnalysisKind::AudioFeatures),
            AnalysisResult::Prediction(_) => Some(AnalysisKind::Predictions),
            AnalysisResult::Term(_) => Some(AnalysisKind::CommonTerms),
        }
    }

    pub fn frequency(&self) -> Option<&FrequencyAnalysis> {
        match self {
            AnalysisResult::Frequency(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn prediction(&self) -> Option<&PredictionAnalysis> {
        match self {
            AnalysisResult::Prediction(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn term(&self) -> Option<&TermAnalysis> {
        match self {
            AnalysisResult::Term(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn cache(&self) -> Option<&CacheStats> {
        match self {
            AnalysisResult::Empty => None,
            AnalysisResult::Frequency(a) => Some(&a.cache),
            AnalysisResult::Prediction(a) => Some(&a.cache),
            AnalysisResult::Term(a) => Some(&a.cache),
        }
    }
}

/// Last point the user clicked in the visualization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointClick {
    pub file: String,
    pub coordinates: Vec<f64>,
}

/// Mutable panel state; only touched through `Panel`
#[derive(Debug)]
pub struct PanelState {
    pub config: PanelConfig,
    pub selections: SelectionStore,
    pub modes: AnalysisModeResolver,
    pub debouncer: Debouncer,
    pub analysis: FetchSlot<AnalysisResult>,
    pub embedding_trigger: EmbeddingTrigger,
    pub embedding: FetchSlot<Option<Projection>>,
    pub focused_point: Option<PointClick>,
}

impl PanelState {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            config: PanelConfig::default(),
            selections: SelectionStore::new(),
            modes: AnalysisModeResolver::new(None),
            debouncer: Debouncer::new(quiet_period),
            analysis: FetchSlot::new(),
            embedding_trigger: EmbeddingTrigger::new(),
            embedding: FetchSlot::new(),
            focused_point: None,
        }
    }

    /// Model identifier, or "" when none is chosen
    pub fn model(&self) -> &str {
        self.config.model.as_deref().unwrap_or_default()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        SelectionMode::for_dimensionality(self.config.dimensions)
    }

    pub fn active_selection(&self) -> &FileSet {
        self.selections.active(self.config.dimensions)
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            config: self.config.clone(),
            active_kind: self.modes.active(),
            legal_kinds: legal_kinds(self.model()).to_vec(),
            selection_mode: self.selection_mode(),
            angle_selection: self
                .selections
                .get(SelectionMode::AngleRange)
                .iter()
                .cloned()
                .collect(),
            planar_selection: self
                .selections
                .get(SelectionMode::Planar)
                .iter()
                .cloned()
                .collect(),
            analysis_state: self.analysis.state().clone(),
            analysis: self.analysis.value().clone(),
            analysis_pending: self.debouncer.is_pending(),
            embedding_state: self.embedding.state().clone(),
            projection: self.embedding.value().clone(),
            focused_point: self.focused_point.clone(),
        }
    }
}

/// Fully committed, read-only view of the panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub config: PanelConfig,
    pub active_kind: AnalysisKind,
    pub legal_kinds: Vec<AnalysisKind>,
    pub selection_mode: SelectionMode,
    pub angle_selection: Vec<String>,
    pub planar_selection: Vec<String>,
    pub analysis_state: FetchState,
    pub analysis: AnalysisResult,
    /// A settled selection is waiting out the quiet period
    pub analysis_pending: bool,
    pub embedding_state: FetchState,
    pub projection: Option<Projection>,
    pub focused_point: Option<PointClick>,
}

impl PanelSnapshot {
    /// Selection for the active mode
    pub fn active_selection(&self) -> &[String] {
        match self.selection_mode {
            SelectionMode::AngleRange => &self.angle_selection,
            SelectionMode::Planar => &self.planar_selection,
        }
    }
}
