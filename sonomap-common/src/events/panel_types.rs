//! Panel vocabulary types
//!
//! Value types shared by the panel core, its HTTP surface and the event stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived batch analysis computed for a selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    /// Emotion predictions (wav2vec2-family models)
    Predictions,
    /// Transcript term statistics (whisper-family models)
    CommonTerms,
    /// Audio feature statistics (any model)
    AudioFeatures,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Predictions => "predictions",
            AnalysisKind::CommonTerms => "common-terms",
            AnalysisKind::AudioFeatures => "audio-features",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gesture mode that produced a selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Angle-sweep selection in the 3D view
    AngleRange,
    /// Box/lasso selection in the 2D view
    Planar,
}

impl SelectionMode {
    /// The authoritative selection mode for a dimensionality
    pub fn for_dimensionality(dims: Dimensionality) -> Self {
        match dims {
            Dimensionality::Three => SelectionMode::AngleRange,
            Dimensionality::Two => SelectionMode::Planar,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::AngleRange => write!(f, "angle-range"),
            SelectionMode::Planar => write!(f, "planar"),
        }
    }
}

/// Dimensionality-reduction algorithm used for projection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMethod {
    #[default]
    Pca,
    Umap,
    Tsne,
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionMethod::Pca => write!(f, "pca"),
            ReductionMethod::Umap => write!(f, "umap"),
            ReductionMethod::Tsne => write!(f, "tsne"),
        }
    }
}

/// Number of projected dimensions (serialized as `2` or `3`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimensionality {
    Two,
    #[default]
    Three,
}

impl Dimensionality {
    pub fn count(&self) -> u8 {
        match self {
            Dimensionality::Two => 2,
            Dimensionality::Three => 3,
        }
    }
}

impl TryFrom<u8> for Dimensionality {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Dimensionality::Two),
            3 => Ok(Dimensionality::Three),
            other => Err(format!("dimensions must be 2 or 3, got {}", other)),
        }
    }
}

impl From<Dimensionality> for u8 {
    fn from(dims: Dimensionality) -> u8 {
        dims.count()
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.count())
    }
}

/// Why the analysis result was cleared
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The authoritative selection became empty
    EmptySelection,
    /// The user switched analysis kind
    KindChanged,
    /// A model change made the active kind illegal
    ModelChanged,
    /// The file universe changed
    FilesChanged,
}
