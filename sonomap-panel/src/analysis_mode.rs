//! Analysis mode resolution
//!
//! Which analyses make sense depends on the embedding model: emotion
//! predictions need a wav2vec2-family model, transcript terms need a
//! whisper-family model, audio features work with anything. The first legal
//! kind is the default.

use crate::error::PanelError;
use sonomap_common::events::AnalysisKind;

const WAV2VEC2_KINDS: &[AnalysisKind] = &[AnalysisKind::Predictions, AnalysisKind::AudioFeatures];
const WHISPER_KINDS: &[AnalysisKind] = &[AnalysisKind::CommonTerms, AnalysisKind::AudioFeatures];
const GENERIC_KINDS: &[AnalysisKind] = &[AnalysisKind::AudioFeatures];

/// Ordered legal analysis kinds for a model (never empty)
pub fn legal_kinds(model: &str) -> &'static [AnalysisKind] {
    let model = model.to_ascii_lowercase();
    if model.contains("wav2vec2") {
        WAV2VEC2_KINDS
    } else if model.contains("whisper") {
        WHISPER_KINDS
    } else {
        GENERIC_KINDS
    }
}

/// Default analysis kind for a model
pub fn default_kind(model: &str) -> AnalysisKind {
    legal_kinds(model)
        .first()
        .copied()
        .unwrap_or(AnalysisKind::AudioFeatures)
}

pub fn is_legal(model: &str, kind: AnalysisKind) -> bool {
    legal_kinds(model).contains(&kind)
}

/// Result of reconciling the active kind with a new model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChangeOutcome {
    /// Active kind is still legal
    Kept,
    /// First model chosen; its default kind replaced the placeholder
    Adopted {
        previous: AnalysisKind,
        current: AnalysisKind,
    },
    /// Active kind became illegal and was replaced by the default;
    /// all analysis results must be cleared
    Forced {
        previous: AnalysisKind,
        current: AnalysisKind,
    },
}

/// Tracks the active analysis kind and keeps it legal for the current model
#[derive(Debug, Clone)]
pub struct AnalysisModeResolver {
    active: AnalysisKind,
    /// False until a model has been seen; the active kind is a placeholder
    bound: bool,
}

impl AnalysisModeResolver {
    /// Start with the default kind for `model`
    ///
    /// Without a model the generic default is a placeholder, replaced by the
    /// first model's default in [`on_model_changed`](Self::on_model_changed).
    pub fn new(model: Option<&str>) -> Self {
        Self {
            active: default_kind(model.unwrap_or_default()),
            bound: model.is_some(),
        }
    }

    pub fn active(&self) -> AnalysisKind {
        self.active
    }

    /// Reconcile the active kind after a model change
    pub fn on_model_changed(&mut self, model: &str) -> ModelChangeOutcome {
        if !self.bound {
            self.bound = true;
            let previous = self.active;
            self.active = default_kind(model);
            if self.active == previous {
                return ModelChangeOutcome::Kept;
            }
            return ModelChangeOutcome::Adopted {
                previous,
                current: self.active,
            };
        }

        if is_legal(model, self.active) {
            return ModelChangeOutcome::Kept;
        }

        let previous = self.active;
        self.active = default_kind(model);
        ModelChangeOutcome::Forced {
            previous,
            current: self.active,
        }
    }

    /// Switch to `kind` on user request
    ///
    /// Returns `Ok(true)` if the active kind changed, `Ok(false)` if it was
    /// already active. Kinds illegal for `model` are rejected unchanged.
    pub fn select(&mut self, model: &str, kind: AnalysisKind) -> Result<bool, PanelError> {
        if !is_legal(model, kind) {
            return Err(PanelError::IllegalKind {
                kind,
                model: model.to_string(),
            });
        }
        if self.active == kind {
            return Ok(false);
        }
        self.active = kind;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_kinds_by_family() {
        assert_eq!(
            legal_kinds("wav2vec2"),
            &[AnalysisKind::Predictions, AnalysisKind::AudioFeatures]
        );
        assert_eq!(
            legal_kinds("whisper-base"),
            &[AnalysisKind::CommonTerms, AnalysisKind::AudioFeatures]
        );
        assert_eq!(legal_kinds("openai/Whisper-large-v3")[0], AnalysisKind::CommonTerms);
        assert_eq!(legal_kinds("clap"), &[AnalysisKind::AudioFeatures]);
        assert_eq!(legal_kinds(""), &[AnalysisKind::AudioFeatures]);
    }

    #[test]
    fn test_legal_kinds_never_empty_and_default_is_first() {
        for model in ["wav2vec2", "facebook/wav2vec2-base", "whisper-tiny", "panns", ""] {
            let kinds = legal_kinds(model);
            assert!(!kinds.is_empty());
            assert_eq!(default_kind(model), kinds[0]);
        }
    }

    #[test]
    fn test_switch_to_whisper_forces_common_terms() {
        let mut resolver = AnalysisModeResolver::new(Some("wav2vec2"));
        assert_eq!(resolver.active(), AnalysisKind::Predictions);

        let outcome = resolver.on_model_changed("whisper-base");
        assert_eq!(
            outcome,
            ModelChangeOutcome::Forced {
                previous: AnalysisKind::Predictions,
                current: AnalysisKind::CommonTerms,
            }
        );
        assert_eq!(resolver.active(), AnalysisKind::CommonTerms);
    }

    #[test]
    fn test_first_model_adopts_its_default() {
        let mut resolver = AnalysisModeResolver::new(None);
        assert_eq!(resolver.active(), AnalysisKind::AudioFeatures);

        assert_eq!(
            resolver.on_model_changed("wav2vec2"),
            ModelChangeOutcome::Adopted {
                previous: AnalysisKind::AudioFeatures,
                current: AnalysisKind::Predictions,
            }
        );
        assert_eq!(
            resolver.on_model_changed("whisper-base"),
            ModelChangeOutcome::Forced {
                previous: AnalysisKind::Predictions,
                current: AnalysisKind::CommonTerms,
            }
        );
    }

    #[test]
    fn test_first_generic_model_keeps_placeholder() {
        let mut resolver = AnalysisModeResolver::new(None);
        assert_eq!(resolver.on_model_changed("clap"), ModelChangeOutcome::Kept);
        // Bound now: audio-features stays legal for wav2vec2
        assert_eq!(resolver.on_model_changed("wav2vec2"), ModelChangeOutcome::Kept);
        assert_eq!(resolver.active(), AnalysisKind::AudioFeatures);
    }

    #[test]
    fn test_audio_features_survives_model_change() {
        let mut resolver = AnalysisModeResolver::new(Some("wav2vec2"));
        resolver.select("wav2vec2", AnalysisKind::AudioFeatures).unwrap();

        assert_eq!(resolver.on_model_changed("whisper-base"), ModelChangeOutcome::Kept);
        assert_eq!(resolver.on_model_changed("clap"), ModelChangeOutcome::Kept);
        assert_eq!(resolver.active(), AnalysisKind::AudioFeatures);
    }

    #[test]
    fn test_active_kind_always_legal_after_model_change() {
        let mut resolver = AnalysisModeResolver::new(None);
        for model in ["wav2vec2", "whisper-small", "clap", "wav2vec2-large", "whisper"] {
            resolver.on_model_changed(model);
            assert!(is_legal(model, resolver.active()), "{} / {}", model, resolver.active());
        }
    }

    #[test]
    fn test_select_rejects_illegal_kind() {
        let mut resolver = AnalysisModeResolver::new(Some("clap"));
        let err = resolver.select("clap", AnalysisKind::Predictions).unwrap_err();
        assert!(matches!(err, PanelError::IllegalKind { .. }));
        assert_eq!(resolver.active(), AnalysisKind::AudioFeatures);
    }

    #[test]
    fn test_select_same_kind_is_noop() {
        let mut resolver = AnalysisModeResolver::new(Some("whisper-base"));
        assert!(!resolver.select("whisper-base", AnalysisKind::CommonTerms).unwrap());
        assert!(resolver.select("whisper-base", AnalysisKind::AudioFeatures).unwrap());
    }
}
