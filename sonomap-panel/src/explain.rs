//! Human-readable explanations for audio features

/// Returned for feature names the table does not know
pub const FALLBACK_EXPLANATION: &str =
    "Audio feature computed by the analysis backend. Compare its distribution across the selection to spot outliers.";

/// Explain `feature`
///
/// Lookup ignores case and treats `-`/` ` like `_`. Indexed MFCC and chroma
/// features (`mfcc_3`, `chroma_11`) share the explanation of their family.
pub fn explain(feature: &str) -> &'static str {
    let key = feature.trim().to_ascii_lowercase().replace(['-', ' '], "_");

    if let Some(text) = lookup(&key) {
        return text;
    }

    // Strip a trailing index: mfcc_3 -> mfcc, chroma_11_mean -> chroma
    let family: String = key
        .split('_')
        .take_while(|part| !part.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join("_");
    if family != key {
        if let Some(text) = lookup(&family) {
            return text;
        }
    }

    FALLBACK_EXPLANATION
}

fn lookup(key: &str) -> Option<&'static str> {
    let text = match key {
        "spectral_centroid" => {
            "Center of mass of the spectrum. Higher values mean a brighter sound with more high-frequency energy."
        }
        "spectral_rolloff" => {
            "Frequency below which 85% of the spectral energy lies. Separates dull from bright or noisy sounds."
        }
        "spectral_bandwidth" => {
            "Spread of the spectrum around its centroid. Wide bandwidth indicates rich or noisy timbre."
        }
        "spectral_flatness" => {
            "How noise-like the spectrum is, from 0 (pure tone) to 1 (white noise)."
        }
        "spectral_contrast" => {
            "Difference between peaks and valleys in each frequency band. High contrast suggests clear harmonic structure."
        }
        "zero_crossing_rate" | "zcr" => {
            "Rate at which the waveform changes sign. High for noisy or percussive sounds and unvoiced speech."
        }
        "rms_energy" | "rms" => {
            "Root-mean-square amplitude of the signal, a measure of loudness."
        }
        "tempo" => "Estimated beats per minute.",
        "mfcc" => {
            "Mel-frequency cepstral coefficient. Compactly describes the spectral envelope and is the classic timbre descriptor for speech and music."
        }
        "chroma" => {
            "Energy in one of the twelve pitch classes. Captures harmony and key independent of octave."
        }
        "pitch" | "fundamental_frequency" | "f0" => {
            "Fundamental frequency of the voiced signal in Hz."
        }
        "duration" => "Length of the recording in seconds.",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_features() {
        assert!(explain("spectral_centroid").contains("brighter"));
        assert!(explain("tempo").contains("beats per minute"));
        assert!(explain("zcr").contains("changes sign"));
    }

    #[test]
    fn test_lookup_normalizes_name() {
        assert_eq!(explain("Spectral-Centroid"), explain("spectral_centroid"));
        assert_eq!(explain("zero crossing rate"), explain("zero_crossing_rate"));
    }

    #[test]
    fn test_indexed_features_use_family() {
        assert_eq!(explain("mfcc_3"), explain("mfcc"));
        assert_eq!(explain("chroma_11_mean"), explain("chroma"));
    }

    #[test]
    fn test_unknown_feature_falls_back() {
        assert_eq!(explain("mystery_feature"), FALLBACK_EXPLANATION);
        assert_eq!(explain(""), FALLBACK_EXPLANATION);
    }
}
