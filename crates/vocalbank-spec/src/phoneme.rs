//! Phoneme normalization.
//!
//! Label files spell silence and breath many ways. Everything downstream only
//! ever sees the two canonical tags, [`SILENCE`] and [`BREATH`]; every other
//! token passes through unchanged. Matching is exact and case-sensitive.

use serde::{Deserialize, Serialize};

/// Canonical silence tag.
pub const SILENCE: &str = "SP";

/// Canonical breath tag.
pub const BREATH: &str = "AP";

/// Accepted spellings of silence. The empty string counts as silence.
pub const SILENCE_VARIANTS: &[&str] = &[
    "sil", "pau", "silence", "#", "", "sp", "SIL", "PAU", "SILENCE",
];

/// Accepted spellings of breath.
pub const BREATH_VARIANTS: &[&str] = &["br", "bre", "breath", "AP", "ap", "BR", "BRE"];

/// Acoustic class of a phoneme token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonemeClass {
    /// Silence or pause.
    Silence,
    /// Audible breath.
    Breath,
    /// Any other (voiced or unvoiced) phoneme.
    Phonetic,
}

impl PhonemeClass {
    /// Classifies a raw or normalized token.
    pub fn of(token: &str) -> Self {
        match normalize(token) {
            SILENCE => PhonemeClass::Silence,
            BREATH => PhonemeClass::Breath,
            _ => PhonemeClass::Phonetic,
        }
    }

    /// True for silence and breath.
    pub fn is_non_phonetic(&self) -> bool {
        !matches!(self, PhonemeClass::Phonetic)
    }
}

/// Maps a token to its canonical form.
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(token: &str) -> &str {
    if SILENCE_VARIANTS.contains(&token) {
        SILENCE
    } else if BREATH_VARIANTS.contains(&token) {
        BREATH
    } else {
        token
    }
}

/// True if the token normalizes to silence or breath.
pub fn is_silence_or_breath(token: &str) -> bool {
    PhonemeClass::of(token).is_non_phonetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_variants_map_to_sp() {
        for v in SILENCE_VARIANTS {
            assert_eq!(normalize(v), SILENCE, "variant {:?}", v);
        }
    }

    #[test]
    fn test_breath_variants_map_to_ap() {
        for v in BREATH_VARIANTS {
            assert_eq!(normalize(v), BREATH, "variant {:?}", v);
        }
    }

    #[test]
    fn test_other_tokens_pass_through() {
        assert_eq!(normalize("a"), "a");
        assert_eq!(normalize("Sil"), "Sil");
        assert_eq!(normalize(" sil"), " sil");
    }

    #[test]
    fn test_empty_is_silence() {
        assert_eq!(normalize(""), SILENCE);
        assert_eq!(PhonemeClass::of(""), PhonemeClass::Silence);
    }

    #[test]
    fn test_canonical_tags_are_fixed_points() {
        assert_eq!(normalize(SILENCE), SILENCE);
        assert_eq!(normalize(BREATH), BREATH);
    }

    #[test]
    fn test_uppercase_silence_word() {
        assert_eq!(normalize("SILENCE"), SILENCE);
        assert_eq!(PhonemeClass::of("SILENCE"), PhonemeClass::Silence);
        assert_eq!(normalize("Silence"), "Silence");
    }

    #[test]
    fn test_classify() {
        assert_eq!(PhonemeClass::of("pau"), PhonemeClass::Silence);
        assert_eq!(PhonemeClass::of("breath"), PhonemeClass::Breath);
        assert_eq!(PhonemeClass::of("a"), PhonemeClass::Phonetic);
        assert!(is_silence_or_breath("BR"));
        assert!(!is_silence_or_breath("k"));
    }
}
