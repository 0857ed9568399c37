use serde::Deserialize;

/// Tolerances for fuzzy name comparison. These are policy constants to
/// calibrate against real OCR traffic, not domain truths, so they are
/// configuration rather than hardcoded numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Minimum matched-word ratio for two names to count as the same person.
    pub min_match_ratio: f32,
    /// Maximum Levenshtein distance for two words to count as the same word.
    pub max_word_edit_distance: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy {
            min_match_ratio: 0.70,
            max_word_edit_distance: 1,
        }
    }
}

/// Tunable knobs for a verification session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub match_policy: MatchPolicy,
    /// Euclidean distance below which two face descriptors are the same
    /// person.
    pub face_distance_threshold: f32,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        VerifyConfig {
            match_policy: MatchPolicy::default(),
            face_distance_threshold: 0.6,
        }
    }
}
