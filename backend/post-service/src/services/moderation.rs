/// Moderation decision engine
///
/// Maps a classifier label onto a persistence/visibility outcome. Kept pure
/// so the full label space can be covered in tests.

/// The one label the prediction service emits for content that violates
/// policy. Matching is exact; the classifier owns the label vocabulary.
pub const HATE_SPEECH_LABEL: &str = "Hate Speech";

/// Message returned to the caller when a submission is rejected.
pub const REJECTION_MESSAGE: &str = "Error: Hate Speech Detected";

/// Outcome of moderating one classifier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the record is excluded from public listings.
    pub flagged: bool,
}

/// Decide the moderation outcome for a classifier label.
///
/// Flagged records are still persisted for audit and statistics; the flag
/// only controls public visibility and the caller-facing response.
pub fn decide(label: &str) -> Decision {
    Decision {
        flagged: label == HATE_SPEECH_LABEL,
    }
}

/// Model confidence scaled to the 0-100 range callers see in rejections.
pub fn scale_probability(probability: f64) -> f64 {
    probability * 100.0
}
