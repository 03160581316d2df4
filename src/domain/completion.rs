/// Watched fraction at which a video counts as completed.
///
/// Player variants used to disagree (0.8 vs 0.9); 0.8 is the single value used
/// everywhere now.
pub const COMPLETION_THRESHOLD: f64 = 0.8;

/// Pure completion rule, parameterised by threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionClassifier {
    threshold: f64,
}

impl CompletionClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Undefined ratios (unknown or zero duration) are never complete.
    pub fn is_complete(&self, effective_watched: f64, total_duration: f64) -> bool {
        if !total_duration.is_finite() || total_duration <= 0.0 || !effective_watched.is_finite() {
            return false;
        }
        effective_watched / total_duration >= self.threshold
    }
}

impl Default for CompletionClassifier {
    fn default() -> Self {
        Self::new(COMPLETION_THRESHOLD)
    }
}

/// Completion check with the canonical threshold.
pub fn is_complete(effective_watched: f64, total_duration: f64) -> bool {
    CompletionClassifier::default().is_complete(effective_watched, total_duration)
}
