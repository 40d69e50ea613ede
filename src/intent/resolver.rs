use super::types::{ClassificationSignal, Intent, ResolvedIntent};

/// Below this, model output is discarded outright.
pub const LOW_CONFIDENCE: f64 = 0.4;
/// At or above this, model output overrides lexical heuristics.
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Combine the model's verdict with the pattern matcher's bare label into
/// one final intent.
///
/// The model is more context-aware but unreliable at the boundaries;
/// patterns are deterministic and auditable. Real ambiguity only exists in
/// the medium-confidence band, and there the cheaper, more predictable
/// signal wins.
pub fn resolve(model: &ClassificationSignal, pattern: Intent) -> ResolvedIntent {
    let intent = if model.confidence < LOW_CONFIDENCE {
        pattern
    } else if model.confidence >= HIGH_CONFIDENCE {
        model.intent
    } else if model.intent == pattern {
        model.intent
    } else {
        // Medium-confidence disagreement: lexical evidence is the
        // tie-breaker.
        pattern
    };

    ResolvedIntent::new(intent, model.confidence)
}
