use serde::{Deserialize, Serialize};
use std::fmt;

/// The structured operation a natural-language message maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    View,
    Create,
    Update,
    Delete,
}

impl Intent {
    /// Canonical uppercase label, as used in prompts and envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::View => "VIEW",
            Intent::Create => "CREATE",
            Intent::Update => "UPDATE",
            Intent::Delete => "DELETE",
        }
    }

    /// Parse a label reported by the model. Anything outside the four
    /// valid labels is rejected so the caller can apply its fallback.
    pub fn parse(label: &str) -> Option<Intent> {
        match label.trim().to_uppercase().as_str() {
            "VIEW" => Some(Intent::View),
            "CREATE" => Some(Intent::Create),
            "UPDATE" => Some(Intent::Update),
            "DELETE" => Some(Intent::Delete),
            _ => None,
        }
    }

    /// Whether this intent mutates records.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Intent::Create | Intent::Update | Intent::Delete)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which classifier produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Pattern,
    Model,
}

/// One classifier's verdict for a single request. Created per request,
/// never persisted, never mutated after creation.
#[derive(Debug, Clone)]
pub struct ClassificationSignal {
    pub intent: Intent,
    pub confidence: f64,
    pub source: SignalSource,
    pub rationale: String,
}

impl ClassificationSignal {
    pub fn new(
        intent: Intent,
        confidence: f64,
        source: SignalSource,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            confidence: confidence.clamp(0.0, 1.0),
            source,
            rationale: rationale.into(),
        }
    }
}

/// The single chosen intent after conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedIntent {
    pub intent: Intent,
    pub confidence: f64,
}

impl ResolvedIntent {
    pub fn new(intent: Intent, confidence: f64) -> Self {
        Self {
            intent,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_labels() {
        assert_eq!(Intent::parse("VIEW"), Some(Intent::View));
        assert_eq!(Intent::parse("create"), Some(Intent::Create));
        assert_eq!(Intent::parse(" Update "), Some(Intent::Update));
        assert_eq!(Intent::parse("DELETE"), Some(Intent::Delete));
    }

    #[test]
    fn parse_rejects_out_of_vocabulary_labels() {
        assert_eq!(Intent::parse("UNKNOWN"), None);
        assert_eq!(Intent::parse("INSERT"), None);
        assert_eq!(Intent::parse(""), None);
    }

    #[test]
    fn signal_confidence_is_clamped() {
        let signal = ClassificationSignal::new(Intent::View, 1.7, SignalSource::Model, "");
        assert_eq!(signal.confidence, 1.0);
        let signal = ClassificationSignal::new(Intent::View, -0.2, SignalSource::Model, "");
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn resolved_confidence_is_clamped() {
        let resolved = ResolvedIntent::new(Intent::Create, 2.0);
        assert_eq!(resolved.confidence, 1.0);
    }

    #[test]
    fn mutation_intents() {
        assert!(!Intent::View.is_mutation());
        assert!(Intent::Create.is_mutation());
        assert!(Intent::Update.is_mutation());
        assert!(Intent::Delete.is_mutation());
    }
}
