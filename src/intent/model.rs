use std::sync::Arc;

use serde_json::Value;

use super::types::{ClassificationSignal, Intent, SignalSource};
use crate::llm::TextCompletion;

/// Confidence assigned when the model output is unusable and the signal
/// degrades to a View fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;
/// Confidence assumed when the model omits one or reports garbage.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Classifies intent by asking a text-completion collaborator for a strict
/// JSON verdict, then defensively parsing whatever comes back.
///
/// Every failure mode (transport error, wrapper prose, malformed JSON,
/// out-of-vocabulary label) degrades to a low-confidence View signal. A
/// low-confidence View is the safest default: it never mutates data, and it
/// guarantees the conflict resolver always has two valid signals.
pub struct ModelClassifier {
    completion: Arc<dyn TextCompletion>,
}

impl ModelClassifier {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    pub async fn classify(&self, text: &str) -> ClassificationSignal {
        let prompt = build_prompt(text);
        let raw = match self.completion.complete(&prompt).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!("model classification call failed: {error}");
                return degraded(format!("llm error: {error}"));
            }
        };

        match parse_verdict(&raw) {
            Some(signal) => signal,
            None => {
                tracing::warn!("model classification returned unparsable output");
                degraded("json parse error".to_string())
            }
        }
    }
}

fn degraded(reason: String) -> ClassificationSignal {
    ClassificationSignal::new(Intent::View, FALLBACK_CONFIDENCE, SignalSource::Model, reason)
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Analyze this user query and classify its intent for a financial database system.

USER QUERY: "{text}"

INTENT CATEGORIES:
1. VIEW - User wants to see, check, or retrieve existing information
   Examples: "how much did I spend", "show my expenses", "what is my balance"

2. CREATE - User wants to add new records (expenses, income, goals, budgets)
   Examples: "I spent $60 on shoes", "add $75 dinner expense", "record $200 income"

3. UPDATE - User wants to change existing records
   Examples: "change my rent budget to $900", "correct yesterday's expense to $40"

4. DELETE - User wants to remove existing records
   Examples: "delete my last transaction", "remove the expense from yesterday"

IMPORTANT: Queries about spending money or receiving income are ALWAYS CREATE intent.
Examples: "I spent $60", "paid $30 for lunch", "got $500" are CREATE.

Respond in JSON format with:
{{
    "intent": "VIEW|CREATE|UPDATE|DELETE",
    "confidence": 0.0 to 1.0,
    "reason": "Brief explanation"
}}

Return ONLY valid JSON, nothing else.

Response:
"#
    )
}

/// Best-effort extraction of a JSON object from free-form model output:
/// strip code fences, take the span from the first `{` to the last `}`,
/// and only then fall back to parsing the whole trimmed response.
fn extract_json(raw: &str) -> Option<Value> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if end > start {
            if let Ok(value) = serde_json::from_str(&cleaned[start..=end]) {
                return Some(value);
            }
        }
    }

    serde_json::from_str(cleaned).ok()
}

fn parse_verdict(raw: &str) -> Option<ClassificationSignal> {
    let value = extract_json(raw)?;

    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let intent = match value.get("intent").and_then(Value::as_str).and_then(Intent::parse) {
        Some(intent) => intent,
        // An out-of-vocabulary label is never trusted upward into the
        // pipeline.
        None => {
            return Some(degraded("invalid intent label from model".to_string()));
        }
    };

    let confidence = parse_confidence(value.get("confidence"));

    Some(ClassificationSignal::new(
        intent,
        confidence,
        SignalSource::Model,
        reason,
    ))
}

fn parse_confidence(value: Option<&Value>) -> f64 {
    let confidence = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(DEFAULT_CONFIDENCE),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(DEFAULT_CONFIDENCE),
        _ => DEFAULT_CONFIDENCE,
    };
    confidence.clamp(0.0, 1.0)
}
