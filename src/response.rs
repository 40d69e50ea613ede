use serde::Serialize;

use crate::intent::Intent;

/// Handler-visible metadata carried in a success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub handler_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_generated: Option<String>,
    pub original_query: String,
}

/// The uniform result returned to the caller: either the success shape or
/// the failure shape, never a mix. Both shapes are only constructible
/// through [`ResponseEnvelope::success`] and [`ResponseEnvelope::failure`],
/// so a partially populated envelope cannot exist.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success {
        success: bool,
        response: String,
        intent: Intent,
        confidence: f64,
        metadata: ResponseMetadata,
    },
    Failure {
        success: bool,
        response: String,
        error: String,
    },
}

impl ResponseEnvelope {
    pub fn success(
        response: impl Into<String>,
        intent: Intent,
        confidence: f64,
        metadata: ResponseMetadata,
    ) -> Self {
        ResponseEnvelope::Success {
            success: true,
            response: response.into(),
            intent,
            confidence: confidence.clamp(0.0, 1.0),
            metadata,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ResponseEnvelope::Failure {
            success: false,
            response: "I encountered an error processing your request. Please try again."
                .to_string(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }

    /// The user-facing response text, present in both shapes.
    pub fn response_text(&self) -> &str {
        match self {
            ResponseEnvelope::Success { response, .. } => response,
            ResponseEnvelope::Failure { response, .. } => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_shape_serializes_with_metadata() {
        let envelope = ResponseEnvelope::success(
            "Recorded your expense.",
            Intent::Create,
            0.9,
            ResponseMetadata {
                handler_used: "data_handler".to_string(),
                sql_generated: Some("INSERT ...".to_string()),
                original_query: "I spent $60 on shoes".to_string(),
            },
        );
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["intent"], "CREATE");
        assert_eq!(json["metadata"]["handler_used"], "data_handler");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_shape_has_no_intent_fields() {
        let envelope = ResponseEnvelope::failure("lock poisoned");
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "lock poisoned");
        assert!(json.get("intent").is_none());
        assert!(json.get("metadata").is_none());
        assert!(!envelope.is_success());
    }

    #[test]
    fn confidence_is_clamped_at_construction() {
        let envelope = ResponseEnvelope::success(
            "ok",
            Intent::View,
            3.2,
            ResponseMetadata {
                handler_used: "query_runner".to_string(),
                sql_generated: None,
                original_query: "show my balance".to_string(),
            },
        );
        let ResponseEnvelope::Success { confidence, .. } = envelope else {
            panic!("expected success");
        };
        assert_eq!(confidence, 1.0);
    }
}
