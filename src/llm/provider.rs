use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{EngineError, EngineResult};
use crate::llm::TextCompletion;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Settings for the bundled OpenAI-compatible completion client.
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

impl LlmSettings {
    pub fn from_env() -> Self {
        let base_url = env::var("FINTENT_LLM_BASE_URL")
            .or_else(|_| env::var("OPENAI_BASE_URL"))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = env::var("FINTENT_LLM_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok();
        let model = env::var("FINTENT_LLM_MODEL")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let temperature = env::var("FINTENT_LLM_TEMPERATURE")
            .ok()
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);

        Self {
            base_url,
            api_key,
            model,
            temperature,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// [`TextCompletion`] backed by an OpenAI-compatible chat-completions
/// endpoint.
pub struct OpenAiCompletion {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiCompletion {
    pub fn new(settings: &LlmSettings) -> EngineResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| EngineError::InvalidInput("missing LLM API key".to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> EngineResult<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| EngineError::Internal(format!("llm request failed: {error}")))?
            .error_for_status()
            .map_err(|error| EngineError::Internal(format!("llm request rejected: {error}")))?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| EngineError::Internal(format!("llm response malformed: {error}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EngineError::Internal("llm response had no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_rejected_at_construction() {
        let settings = LlmSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
        };
        let err = OpenAiCompletion::new(&settings).err().expect("should fail");
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let settings = LlmSettings {
            base_url: "https://example.test/v1/".to_string(),
            api_key: Some("key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
        };
        let client = OpenAiCompletion::new(&settings).expect("client");
        assert_eq!(client.base_url, "https://example.test/v1");
    }
}
