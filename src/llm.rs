//! Text-completion collaborator boundary.

pub mod provider;

pub use provider::{LlmSettings, OpenAiCompletion};

use async_trait::async_trait;

use crate::error::EngineResult;

/// A synchronous-per-call, fallible text-completion collaborator. One call
/// is one external round trip; there is no internal retry, and a failed
/// call is a terminal attempt that the classifier degrades around.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> EngineResult<String>;
}
