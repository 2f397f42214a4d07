//! Core types for the LLM backend abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LlmError;

/// Sampling configuration applied to every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl SamplingConfig {
    /// Create a new sampling configuration.
    #[must_use]
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

/// Input to a backend invocation.
///
/// `stage` names the pipeline stage issuing the request; it never reaches the
/// wire and exists for logging and test stubs, the same way a trace id would.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Canonical name of the stage issuing this request.
    pub stage: String,
    /// Fully rendered prompt; contains no unresolved template slots.
    pub prompt: String,
    /// Sampling parameters for this request.
    pub sampling: SamplingConfig,
}

/// Result of a backend invocation.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Completion text returned by the provider.
    pub text: String,
    /// Model that actually served the request.
    pub model_used: String,
    /// Input tokens consumed, when the provider reports usage.
    pub tokens_input: Option<u64>,
    /// Output tokens generated, when the provider reports usage.
    pub tokens_output: Option<u64>,
}

impl CompletionResponse {
    /// Create a response carrying only text and the serving model.
    #[must_use]
    pub fn new(text: impl Into<String>, model_used: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_used: model_used.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }
}

/// Configuration handed to the backend factory.
///
/// All values are concrete: the API key has already been resolved from
/// whichever environment variable the configuration file named. Backends
/// never read process-global state themselves.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Provider name (`openai-compatible`).
    pub provider: String,
    /// Full URL of the chat-completions endpoint.
    pub base_url: String,
    /// Bearer token presented to the provider.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Trait implemented by every LLM backend.
///
/// The pipeline executor holds a `Box<dyn LlmBackend>` and issues one
/// `complete` call per stage. Calls are sequential by construction; backends
/// do not need interior queuing.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Submit a rendered prompt and return the completion.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Unavailable`], [`LlmError::Auth`], or
    /// [`LlmError::RateLimited`]; all three are fatal to the calling stage.
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
