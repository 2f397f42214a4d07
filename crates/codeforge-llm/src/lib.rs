//! LLM backend abstraction for the codeforge pipeline
//!
//! This crate provides a trait-based system for invoking language models over
//! HTTP. Providers implement the [`LlmBackend`] trait, allowing the pipeline
//! executor to work with any provider without knowing implementation details.
//!
//! The one real provider is `openai-compatible`, which speaks the OpenAI
//! chat-completions wire format and therefore covers OpenAI itself as well as
//! the many services that mirror its API (SiliconFlow, OpenRouter, vLLM, ...).
//!
//! Deterministic stub backends for tests live behind the `test-utils` feature.

mod error;
mod openai;
mod types;

#[cfg(feature = "test-utils")]
mod stub;

pub use error::LlmError;
pub use openai::OpenAiCompatibleBackend;
pub use types::{BackendConfig, CompletionRequest, CompletionResponse, LlmBackend, SamplingConfig};

#[cfg(feature = "test-utils")]
pub use stub::{FailingBackend, FailureKind, StubBackend};

/// Create an LLM backend from configuration.
///
/// The factory constructs the backend named by `config.provider`. Provider
/// construction validates configuration only; transport failures surface
/// later, from [`LlmBackend::complete`].
///
/// # Errors
///
/// Returns [`LlmError::Unsupported`] if the provider name is unknown and
/// [`LlmError::Misconfiguration`] if provider-specific configuration is
/// invalid.
pub fn from_config(config: &BackendConfig) -> Result<Box<dyn LlmBackend>, LlmError> {
    match config.provider.as_str() {
        "openai-compatible" | "openai" => {
            let backend = OpenAiCompatibleBackend::new(
                config.base_url.clone(),
                config.api_key.clone(),
                config.timeout,
            )?;
            Ok(Box::new(backend))
        }
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown LLM provider '{unknown}'. Supported providers: openai-compatible."
        ))),
    }
}
