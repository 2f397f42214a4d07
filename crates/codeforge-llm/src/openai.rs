//! OpenAI-compatible HTTP backend
//!
//! Speaks the chat-completions wire format shared by OpenAI, SiliconFlow,
//! OpenRouter, and most self-hosted gateways. One prompt becomes one
//! single-turn user message; streaming is never requested.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, LlmBackend};

/// HTTP backend for OpenAI-compatible chat-completions endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiCompatibleBackend {
    /// Create a new backend for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            timeout,
        })
    }

    /// Map a non-success HTTP status onto the backend error taxonomy.
    fn classify_status(status: reqwest::StatusCode, body: &str) -> LlmError {
        let detail = if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {}", body.trim())
        };

        match status.as_u16() {
            401 | 403 => LlmError::Auth(detail),
            429 => LlmError::RateLimited(detail),
            _ => LlmError::Unavailable(detail),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(
            stage = %req.stage,
            model = %req.sampling.model,
            temperature = req.sampling.temperature,
            timeout_secs = self.timeout.as_secs(),
            "invoking openai-compatible backend"
        );

        let body = ChatRequest {
            model: &req.sampling.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &req.prompt,
            }],
            temperature: req.sampling.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Unavailable(format!("failed to parse response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Unavailable("response missing choices[0]".to_string()))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LlmError::Unavailable("response missing message content".to_string()))?;

        let model_used = parsed.model.unwrap_or_else(|| req.sampling.model.clone());
        let mut result = CompletionResponse::new(text, model_used);
        if let Some(usage) = parsed.usage {
            result.tokens_input = Some(usage.prompt_tokens);
            result.tokens_output = Some(usage.completion_tokens);
        }

        debug!(
            stage = %req.stage,
            model = %result.model_used,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "completion received"
        );

        Ok(result)
    }
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

/// Single message in a chat-completions request.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_succeeds_with_plain_config() {
        let backend = OpenAiCompatibleBackend::new(
            "https://api.example.com/v1/chat/completions".to_string(),
            "test-key".to_string(),
            Duration::from_secs(30),
        );
        assert!(backend.is_ok());
    }

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        for code in [401u16, 403] {
            let status = reqwest::StatusCode::from_u16(code).unwrap();
            match OpenAiCompatibleBackend::classify_status(status, "denied") {
                LlmError::Auth(msg) => assert!(msg.contains("denied")),
                other => panic!("Expected Auth for {code}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rate_limit_status_maps_to_rate_limited() {
        let status = reqwest::StatusCode::TOO_MANY_REQUESTS;
        match OpenAiCompatibleBackend::classify_status(status, "slow down") {
            LlmError::RateLimited(msg) => assert!(msg.contains("slow down")),
            other => panic!("Expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn server_errors_map_to_unavailable() {
        for code in [500u16, 502, 503] {
            let status = reqwest::StatusCode::from_u16(code).unwrap();
            match OpenAiCompatibleBackend::classify_status(status, "") {
                LlmError::Unavailable(msg) => assert!(msg.contains(&code.to_string())),
                other => panic!("Expected Unavailable for {code}, got {other:?}"),
            }
        }
    }

    #[test]
    fn response_body_parses_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "fn add() {}"}}],
            "model": "qwen-test",
            "usage": {"prompt_tokens": 12, "completion_tokens": 34}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("fn add() {}")
        );
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 34);
    }
}
