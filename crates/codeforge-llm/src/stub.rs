//! Deterministic stub backends for tests
//!
//! These backends never touch the network. [`StubBackend`] echoes
//! `<stage>:<blake3-prefix-of-prompt>` so tests can prove which stage
//! produced a value and that prompt content propagated; [`FailingBackend`]
//! injects a chosen failure at a chosen stage.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, LlmBackend};

fn echo(req: &CompletionRequest) -> CompletionResponse {
    let digest = blake3::hash(req.prompt.as_bytes()).to_hex();
    let text = format!("{}:{}", req.stage, &digest.as_str()[..16]);
    CompletionResponse::new(text, req.sampling.model.clone())
}

/// Backend that records every request and echoes a stage-tagged prompt hash.
///
/// Clones share the recording buffer, so a test can keep one handle for
/// assertions while handing another to the executor.
#[derive(Debug, Clone, Default)]
pub struct StubBackend {
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl StubBackend {
    /// Create a stub with an empty recording buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests seen so far, in invocation order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().expect("stub lock poisoned").clone()
    }

    /// Prompt of the most recent request issued for `stage`, if any.
    #[must_use]
    pub fn last_prompt_for(&self, stage: &str) -> Option<String> {
        self.requests()
            .iter()
            .rev()
            .find(|req| req.stage == stage)
            .map(|req| req.prompt.clone())
    }
}

#[async_trait]
impl LlmBackend for StubBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = echo(&req);
        self.calls.lock().expect("stub lock poisoned").push(req);
        Ok(response)
    }
}

/// Failure kind injected by [`FailingBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unavailable,
    Auth,
    RateLimited,
}

impl FailureKind {
    fn to_error(self) -> LlmError {
        match self {
            Self::Unavailable => LlmError::Unavailable("injected outage".to_string()),
            Self::Auth => LlmError::Auth("injected auth failure".to_string()),
            Self::RateLimited => LlmError::RateLimited("injected rate limit".to_string()),
        }
    }
}

/// Backend that behaves like [`StubBackend`] until the named stage, where it
/// fails with the configured error kind.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    fail_stage: String,
    kind: FailureKind,
    inner: StubBackend,
}

impl FailingBackend {
    /// Fail every request whose stage name equals `fail_stage`.
    #[must_use]
    pub fn new(fail_stage: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            fail_stage: fail_stage.into(),
            kind,
            inner: StubBackend::new(),
        }
    }

    /// Requests that succeeded before the failure, in invocation order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.inner.requests()
    }
}

#[async_trait]
impl LlmBackend for FailingBackend {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if req.stage == self.fail_stage {
            return Err(self.kind.to_error());
        }
        self.inner.complete(req).await
    }
}
