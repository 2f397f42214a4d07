//! Error kinds shared by all LLM backends

use thiserror::Error;

/// Errors produced by LLM backend construction and invocation.
///
/// The first three variants are the runtime failure kinds the pipeline treats
/// as fatal to the current stage. `Misconfiguration` and `Unsupported` can
/// only occur while building a backend at application start-up.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The backend could not be reached or answered with a server error
    /// (transport failure or 5xx response).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the credentials (401/403 or missing API key).
    #[error("backend authentication failed: {0}")]
    Auth(String),

    /// The backend refused the request because of rate limiting (429).
    #[error("backend rate limited: {0}")]
    RateLimited(String),

    /// Provider configuration is invalid; raised during construction only.
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    /// The requested provider is not known to this build.
    #[error("unsupported: {0}")]
    Unsupported(String),
}
