//! Text-generation clients used by the AI-assisted classifiers.
//!
//! The classifiers only see [`LlmClient`]; the concrete backend (local
//! Ollama or hosted Gemini) is picked from configuration.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiClient;
pub use mock::MockLlmClient;
pub use ollama::OllamaClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Text generation service unreachable at {0}")]
    Unavailable(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),
}

/// Blocking text-generation capability with its own request timeout.
///
/// Implementations must be cheap to share across threads; callers run
/// `generate` on the blocking pool.
pub trait LlmClient: Send + Sync {
    fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs and the health endpoint.
    fn model(&self) -> &str;
}

/// Map a reqwest transport error onto the generation error taxonomy.
pub(crate) fn map_transport_error(e: reqwest::Error, endpoint: &str, timeout_secs: u64) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else if e.is_connect() {
        LlmError::Unavailable(endpoint.to_string())
    } else {
        LlmError::HttpClient(e.to_string())
    }
}
