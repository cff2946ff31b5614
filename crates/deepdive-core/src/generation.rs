//! Text-generation collaborator.
//!
//! The engine never surfaces a [`GenerationError`]: every failure falls back
//! to persona bank content.

use async_trait::async_trait;
use thiserror::Error;

/// One completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered but produced no text
    #[error("Empty completion")]
    Empty,

    #[error("Generation timed out after {0} ms")]
    Timeout(u64),

    /// The response body could not be understood
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// A prompt template failed to render
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Generation is not configured (missing key, offline mode)
    #[error("Generation unavailable: {0}")]
    Unavailable(String),
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
