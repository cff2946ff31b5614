//! ClaudeApiGenerator - calls the Claude Messages API directly.

use async_trait::async_trait;
use deepdive_core::generation::{GenerationError, GenerationRequest, TextGenerator};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-latest";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generator that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeApiGenerator {
    /// Creates a new generator with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| GenerationError::Network(format!("Claude API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            GenerationError::InvalidResponse(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextGenerator for ClaudeApiGenerator {
    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = CreateMessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: request.user_prompt,
            }],
            max_tokens: request.max_tokens,
            system: Some(request.system_prompt).filter(|s| !s.trim().is_empty()),
        };

        self.send_request(&body).await
    }

    fn name(&self) -> &str {
        "claude"
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, GenerationError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } if !text.trim().is_empty() => Some(text),
            _ => None,
        })
        .ok_or(GenerationError::Empty)
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    GenerationError::Status {
        status: status.as_u16(),
        body: message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_text_block() {
        let parsed: CreateMessageResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"Why now?"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), "Why now?");
    }

    #[test]
    fn test_blank_text_is_empty_completion() {
        let parsed: CreateMessageResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"  "}]}"#).unwrap();
        assert_eq!(extract_text_response(parsed), Err(GenerationError::Empty));
    }

    #[test]
    fn test_error_body_message_is_unwrapped() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#.to_string(),
        );
        assert_eq!(
            err,
            GenerationError::Status {
                status: 429,
                body: "slow down".to_string()
            }
        );
    }

    #[test]
    fn test_request_omits_blank_system_prompt() {
        let body = CreateMessageRequest {
            model: DEFAULT_CLAUDE_MODEL.to_string(),
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
            max_tokens: 10,
            system: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
