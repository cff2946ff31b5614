//! OpenAiCompatibleGenerator - chat-completions client with a model fallback chain.
//!
//! Defaults to OpenRouter. Each configured model is tried in order; the
//! first non-empty completion wins.

use async_trait::async_trait;
use deepdive_core::generation::{GenerationError, GenerationRequest, TextGenerator};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Free-tier OpenRouter models, most reliable first.
pub const DEFAULT_OPENROUTER_MODELS: &[&str] = &[
    "tngtech/deepseek-r1t2-chimera:free",
    "deepseek/deepseek-r1-distill-llama-70b:free",
    "mistralai/devstral-2512:free",
    "nousresearch/deephermes-3-llama-3-8b-preview:free",
];

const APP_TITLE: &str = "Deep Dive";
const TEMPERATURE: f32 = 0.7;

/// Generator for any OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
}

impl OpenAiCompatibleGenerator {
    /// Creates a generator for OpenRouter with the given model chain.
    ///
    /// An empty chain falls back to [`DEFAULT_OPENROUTER_MODELS`].
    pub fn new(api_key: impl Into<String>, models: Vec<String>) -> Self {
        let models = if models.is_empty() {
            DEFAULT_OPENROUTER_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            models
        };
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            models,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    async fn send_request(
        &self,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .header("X-Title", APP_TITLE)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                GenerationError::Network(format!("Chat completion request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            GenerationError::InvalidResponse(format!("Failed to parse chat completion: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    async fn complete(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let messages = build_messages(&request);
        let mut last_error = GenerationError::Unavailable("no models configured".to_string());

        for model in &self.models {
            let body = ChatCompletionRequest {
                model,
                messages: &messages,
                max_tokens: request.max_tokens,
                temperature: TEMPERATURE,
            };

            match self.send_request(&body).await {
                Ok(text) => {
                    tracing::debug!("Completion served by {}", model);
                    return Ok(text);
                }
                Err(err) => {
                    tracing::warn!("Model {} failed: {}", model, err);
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }

    fn name(&self) -> &str {
        "openai_compatible"
    }
}

fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage<'_>> {
    let mut messages = Vec::with_capacity(2);
    if !request.system_prompt.trim().is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.user_prompt,
    });
    messages
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
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
    fn test_empty_model_list_uses_defaults() {
        let generator = OpenAiCompatibleGenerator::new("key", Vec::new());
        assert_eq!(generator.models().len(), DEFAULT_OPENROUTER_MODELS.len());
        assert_eq!(generator.models()[0], DEFAULT_OPENROUTER_MODELS[0]);
    }

    #[test]
    fn test_messages_include_system_only_when_present() {
        let request = GenerationRequest::new("", "Ask one question", 50);
        let messages = build_messages(&request);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");

        let request = GenerationRequest::new("You are Rocky", "Ask one question", 50);
        assert_eq!(build_messages(&request)[0].role, "system");
    }

    #[test]
    fn test_null_content_is_empty_completion() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(extract_text_response(parsed), Err(GenerationError::Empty));
    }

    #[test]
    fn test_extracts_first_choice() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"What's the number?"}},{"message":{"content":"x"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), "What's the number?");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_network_error() {
        let generator = OpenAiCompatibleGenerator::new("key", vec!["m1".into(), "m2".into()])
            .with_base_url("http://127.0.0.1:9/v1/chat/completions");
        let err = generator
            .complete(GenerationRequest::new("", "hi", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
    }
}
