//! LLM client abstraction and the OpenAI chat completions backend.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Error type for LLM operations.
///
/// `Json` is the only parse-class failure: the call itself succeeded but the
/// returned text was not the expected structured shape. Every other variant
/// means the invocation did not succeed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Not configured")]
    NotConfigured,
}

impl LlmError {
    /// Returns true if the model answered but the answer could not be parsed.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, LlmError::Json(_))
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmUsage {
    /// Add another usage record to this one.
    pub fn accumulate(&mut self, other: &LlmUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Requested shape of the model's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
    /// Requested answer format
    pub response_format: ResponseFormat,
    /// Purpose label for logs and metrics (never sent to the provider)
    pub label: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.7,
            response_format: ResponseFormat::Text,
            label: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask the provider for a JSON-object shaped answer.
    pub fn json_object(mut self) -> Self {
        self.response_format = ResponseFormat::JsonObject;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label used for logging, or "unlabeled".
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("unlabeled")
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    /// Token usage
    pub usage: LlmUsage,
    /// Model used
    pub model: String,
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "openai")
    fn provider(&self) -> &str;

    /// Model name (e.g., "gpt-4o-mini")
    fn model(&self) -> &str;

    /// Send a completion request and get a text response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Send a completion request and parse the response as JSON.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        request: CompletionRequest,
    ) -> Result<(T, LlmUsage), LlmError> {
        let response = self.complete(request).await?;
        let parsed = parse_json_response(&response.text)?;
        Ok((parsed, response.usage))
    }
}

/// Extract the outermost JSON object from a model answer.
///
/// Models sometimes wrap the object in a markdown code block or add a
/// sentence before it, so everything outside the first `{` and the last `}`
/// is dropped.
pub fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parse a model answer into `T`, tolerating code fences around the object.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(extract_json_object(text)).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        LlmError::Json(format!("{}: {}", e, preview))
    })
}

// ============================================================================
// OpenAI Implementation
// ============================================================================

/// OpenAI chat completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set a custom API base URL (proxies, compatible gateways).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    model: String,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

impl OpenAiClient {
    fn build_chat_request(&self, request: CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt,
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: match request.response_format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ChatResponseFormat {
                    format_type: "json_object".to_string(),
                }),
            },
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let chat_request = self.build_chat_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Json(e.to_string()))?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Json("No message content in response".to_string()))?;

        let usage = chat_response
            .usage
            .map(|u| LlmUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            text,
            usage,
            model: chat_response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Hello")
            .with_system("You are helpful")
            .with_max_tokens(100)
            .with_temperature(0.5)
            .json_object()
            .with_label("seo");

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.system, Some("You are helpful".to_string()));
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.response_format, ResponseFormat::JsonObject);
        assert_eq!(request.label_or_default(), "seo");
    }

    #[test]
    fn test_extract_json_from_code_block() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(text), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_without_braces_returns_input() {
        assert_eq!(extract_json_object("no json here"), "no json here");
    }

    #[test]
    fn test_parse_json_response_error_is_parse_failure() {
        let result: Result<serde_json::Value, _> = parse_json_response("definitely not json");
        let err = result.unwrap_err();
        assert!(err.is_parse_failure());
        assert!(!LlmError::Http("boom".into()).is_parse_failure());
        assert!(!LlmError::Timeout(Duration::from_secs(1)).is_parse_failure());
    }

    #[test]
    fn test_usage_accumulate() {
        let mut total = LlmUsage::default();
        total.accumulate(&LlmUsage {
            input_tokens: 10,
            output_tokens: 5,
        });
        total.accumulate(&LlmUsage {
            input_tokens: 1,
            output_tokens: 2,
        });
        assert_eq!(total.input_tokens, 11);
        assert_eq!(total.output_tokens, 7);
    }

    #[test]
    fn test_openai_client_custom_base() {
        let client = OpenAiClient::new("sk-test", "gpt-4o-mini").with_api_base("http://proxy:8000/v1/");
        assert_eq!(client.api_base, "http://proxy:8000/v1");
        assert_eq!(client.provider(), "openai");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_chat_request_serialization_json_mode() {
        let client = OpenAiClient::new("sk-test", "gpt-4o-mini");
        let request = CompletionRequest::new("Write a script")
            .with_system("You are a writer")
            .with_temperature(0.7)
            .json_object();

        let chat = client.build_chat_request(request);
        let json = serde_json::to_string(&chat).unwrap();
        assert!(json.contains("\"model\":\"gpt-4o-mini\""));
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"response_format\":{\"type\":\"json_object\"}"));
    }

    #[test]
    fn test_chat_request_text_mode_omits_format() {
        let client = OpenAiClient::new("sk-test", "gpt-4o-mini");
        let chat = client.build_chat_request(CompletionRequest::new("Hi"));
        let json = serde_json::to_string(&chat).unwrap();
        assert!(!json.contains("response_format"));
        assert!(!json.contains("\"role\":\"system\""));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let client = OpenAiClient::new("", "gpt-4o-mini");
        let result = client.complete(CompletionRequest::new("Hi")).await;
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }
}
