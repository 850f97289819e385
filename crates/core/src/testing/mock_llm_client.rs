//! Mock LLM client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::generation::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Canned answer for a model call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// The model answers with this text.
    Text(String),
    /// The call fails with this error.
    Error(LlmError),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        MockReply::Error(LlmError::Api {
            status,
            message: message.into(),
        })
    }

    pub fn http_error(message: impl Into<String>) -> Self {
        MockReply::Error(LlmError::Http(message.into()))
    }
}

/// Reply used when a request's prompt contains `needle`.
struct PromptRoute {
    label: String,
    needle: String,
    reply: MockReply,
}

/// Mock implementation of the LlmClient trait.
///
/// Replies are routed by the request label (the prompt task label, e.g.
/// `"script"` or `"seo"`). A label with no configured reply fails with a
/// 404 API error, so a test notices calls it did not expect.
///
/// # Example
///
/// ```rust,ignore
/// use contentforge_core::testing::{fixtures, MockLlmClient, MockReply};
///
/// let client = MockLlmClient::new();
/// client.on("script", MockReply::text(fixtures::script_json(10, "Way")));
/// client.on("seo", MockReply::text(fixtures::seo_json()));
///
/// // Run a generation...
///
/// assert_eq!(client.call_count("script"), 1);
/// ```
pub struct MockLlmClient {
    /// Reply per label.
    replies: Mutex<HashMap<String, MockReply>>,
    /// Replies chosen by prompt content, checked before `replies`.
    prompt_routes: Mutex<Vec<PromptRoute>>,
    /// Recorded requests, in call order.
    requests: Mutex<Vec<CompletionRequest>>,
    /// Delay applied to every call.
    delay: Mutex<Option<Duration>>,
    /// Extra delay per label.
    label_delays: Mutex<HashMap<String, Duration>>,
    /// Usage reported for every successful call.
    usage: LlmUsage,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl std::fmt::Debug for MockLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmClient")
            .field("replies", &"<replies>")
            .field("requests", &self.total_calls())
            .finish()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    /// Create a mock with no replies configured.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            prompt_routes: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
            label_delays: Mutex::new(HashMap::new()),
            usage: LlmUsage {
                input_tokens: 200,
                output_tokens: 100,
            },
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer every request with `label` using `reply`.
    pub fn on(&self, label: &str, reply: MockReply) {
        self.replies.lock().unwrap().insert(label.to_string(), reply);
    }

    /// Answer requests with `label` whose prompt contains `needle`.
    pub fn on_prompt_containing(&self, label: &str, needle: &str, reply: MockReply) {
        self.prompt_routes.lock().unwrap().push(PromptRoute {
            label: label.to_string(),
            needle: needle.to_string(),
            reply,
        });
    }

    /// Delay every call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Delay calls for one label, on top of the global delay.
    pub fn set_label_delay(&self, label: &str, delay: Duration) {
        self.label_delays
            .lock()
            .unwrap()
            .insert(label.to_string(), delay);
    }

    /// All recorded requests.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests for one label.
    pub fn requests_for(&self, label: &str) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.label.as_deref() == Some(label))
            .cloned()
            .collect()
    }

    pub fn call_count(&self, label: &str) -> usize {
        self.requests_for(label).len()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Labels in the order the calls were made.
    pub fn call_labels(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.label_or_default().to_string())
            .collect()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn reply_for(&self, request: &CompletionRequest) -> MockReply {
        let label = request.label_or_default();

        let routed = self
            .prompt_routes
            .lock()
            .unwrap()
            .iter()
            .find(|route| route.label == label && request.prompt.contains(&route.needle))
            .map(|route| route.reply.clone());
        if let Some(reply) = routed {
            return reply;
        }

        self.replies
            .lock()
            .unwrap()
            .get(label)
            .cloned()
            .unwrap_or_else(|| MockReply::api_error(404, format!("no mock reply for {}", label)))
    }

    fn delay_for(&self, label: &str) -> Duration {
        let base = self.delay.lock().unwrap().unwrap_or_default();
        let extra = self
            .label_delays
            .lock()
            .unwrap()
            .get(label)
            .copied()
            .unwrap_or_default();
        base + extra
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.reply_for(&request);
        let delay = self.delay_for(request.label_or_default());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            MockReply::Text(text) => Ok(CompletionResponse {
                text,
                usage: self.usage,
                model: "mock-model".to_string(),
            }),
            MockReply::Error(e) => Err(e),
        }
    }
}
