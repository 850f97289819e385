//! Single model call shared by every generator.

use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::generation::config::GenerationConfig;
use crate::generation::llm::{CompletionRequest, LlmClient, LlmError, LlmUsage};
use crate::generation::prompts::{build_prompt, PromptTask};
use crate::generation::types::GenerationRequest;
use crate::metrics::{LLM_TOKENS, MODEL_CALLS, MODEL_CALL_DURATION};

/// Build the prompt for `task`, call the model once and parse its JSON answer.
///
/// The call is bounded by `config.call_timeout()`; expiry is reported as
/// `LlmError::Timeout` like any other invocation failure.
pub(crate) async fn invoke_json<C, T>(
    client: &C,
    config: &GenerationConfig,
    task: &PromptTask,
    request: &GenerationRequest,
    prior_text: Option<&str>,
    max_tokens: u32,
) -> Result<(T, LlmUsage), LlmError>
where
    C: LlmClient,
    T: DeserializeOwned + Send,
{
    let label = task.label();
    let prompt = build_prompt(task, request, prior_text);
    let completion = CompletionRequest::new(prompt.user)
        .with_system(prompt.system)
        .with_max_tokens(max_tokens)
        .with_temperature(config.temperature)
        .json_object()
        .with_label(label);

    debug!(task = label, model = client.model(), "Calling model");

    let start = Instant::now();
    let timeout = config.call_timeout();
    let result = match tokio::time::timeout(timeout, client.complete_json::<T>(completion)).await
    {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout)),
    };
    MODEL_CALL_DURATION
        .with_label_values(&[label])
        .observe(start.elapsed().as_secs_f64());

    let outcome = match &result {
        Ok((_, usage)) => {
            LLM_TOKENS
                .with_label_values(&["input"])
                .inc_by(usage.input_tokens as u64);
            LLM_TOKENS
                .with_label_values(&["output"])
                .inc_by(usage.output_tokens as u64);
            "ok"
        }
        Err(LlmError::Json(_)) => "parse_error",
        Err(LlmError::Timeout(_)) => "timeout",
        Err(_) => "error",
    };
    MODEL_CALLS.with_label_values(&[label, outcome]).inc();

    if let Err(e) = &result {
        warn!(task = label, error = %e, "Model call did not return usable output");
    }

    result
}
