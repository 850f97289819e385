//! Script generation with item-count validation.
//!
//! The generator runs at most two model calls:
//!
//! ```text
//! Generate ──> Validate ──(count ok or no count)──> Done(script)
//!                 │
//!                 └─(count wrong)──> Generate(retry) ──> Validate ──> Done(script)
//!                                                           │
//!                                                           └─(still wrong)──> QuantityContractViolation
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::generation::answer::{opt_list, opt_text, section};
use crate::generation::config::GenerationConfig;
use crate::generation::invoke::invoke_json;
use crate::generation::llm::{LlmClient, LlmError, LlmUsage};
use crate::generation::prompts::PromptTask;
use crate::generation::quantity::QuantitySpec;
use crate::generation::traits::GenerationError;
use crate::generation::types::{DurationBucket, GeneratedScript, GenerationRequest, ScriptSection};
use crate::metrics::{QUANTITY_VIOLATIONS, SCRIPT_RETRIES};

/// A script that passed validation.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub script: GeneratedScript,
    /// 1 when the first answer was accepted, 2 when the retry was needed.
    pub attempts: u32,
    pub usage: LlmUsage,
}

/// Result of checking a script against the requested item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    Mismatch { expected: usize, actual: usize },
}

/// Compare a script's main item count against the quantity contract.
pub fn validate_script(script: &GeneratedScript, quantity: &QuantitySpec) -> Validation {
    match quantity.requested_quantity {
        None => Validation::Accepted,
        Some(expected) if script.main_content.len() == expected => Validation::Accepted,
        Some(expected) => Validation::Mismatch {
            expected,
            actual: script.main_content.len(),
        },
    }
}

/// Generates the primary script asset.
pub struct ScriptGenerator<C: LlmClient> {
    client: Arc<C>,
    config: GenerationConfig,
}

impl<C: LlmClient> ScriptGenerator<C> {
    pub fn new(client: Arc<C>, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    /// Generate a script, retrying once if the item count is wrong.
    ///
    /// An invocation failure on either attempt aborts immediately. A wrong
    /// count after the retry is `QuantityContractViolation` carrying the
    /// retry's count; the first attempt is never returned.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        quantity: &QuantitySpec,
    ) -> Result<ScriptOutcome, GenerationError> {
        let mut usage = LlmUsage::default();

        let first = self
            .attempt(
                &PromptTask::Script {
                    quantity: *quantity,
                },
                request,
                &mut usage,
            )
            .await?;

        let previous_count = match validate_script(&first, quantity) {
            Validation::Accepted => {
                info!(
                    items = first.main_content.len(),
                    words = first.total_words,
                    "Script accepted on first attempt"
                );
                return Ok(ScriptOutcome {
                    script: first,
                    attempts: 1,
                    usage,
                });
            }
            Validation::Mismatch { expected, actual } => {
                warn!(expected, actual, "Script item count mismatch, retrying once");
                SCRIPT_RETRIES.inc();
                actual
            }
        };

        let retried = self
            .attempt(
                &PromptTask::ScriptRetry {
                    quantity: *quantity,
                    previous_count,
                },
                request,
                &mut usage,
            )
            .await?;

        match validate_script(&retried, quantity) {
            Validation::Accepted => {
                info!(
                    items = retried.main_content.len(),
                    "Script accepted after retry"
                );
                Ok(ScriptOutcome {
                    script: retried,
                    attempts: 2,
                    usage,
                })
            }
            Validation::Mismatch { expected, actual } => {
                error!(expected, actual, "Script still violates the item count after retry");
                QUANTITY_VIOLATIONS.inc();
                Err(GenerationError::QuantityContractViolation { expected, actual })
            }
        }
    }

    /// One Generate step. Unparseable output becomes an empty script so the
    /// validation step decides what happens next.
    async fn attempt(
        &self,
        task: &PromptTask,
        request: &GenerationRequest,
        usage: &mut LlmUsage,
    ) -> Result<GeneratedScript, GenerationError> {
        let result = invoke_json::<C, Value>(
            self.client.as_ref(),
            &self.config,
            task,
            request,
            None,
            self.config.script_max_tokens,
        )
        .await;

        match result {
            Ok((answer, call_usage)) => {
                usage.accumulate(&call_usage);
                Ok(ScriptResponse::from_value(&answer).into_script(request.duration))
            }
            Err(e @ LlmError::Json(_)) => {
                debug!(task = task.label(), error = %e, "Treating unparseable script as empty");
                Ok(ScriptResponse::default().into_script(request.duration))
            }
            Err(e) => Err(GenerationError::invocation(task.label(), e)),
        }
    }
}

/// Script JSON as returned by the model. Every field is optional.
#[derive(Debug, Default)]
struct ScriptResponse {
    hook: Option<ScriptSection>,
    introduction: Option<ScriptSection>,
    main_content: Option<Vec<ScriptSection>>,
    conclusion: Option<ScriptSection>,
    estimated_duration: Option<String>,
}

impl ScriptResponse {
    /// Read each field on its own; `mainContent` only counts as an array.
    fn from_value(answer: &Value) -> Self {
        Self {
            hook: answer.get("hook").map(section),
            introduction: answer.get("introduction").map(section),
            main_content: opt_list(answer, "mainContent", section),
            conclusion: answer.get("conclusion").map(section),
            estimated_duration: opt_text(answer, "estimatedDuration"),
        }
    }

    fn into_script(self, duration: DurationBucket) -> GeneratedScript {
        let mut script = GeneratedScript {
            hook: self.hook.unwrap_or_default(),
            introduction: self.introduction.unwrap_or_default(),
            main_content: self.main_content.unwrap_or_default(),
            conclusion: self.conclusion.unwrap_or_default(),
            total_words: 0,
            estimated_duration: String::new(),
        };

        script.total_words = script.count_words();
        script.estimated_duration = self
            .estimated_duration
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| estimate_duration(script.total_words, duration));
        script
    }
}

/// Runtime estimate from word count at the standard speaking rate.
fn estimate_duration(words: usize, fallback: DurationBucket) -> String {
    if words == 0 {
        return fallback.label().to_string();
    }
    let seconds = (words as u64 * 60) / DurationBucket::WORDS_PER_MINUTE as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
