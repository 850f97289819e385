//! Error type and the host-facing generation trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::generation::llm::LlmError;
use crate::generation::types::{GenerationRequest, GenerationResult};

/// Errors that abort a generation request.
///
/// Unparseable model output for an auxiliary asset is not an error: that
/// asset falls back to its empty value and the request continues.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),

    #[error("Model invocation failed for {task}: {source}")]
    ModelInvocation {
        task: String,
        #[source]
        source: LlmError,
    },

    #[error(
        "Script must contain exactly {expected} main items, but the model returned {actual} after a retry"
    )]
    QuantityContractViolation { expected: usize, actual: usize },
}

impl GenerationError {
    pub(crate) fn invocation(task: impl Into<String>, source: LlmError) -> Self {
        GenerationError::ModelInvocation {
            task: task.into(),
            source,
        }
    }

    /// Short machine-readable kind for metrics and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidRequest(_) => "invalid_request",
            GenerationError::ModelInvocation { .. } => "model_invocation",
            GenerationError::QuantityContractViolation { .. } => "quantity_contract_violation",
        }
    }
}

/// Something that turns a request into a content package.
///
/// Object safe, so hosts can hold an `Arc<dyn ContentGenerator>` regardless
/// of which model client backs it.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResult, GenerationError>;
}
