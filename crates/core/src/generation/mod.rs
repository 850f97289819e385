//! Generation - turns a topic (or an uploaded script) into a content package.
//!
//! This module drives a single text model through several sub-requests:
//! - Detecting an explicit item count in the topic ("10 ways to ...")
//! - Generating the script and enforcing that count with one corrective retry
//! - Generating SEO, thumbnail, image prompt and production assets concurrently
//! - Merging everything into one [`ContentPackage`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      ContentOrchestrator                          │
//! │                                                                   │
//! │  extract_quantity ──> ScriptGenerator (serial, retry once)        │
//! │                              │                                    │
//! │                              ▼ script text                        │
//! │  ┌───────────────────────────────────────────────────────────┐   │
//! │  │                 AssetGenerator (concurrent)                │   │
//! │  │   seo    thumbnails    image_prompts    production        │   │
//! │  └───────────────────────────────────────────────────────────┘   │
//! │                              │                                    │
//! │                              ▼ wait for all, merge                │
//! │                        ContentPackage                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure policy
//!
//! - A model call that fails (transport, API error, timeout) fails the request.
//! - An unparseable script is treated as an empty script and validated as such.
//! - An unparseable auxiliary answer becomes that asset's empty value.
//! - A script with the wrong item count after the retry is
//!   [`GenerationError::QuantityContractViolation`].
//!
//! # Example
//!
//! ```ignore
//! use contentforge_core::generation::{
//!     AssetKind, ContentGenerator, ContentOrchestrator, GenerationConfig, GenerationRequest,
//!     OpenAiClient,
//! };
//!
//! let client = Arc::new(OpenAiClient::new(api_key, "gpt-4o-mini"));
//! let orchestrator = ContentOrchestrator::new(client, GenerationConfig::default());
//!
//! let request = GenerationRequest::new("10 ways to save money")
//!     .with_assets([AssetKind::Script, AssetKind::Seo]);
//! let result = orchestrator.generate(&request).await?;
//! assert_eq!(result.package.script.unwrap().main_content.len(), 10);
//! ```

mod answer;
mod assets;
mod config;
mod coordinator;
mod invoke;
mod llm;
pub mod prompts;
mod quantity;
mod script;
mod traits;
mod types;

pub use assets::{AssetGenerator, ImageSource, MAX_TITLES};
pub use config::{GenerationConfig, LlmConfig, API_KEY_ENV};
pub use coordinator::ContentOrchestrator;
pub use llm::{
    extract_json_object, parse_json_response, CompletionRequest, CompletionResponse, LlmClient,
    LlmError, LlmUsage, OpenAiClient, ResponseFormat,
};
pub use prompts::{build_prompt, Prompt, PromptTask};
pub use quantity::{extract_quantity, QuantitySpec, UNIT_NOUNS};
pub use script::{validate_script, ScriptGenerator, ScriptOutcome, Validation};
pub use traits::{ContentGenerator, GenerationError};
pub use types::{
    AssetKind, AssetOutput, BulletPoint, ContentPackage, DesignConcept, DurationBucket,
    GeneratedScript, GenerationRequest, GenerationResult, ProductionAssets, ScriptSection,
    SectionImagePrompts, SeoPackage, ThumbnailConcept, Tone,
};
