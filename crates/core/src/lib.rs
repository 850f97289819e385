pub mod config;
pub mod generation;
pub mod metrics;
pub mod project;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use generation::{
    AssetKind, ContentGenerator, ContentOrchestrator, ContentPackage, GenerationConfig,
    GenerationError, GenerationRequest, GenerationResult, LlmClient, LlmConfig, OpenAiClient,
};
pub use project::{
    generate_project, CreateProjectRequest, Project, ProjectError, ProjectFilter, ProjectState,
    ProjectStore, SqliteProjectStore,
};
