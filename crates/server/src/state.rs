use contentforge_core::{Config, ContentGenerator, ProjectStore, SanitizedConfig};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    generator: Arc<dyn ContentGenerator>,
    projects: Arc<dyn ProjectStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        generator: Arc<dyn ContentGenerator>,
        projects: Arc<dyn ProjectStore>,
    ) -> Self {
        Self {
            config,
            generator,
            projects,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn generator(&self) -> &Arc<dyn ContentGenerator> {
        &self.generator
    }

    pub fn projects(&self) -> &Arc<dyn ProjectStore> {
        &self.projects
    }
}
