//! Project storage trait and types.

use thiserror::Error;

use crate::generation::{ContentPackage, GenerationRequest};
use crate::project::Project;

/// Error type for project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Cannot {operation} project {project_id}: current state is {current_state}")]
    InvalidState {
        project_id: String,
        current_state: String,
        operation: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Request to create a new project.
#[derive(Debug, Clone)]
pub struct CreateProjectRequest {
    /// User creating the project.
    pub owner: String,
    /// What to generate.
    pub request: GenerationRequest,
}

/// Filter for querying projects.
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    /// Filter by state type ("pending", "generating", ...).
    pub state: Option<String>,
    /// Filter by owner.
    pub owner: Option<String>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self {
            state: None,
            owner: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for project storage backends.
pub trait ProjectStore: Send + Sync {
    /// Create a new project in the pending state.
    fn create(&self, request: CreateProjectRequest) -> Result<Project, ProjectError>;

    /// Get a project by ID.
    fn get(&self, id: &str) -> Result<Option<Project>, ProjectError>;

    /// List projects matching the filter, newest first.
    fn list(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ProjectError>;

    /// Count projects matching the filter.
    fn count(&self, filter: &ProjectFilter) -> Result<i64, ProjectError>;

    /// Pending -> Generating.
    fn mark_generating(&self, id: &str) -> Result<Project, ProjectError>;

    /// Generating -> Completed, storing the package.
    fn complete(&self, id: &str, package: &ContentPackage) -> Result<Project, ProjectError>;

    /// Generating -> Failed. Any previously stored package is cleared.
    fn fail(&self, id: &str, reason: &str) -> Result<Project, ProjectError>;

    /// Permanently delete a project, returning it. A project that is
    /// generating cannot be deleted.
    fn delete(&self, id: &str) -> Result<Project, ProjectError>;
}
