//! Project types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generation::{ContentPackage, GenerationRequest};

/// Lifecycle of a project's generation.
///
/// ```text
/// Pending ──> Generating ──> Completed
///                  │
///                  └──────> Failed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectState {
    /// Created, generation not started yet.
    Pending,
    /// The orchestrator is working on it.
    Generating,
    /// Generation succeeded; the package is stored with the project.
    Completed,
    /// Generation failed. No package is stored.
    Failed { error: String },
}

impl ProjectState {
    pub fn state_type(&self) -> &'static str {
        match self {
            ProjectState::Pending => "pending",
            ProjectState::Generating => "generating",
            ProjectState::Completed => "completed",
            ProjectState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectState::Completed | ProjectState::Failed { .. })
    }
}

/// A stored generation request and, once finished, its content package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique identifier (UUID).
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Who asked for it.
    pub owner: String,
    pub state: ProjectState,
    pub request: GenerationRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<ContentPackage>,
    pub updated_at: DateTime<Utc>,
}
