//! Drives one project through generation.

use tracing::{info, warn};

use crate::generation::ContentGenerator;
use crate::project::{Project, ProjectError, ProjectStore};

/// Run generation for a pending project and record the outcome.
///
/// The project moves to `generating`, then to `completed` with the package
/// or to `failed` with the error message. A generation error is recorded on
/// the project, not returned; only store errors are returned.
pub async fn generate_project(
    generator: &dyn ContentGenerator,
    store: &dyn ProjectStore,
    id: &str,
) -> Result<Project, ProjectError> {
    let project = store.mark_generating(id)?;
    info!(project_id = %id, owner = %project.owner, "Generating project");

    match generator.generate(&project.request).await {
        Ok(result) => {
            info!(
                project_id = %id,
                duration_ms = result.duration_ms,
                script_attempts = result.script_attempts,
                "Project generation completed"
            );
            store.complete(id, &result.package)
        }
        Err(e) => {
            warn!(project_id = %id, error = %e, "Project generation failed");
            store.fail(id, &e.to_string())
        }
    }
}
