//! Project API handlers.
//!
//! A project is created in `pending` and generated in the background; clients
//! poll `GET /projects/{id}` until it reaches `completed` or `failed`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contentforge_core::{
    generate_project, ContentPackage, CreateProjectRequest, GenerationRequest, Project,
    ProjectError, ProjectFilter, ProjectState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::ErrorResponse;
use crate::metrics::{PROJECTS_CREATED_TOTAL, PROJECTS_FAILED_TOTAL};
use crate::state::AppState;

/// Maximum allowed limit for project queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for project queries
const DEFAULT_LIMIT: i64 = 100;

/// Owner recorded when the request names none
const DEFAULT_OWNER: &str = "anonymous";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a project
#[derive(Debug, Deserialize)]
pub struct CreateProjectBody {
    pub owner: Option<String>,
    #[serde(flatten)]
    pub request: GenerationRequest,
}

/// Query parameters for listing projects
#[derive(Debug, Deserialize)]
pub struct ListProjectsParams {
    /// Filter by state type
    pub state: Option<String>,
    pub owner: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for project operations
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub created_at: String,
    pub owner: String,
    pub state: ProjectState,
    pub request: GenerationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<ContentPackage>,
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            created_at: project.created_at.to_rfc3339(),
            owner: project.owner,
            state: project.state,
            request: project.request,
            package: project.package,
            updated_at: project.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing projects
#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn store_error(e: ProjectError) -> ApiError {
    let status = match &e {
        ProjectError::NotFound(_) => StatusCode::NOT_FOUND,
        ProjectError::InvalidState { .. } => StatusCode::CONFLICT,
        ProjectError::Database(_) | ProjectError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("Project not found: {}", id))),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a project and start generating it in the background
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProjectBody>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    // Reject up front so a doomed request never becomes a stored project.
    if let Err(reason) = body.request.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(reason).with_kind("invalid_request")),
        ));
    }

    let owner = body
        .owner
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let project = state
        .projects()
        .create(CreateProjectRequest {
            owner,
            request: body.request,
        })
        .map_err(store_error)?;

    PROJECTS_CREATED_TOTAL.inc();
    info!(project_id = %project.id, owner = %project.owner, "Project created");

    let generator = Arc::clone(state.generator());
    let projects = Arc::clone(state.projects());
    let id = project.id.clone();
    tokio::spawn(async move {
        match generate_project(generator.as_ref(), projects.as_ref(), &id).await {
            Ok(done) => {
                if matches!(done.state, ProjectState::Failed { .. }) {
                    PROJECTS_FAILED_TOTAL.inc();
                }
            }
            Err(e) => warn!(project_id = %id, error = %e, "Background generation aborted"),
        }
    });

    Ok((StatusCode::ACCEPTED, Json(ProjectResponse::from(project))))
}

/// Get a project by ID
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    match state.projects().get(&id).map_err(store_error)? {
        Some(project) => Ok(Json(ProjectResponse::from(project))),
        None => Err(not_found(&id)),
    }
}

/// List projects with optional filters
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProjectsParams>,
) -> Result<Json<ListProjectsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = ProjectFilter::new().with_limit(limit).with_offset(offset);
    if let Some(project_state) = params.state {
        filter = filter.with_state(project_state);
    }
    if let Some(owner) = params.owner {
        filter = filter.with_owner(owner);
    }

    let projects = state.projects().list(&filter).map_err(store_error)?;

    // Total ignores pagination
    let count_filter = ProjectFilter {
        limit: i64::MAX,
        offset: 0,
        ..filter
    };
    let total = state.projects().count(&count_filter).map_err(store_error)?;

    Ok(Json(ListProjectsResponse {
        projects: projects.into_iter().map(ProjectResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// Delete a project that is not currently generating
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let deleted = state.projects().delete(&id).map_err(store_error)?;
    info!(project_id = %id, "Project deleted");
    Ok(Json(ProjectResponse::from(deleted)))
}
