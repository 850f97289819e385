//! SQLite-backed project store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{CreateProjectRequest, Project, ProjectError, ProjectFilter, ProjectState, ProjectStore};
use crate::generation::{ContentPackage, GenerationRequest};

const PROJECT_COLUMNS: &str = "id, created_at, owner, state, request, package, updated_at";

/// SQLite-backed project store.
pub struct SqliteProjectStore {
    conn: Mutex<Connection>,
}

impl SqliteProjectStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, ProjectError> {
        let conn = Connection::open(path).map_err(|e| ProjectError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, ProjectError> {
        let conn =
            Connection::open_in_memory().map_err(|e| ProjectError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ProjectError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                owner TEXT NOT NULL,
                state TEXT NOT NULL,
                request TEXT NOT NULL,
                package TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner);
            CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at DESC);
            "#,
        )
        .map_err(|e| ProjectError::Database(e.to_string()))
    }

    fn build_where_clause(filter: &ProjectFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref state) = filter.state {
            conditions.push("json_extract(state, '$.type') = ?");
            params.push(Box::new(state.clone()));
        }

        if let Some(ref owner) = filter.owner {
            conditions.push("owner = ?");
            params.push(Box::new(owner.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        let id: String = row.get(0)?;
        let created_at_str: String = row.get(1)?;
        let owner: String = row.get(2)?;
        let state_json: String = row.get(3)?;
        let request_json: String = row.get(4)?;
        let package_json: Option<String> = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        let created_at = parse_timestamp(&created_at_str);
        let updated_at = parse_timestamp(&updated_at_str);

        let state: ProjectState = serde_json::from_str(&state_json).unwrap_or_else(|e| {
            ProjectState::Failed {
                error: format!("unreadable state: {}", e),
            }
        });
        let request: GenerationRequest = serde_json::from_str(&request_json)
            .map_err(|e| json_column_error(4, e))?;
        let package: Option<ContentPackage> = package_json
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| json_column_error(5, e))?;

        Ok(Project {
            id,
            created_at,
            owner,
            state,
            request,
            package,
            updated_at,
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Project, ProjectError> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS);
        match conn.query_row(&sql, params![id], Self::row_to_project) {
            Ok(project) => Ok(project),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(ProjectError::NotFound(id.to_string())),
            Err(e) => Err(ProjectError::Database(e.to_string())),
        }
    }

    /// Move a project from `from` to `to`, replacing its stored package.
    fn transition(
        &self,
        id: &str,
        operation: &str,
        from: &ProjectState,
        to: ProjectState,
        package: Option<&ContentPackage>,
    ) -> Result<Project, ProjectError> {
        let conn = self.conn.lock().unwrap();
        let current = Self::fetch(&conn, id)?;

        if current.state.state_type() != from.state_type() {
            return Err(ProjectError::InvalidState {
                project_id: id.to_string(),
                current_state: current.state.state_type().to_string(),
                operation: operation.to_string(),
            });
        }

        let now = Utc::now();
        let state_json =
            serde_json::to_string(&to).map_err(|e| ProjectError::Serialization(e.to_string()))?;
        let package_json = package
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ProjectError::Serialization(e.to_string()))?;

        conn.execute(
            "UPDATE projects SET state = ?, package = ?, updated_at = ? WHERE id = ?",
            params![state_json, package_json, now.to_rfc3339(), id],
        )
        .map_err(|e| ProjectError::Database(e.to_string()))?;

        Ok(Project {
            state: to,
            package: package.cloned(),
            updated_at: now,
            ..current
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn json_column_error(column: usize, e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

impl ProjectStore for SqliteProjectStore {
    fn create(&self, request: CreateProjectRequest) -> Result<Project, ProjectError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let state = ProjectState::Pending;

        let state_json =
            serde_json::to_string(&state).map_err(|e| ProjectError::Serialization(e.to_string()))?;
        let request_json = serde_json::to_string(&request.request)
            .map_err(|e| ProjectError::Serialization(e.to_string()))?;

        conn.execute(
            "INSERT INTO projects (id, created_at, owner, state, request, package, updated_at) VALUES (?, ?, ?, ?, ?, NULL, ?)",
            params![
                id,
                now.to_rfc3339(),
                request.owner,
                state_json,
                request_json,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| ProjectError::Database(e.to_string()))?;

        Ok(Project {
            id,
            created_at: now,
            owner: request.owner,
            state,
            request: request.request,
            package: None,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Project>, ProjectError> {
        let conn = self.conn.lock().unwrap();
        match Self::fetch(&conn, id) {
            Ok(project) => Ok(Some(project)),
            Err(ProjectError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ProjectError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT {} FROM projects {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            PROJECT_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));
        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_project)
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProjectError::Database(e.to_string()))
    }

    fn count(&self, filter: &ProjectFilter) -> Result<i64, ProjectError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM projects {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| ProjectError::Database(e.to_string()))
    }

    fn mark_generating(&self, id: &str) -> Result<Project, ProjectError> {
        self.transition(
            id,
            "start generation for",
            &ProjectState::Pending,
            ProjectState::Generating,
            None,
        )
    }

    fn complete(&self, id: &str, package: &ContentPackage) -> Result<Project, ProjectError> {
        self.transition(
            id,
            "complete",
            &ProjectState::Generating,
            ProjectState::Completed,
            Some(package),
        )
    }

    fn fail(&self, id: &str, reason: &str) -> Result<Project, ProjectError> {
        self.transition(
            id,
            "fail",
            &ProjectState::Generating,
            ProjectState::Failed {
                error: reason.to_string(),
            },
            None,
        )
    }

    fn delete(&self, id: &str) -> Result<Project, ProjectError> {
        let conn = self.conn.lock().unwrap();
        let project = Self::fetch(&conn, id)?;

        if project.state == ProjectState::Generating {
            return Err(ProjectError::InvalidState {
                project_id: id.to_string(),
                current_state: project.state.state_type().to_string(),
                operation: "delete".to_string(),
            });
        }

        conn.execute("DELETE FROM projects WHERE id = ?", params![id])
            .map_err(|e| ProjectError::Database(e.to_string()))?;

        Ok(project)
    }
}
