//! Projects: persisted generation requests and their content packages.

mod runner;
mod sqlite_store;
mod store;
mod types;

pub use runner::generate_project;
pub use sqlite_store::SqliteProjectStore;
pub use store::{CreateProjectRequest, ProjectError, ProjectFilter, ProjectStore};
pub use types::{Project, ProjectState};
