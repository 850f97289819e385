//! Common test utilities for in-process API testing.
//!
//! The fixture builds the real router around a scripted model client and a
//! SQLite project store in a temporary directory, so requests exercise the
//! full stack without network access.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use contentforge_core::{
    config::{DatabaseConfig, ServerConfig},
    testing::MockLlmClient,
    Config, ContentGenerator, ContentOrchestrator, GenerationConfig, LlmConfig, ProjectStore,
    SqliteProjectStore,
};
use contentforge_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use contentforge_core::testing::{fixtures, MockReply};

/// In-process server with a scripted model client.
pub struct TestFixture {
    pub router: Router,
    /// Mock model client - script replies per task label
    pub client: Arc<MockLlmClient>,
    /// Temporary directory holding the project database
    pub _temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            llm: LlmConfig {
                api_key: Some("sk-test-secret".to_string()),
                ..LlmConfig::new("gpt-4o-mini")
            },
            generation: GenerationConfig::default(),
        };

        let client = Arc::new(MockLlmClient::new());
        let generator: Arc<dyn ContentGenerator> = Arc::new(ContentOrchestrator::new(
            Arc::clone(&client),
            config.generation.clone(),
        ));
        let projects: Arc<dyn ProjectStore> = Arc::new(
            SqliteProjectStore::new(&db_path).expect("Failed to create project store"),
        );

        let state = Arc::new(AppState::new(config, generator, projects));

        Self {
            router: create_router(state),
            client,
            _temp_dir: temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body text.
    #[allow(dead_code)]
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Poll a project until it leaves `pending`/`generating`.
    #[allow(dead_code)]
    pub async fn wait_for_terminal(&self, id: &str) -> Value {
        self.wait_for_state(id, &["completed", "failed"]).await
    }

    /// Poll a project until its state type is one of `states`.
    #[allow(dead_code)]
    pub async fn wait_for_state(&self, id: &str, states: &[&str]) -> Value {
        let path = format!("/api/v1/projects/{}", id);
        for _ in 0..200 {
            let response = self.get(&path).await;
            let state = response.body["state"]["type"].as_str().unwrap_or_default();
            if states.contains(&state) {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("project {} never reached any of {:?}", id, states);
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
