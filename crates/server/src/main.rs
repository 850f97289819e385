use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contentforge_core::{
    generation::API_KEY_ENV, load_config, validate_config, ContentGenerator, ContentOrchestrator,
    OpenAiClient, ProjectStore, SqliteProjectStore,
};
use contentforge_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the config file
const CONFIG_ENV: &str = "CONTENTFORGE_CONFIG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );
    info!("Database path: {:?}", config.database.path);

    let api_key = config.llm.resolve_api_key().ok_or_else(|| {
        anyhow!(
            "No model API key: set llm.api_key in the config or the {} environment variable",
            API_KEY_ENV
        )
    })?;

    let mut client = OpenAiClient::new(api_key, &config.llm.model)
        .with_timeout(Duration::from_secs(u64::from(config.llm.timeout_secs)));
    if let Some(api_base) = &config.llm.api_base {
        client = client.with_api_base(api_base);
    }
    info!(model = %config.llm.model, "Model client initialized");

    let generator: Arc<dyn ContentGenerator> = Arc::new(ContentOrchestrator::new(
        Arc::new(client),
        config.generation.clone(),
    ));

    let projects: Arc<dyn ProjectStore> = Arc::new(
        SqliteProjectStore::new(&config.database.path)
            .context("Failed to create project store")?,
    );
    info!("Project store initialized");

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, generator, projects));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
