mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use axum::Router;
use qbank_engine::{EngineConfig, Executor, SyntaxValidator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub executor: Executor,
    pub validator: SyntaxValidator,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        let config = Arc::new(config);
        Self {
            executor: Executor::from_shared(config.clone()),
            validator: SyntaxValidator::from_shared(config),
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("qbank API booting...");

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    info!(
        temp_root = %config.temp_root.display(),
        languages = ?config.languages.list_languages(),
        "Code-test engine configured"
    );

    let state = Arc::new(AppState::new(config));

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        warn!("Received shutdown signal, finishing in-flight requests...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("API shutdown complete");
    Ok(())
}
