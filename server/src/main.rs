mod config;
mod routes;
mod services;
mod state;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match config::GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid gateway configuration");
            return ExitCode::FAILURE;
        }
    };

    // GitHub provider is optional: sign-in falls back to credentials only.
    let github = services::github::GitHubConfig::from_env();
    if github.is_none() {
        tracing::warn!("GitHub OAuth not configured; provider disabled");
    }

    let sessions = Arc::new(services::session::MemorySessionStore::new(config.session_ttl));
    let _sweeper = services::session::spawn_session_sweeper(sessions.clone(), SESSION_SWEEP_INTERVAL);

    let port = config.port;
    let backend_origin = config.backend_origin.to_string();
    let state = match state::AppState::new(config, sessions, github) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "gateway state init failed");
            return ExitCode::FAILURE;
        }
    };

    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%port, %backend_origin, "finnance gateway listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
