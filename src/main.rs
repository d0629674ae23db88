mod backend;
mod config;
mod model;
mod routes;
mod services;
mod state;
mod view;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let backend_config = backend::BackendConfig::load(&config).expect("backend outputs could not be loaded");
    if backend_config.auth.is_none() {
        tracing::warn!(path = %config.outputs_path.display(), "no hosted sign-in configured; /auth/login will return 503");
    }

    let backend = backend::BackendClient::new(backend_config, config.timeouts).expect("backend client init failed");
    tracing::info!(data_api = backend.has_data_api(), "backend client ready");
    let sessions = services::session::SessionStore::with_limits(config.sessions);
    let _sweeper = services::session::spawn_session_sweeper(sessions.clone(), config.sessions);
    let state = state::AppState::new(Arc::new(backend), sessions);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "profileboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
