//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the server-rendered pages, the hosted sign-in
//! endpoints, and two small JSON endpoints. Request tracing and gzip
//! compression wrap every route.

pub mod auth;
pub mod profiles;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(profiles::profile_page))
        .route("/login", get(profiles::login_page))
        .route("/auth/login", get(auth::login_redirect))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/profiles", get(profiles::list_profiles))
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
