//! Page and JSON routes for the profile grid.
//!
//! Every request is one render cycle: the session's loader syncs with its
//! gate (loading on first visit or after an identity change), then the
//! current list is rendered.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};

use super::auth::AuthSession;
use crate::model::ProfileRecord;
use crate::state::AppState;
use crate::view;

/// `GET /`: profile page, or a redirect to `/login` when signed out.
pub async fn profile_page(auth: Result<AuthSession, StatusCode>) -> Response {
    let Ok(auth) = auth else {
        return Redirect::to("/login").into_response();
    };

    auth.session.loader.sync().await;
    let profiles = auth.session.loader.profiles();
    Html(view::render_profile_page(Some(auth.identity.as_ref()), &profiles)).into_response()
}

/// `GET /login`: sign-in page.
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(view::render_login_page(state.backend.auth().is_some()))
}

/// `GET /api/profiles`: the current profile list as JSON.
pub async fn list_profiles(auth: AuthSession) -> Json<Vec<ProfileRecord>> {
    auth.session.loader.sync().await;
    Json(auth.session.loader.profiles())
}

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;
