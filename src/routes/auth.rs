//! Auth routes: hosted sign-in redirect, callback, sign-out, current identity.

use std::sync::Arc;

use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::CookieBuilder;
use serde::Deserialize;
use time::Duration;

use crate::backend::BearerToken;
use crate::config::env_bool;
use crate::model::Identity;
use crate::services::auth::{self as auth_svc, HostedAuthConfig};
use crate::services::session::{self, Session};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
pub(crate) const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// Where signed-out browsers land when the provider has no logout redirect.
const LOGIN_PATH: &str = "/login";

/// `COOKIE_SECURE` wins; otherwise cookies are `Secure` when the sign-in
/// redirect is served over https.
pub(crate) fn cookie_secure(auth: Option<&HostedAuthConfig>) -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }
    auth.is_some_and(|config| config.redirect_uri.starts_with("https://"))
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> CookieBuilder<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
}

fn expired_cookie(name: &'static str, secure: bool) -> CookieBuilder<'static> {
    base_cookie(name, String::new(), secure).max_age(Duration::ZERO)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Signed-in session extracted from the session cookie.
/// Use as a handler parameter to require authentication.
///
/// Expired provider tokens are refreshed here; a failed refresh ends the
/// session and rejects the request.
pub struct AuthSession {
    pub session: Arc<Session>,
    pub identity: Arc<Identity>,
}

impl<S> axum::extract::FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let session = app_state
            .sessions
            .get(token)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if let Err(e) = session.refresh_if_expired(&app_state.backend).await {
            tracing::warn!(error = %e, "session refresh failed; signing out");
            session.gate.sign_out();
            app_state.sessions.remove(token).await;
            return Err(StatusCode::UNAUTHORIZED);
        }

        let identity = session.gate.identity().ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(Self { session, identity })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth/login`: redirect to the hosted sign-in page.
pub async fn login_redirect(State(state): State<AppState>) -> Response {
    let Some(config) = state.backend.auth() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "hosted sign-in not configured").into_response();
    };

    let oauth_state = session::generate_token();
    let cookie = base_cookie(OAUTH_STATE_COOKIE_NAME, oauth_state.clone(), cookie_secure(Some(config)))
        .max_age(Duration::minutes(10));

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(&config.authorize_url(&oauth_state))).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/callback`: exchange code, fetch identity, open a session,
/// set cookie, redirect to `/`.
pub async fn callback(State(state): State<AppState>, jar: CookieJar, Query(params): Query<CallbackQuery>) -> Response {
    let Some(config) = state.backend.auth() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "hosted sign-in not configured").into_response();
    };
    let secure = cookie_secure(Some(config));

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(%error, "provider returned sign-in error");
        return callback_failure(jar, secure, StatusCode::UNAUTHORIZED, "sign-in was not completed");
    }

    // Verify OAuth CSRF state from cookie.
    let Some(callback_state) = params.state.as_deref() else {
        return callback_failure(jar, secure, StatusCode::BAD_REQUEST, "missing oauth state");
    };
    let expected_state = jar.get(OAUTH_STATE_COOKIE_NAME).map(Cookie::value).unwrap_or_default().to_owned();
    if expected_state.is_empty() || expected_state != callback_state {
        return callback_failure(jar, secure, StatusCode::UNAUTHORIZED, "invalid oauth state");
    }
    let Some(code) = params.code.as_deref() else {
        return callback_failure(jar, secure, StatusCode::BAD_REQUEST, "missing authorization code");
    };

    let tokens = match auth_svc::exchange_code(state.backend.http(), config, code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            return callback_failure(jar, secure, StatusCode::BAD_GATEWAY, "sign-in code exchange failed");
        }
    };

    let identity = match auth_svc::fetch_identity(state.backend.http(), config, &tokens.access_token).await {
        Ok(i) => i,
        Err(e) => {
            tracing::error!(error = %e, "userinfo fetch failed");
            return callback_failure(jar, secure, StatusCode::BAD_GATEWAY, "failed to fetch signed-in user");
        }
    };

    let access = BearerToken::new(tokens.access_token.clone());
    let source = state.backend.profile_source(access.clone());
    let session = Session::new(identity, &tokens, access, source);
    let data_api = session.loader.has_source();
    let token = state.sessions.insert(session).await;
    let sessions = state.sessions.count().await;
    tracing::info!(data_api, sessions, "session opened");

    let jar = jar
        .add(base_cookie(COOKIE_NAME, token, secure))
        .add(expired_cookie(OAUTH_STATE_COOKIE_NAME, secure));
    (jar, Redirect::temporary("/")).into_response()
}

/// The state cookie is single-use; every failed callback clears it too.
fn callback_failure(jar: CookieJar, secure: bool, status: StatusCode, message: &'static str) -> Response {
    let jar = jar.add(expired_cookie(OAUTH_STATE_COOKIE_NAME, secure));
    (status, jar, message).into_response()
}

/// `POST /auth/logout`: sign the gate out, drop the session, clear the
/// cookie, then bounce through the provider's logout page when configured.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default().to_owned();
    if !token.is_empty() {
        if let Some(session) = state.sessions.remove(&token).await {
            session.gate.sign_out();
            tracing::info!("session closed");
        }
    }

    let config = state.backend.auth();
    let jar = jar.add(expired_cookie(COOKIE_NAME, cookie_secure(config)));
    let target = config
        .and_then(HostedAuthConfig::logout_url)
        .unwrap_or_else(|| LOGIN_PATH.to_owned());
    (jar, Redirect::to(&target)).into_response()
}

/// `GET /api/auth/me`: return the signed-in identity.
pub async fn me(auth: AuthSession) -> Json<Identity> {
    Json(Identity::clone(&auth.identity))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
