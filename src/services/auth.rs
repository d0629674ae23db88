//! Hosted identity provider: authorize URL, code exchange, token refresh,
//! userinfo fetch.
//!
//! The provider speaks plain OAuth 2.0 / OIDC on its hosted-UI domain:
//! `/oauth2/authorize`, `/oauth2/token`, `/oauth2/userInfo`, `/logout`.

use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::Identity;

/// Scopes requested when the outputs file lists none.
const DEFAULT_SCOPES: &[&str] = &["openid", "email", "profile"];

/// Hosted-UI configuration taken from the backend outputs file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedAuthConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    /// Hosted-UI base URL, always with a scheme.
    pub domain: Url,
    pub redirect_uri: String,
    pub sign_out_uri: Option<String>,
    pub scopes: Vec<String>,
}

impl HostedAuthConfig {
    /// Build the provider authorization URL carrying the CSRF `state`.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        let scope = if self.scopes.is_empty() { DEFAULT_SCOPES.join(" ") } else { self.scopes.join(" ") };
        let mut url = self.endpoint("/oauth2/authorize");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &scope)
            .append_pair("state", state);
        url.into()
    }

    /// Provider sign-out URL, or `None` when no sign-out redirect is configured.
    #[must_use]
    pub fn logout_url(&self) -> Option<String> {
        let logout_uri = self.sign_out_uri.as_deref()?;
        let mut url = self.endpoint("/logout");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("logout_uri", logout_uri);
        Some(url.into())
    }

    #[must_use]
    pub fn token_url(&self) -> Url {
        self.endpoint("/oauth2/token")
    }

    #[must_use]
    pub fn userinfo_url(&self) -> Url {
        self.endpoint("/oauth2/userInfo")
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.domain.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("hosted sign-in is not configured")]
    NotConfigured,
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("token refresh failed: {0}")]
    Refresh(String),
    #[error("userinfo request failed: {0}")]
    UserInfo(String),
}

/// Exchange an authorization code for provider tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &HostedAuthConfig,
    code: &str,
) -> Result<TokenResponse, AuthError> {
    let form = [
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];
    request_tokens(http, config, &form)
        .await
        .map_err(AuthError::TokenExchange)
}

/// Trade a refresh token for a new access token. Providers usually omit a new
/// refresh token here, so callers should keep the old one.
pub async fn refresh_tokens(
    http: &reqwest::Client,
    config: &HostedAuthConfig,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", config.client_id.as_str()),
        ("refresh_token", refresh_token),
    ];
    request_tokens(http, config, &form).await.map_err(AuthError::Refresh)
}

async fn request_tokens(
    http: &reqwest::Client,
    config: &HostedAuthConfig,
    form: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let mut req = http
        .post(config.token_url())
        .header("Accept", "application/json")
        .form(form);
    if let Some(secret) = &config.client_secret {
        req = req.basic_auth(&config.client_id, Some(secret));
    }

    let resp = req.send().await.map_err(|e| e.to_string())?;
    let status = resp.status();
    let body = resp.text().await.map_err(|e| e.to_string())?;
    if !status.is_success() {
        return Err(format!("{status}: {body}"));
    }
    serde_json::from_str::<TokenResponse>(&body).map_err(|_| format!("unexpected response: {body}"))
}

/// Fetch the signed-in user's claims and build an [`Identity`].
pub async fn fetch_identity(
    http: &reqwest::Client,
    config: &HostedAuthConfig,
    access_token: &str,
) -> Result<Identity, AuthError> {
    let resp = http
        .get(config.userinfo_url())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::UserInfo(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::UserInfo(format!("{status}: {body}")));
    }

    let claims = resp
        .json::<Map<String, Value>>()
        .await
        .map_err(|e| AuthError::UserInfo(e.to_string()))?;
    Ok(Identity::from_claims(claims))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
