//! Backend client: the configured handle for the hosted auth and data APIs.
//!
//! DESIGN
//! ======
//! Built once in `main` from the backend outputs file and shared through
//! `AppState` behind an `Arc`. It owns the single `reqwest::Client`, the
//! hosted-UI settings, and the optional data endpoint. Sessions ask it for a
//! [`ProfileSource`] bound to their own access token; when no data endpoint
//! is configured they get `None` and the loader falls back.

pub mod config;
pub mod graphql;
pub mod types;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

pub use config::BackendConfig;
use config::DataConfig;
use graphql::GraphqlProfileSource;
pub use types::{FetchError, ProfileListResponse, ProfileSource};

use crate::config::{ConfigError, HttpTimeouts};
use crate::services::auth::HostedAuthConfig;

// =============================================================================
// BEARER TOKEN
// =============================================================================

/// Shared, replaceable access token. A session and its profile source hold
/// clones of the same handle so a token refresh reaches both.
#[derive(Debug, Clone)]
pub struct BearerToken(Arc<RwLock<String>>);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(token.into())))
    }

    #[must_use]
    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = token.into();
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct BackendClient {
    http: reqwest::Client,
    auth: Option<HostedAuthConfig>,
    data: Option<DataConfig>,
}

impl BackendClient {
    /// Build the shared HTTP client and take ownership of the backend config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the TLS backend fails to
    /// initialize.
    pub fn new(config: BackendConfig, timeouts: HttpTimeouts) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, auth: config.auth, data: config.data })
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Hosted-UI settings, or `None` when sign-in is not configured.
    #[must_use]
    pub fn auth(&self) -> Option<&HostedAuthConfig> {
        self.auth.as_ref()
    }

    #[must_use]
    pub fn has_data_api(&self) -> bool {
        self.data.is_some()
    }

    /// The data capability for one session, if the backend exposes one.
    #[must_use]
    pub fn profile_source(&self, token: BearerToken) -> Option<Arc<dyn ProfileSource>> {
        let data = self.data.clone()?;
        Some(Arc::new(GraphqlProfileSource::new(self.http.clone(), data, token)))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
