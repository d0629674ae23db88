//! Backend outputs file parsing.
//!
//! The hosting toolchain writes a JSON document describing the provisioned
//! user pool and data API. Only the fields this app uses are modeled; unknown
//! keys are ignored.

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use crate::config::{AppConfig, ConfigError};
use crate::services::auth::HostedAuthConfig;

// =============================================================================
// RAW OUTPUTS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendOutputs {
    #[serde(default)]
    pub auth: Option<AuthOutputs>,
    #[serde(default)]
    pub data: Option<DataOutputs>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthOutputs {
    pub user_pool_client_id: String,
    #[serde(default)]
    pub oauth: Option<OAuthOutputs>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthOutputs {
    pub domain: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub redirect_sign_in_uri: Vec<String>,
    #[serde(default)]
    pub redirect_sign_out_uri: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataOutputs {
    pub url: String,
}

// =============================================================================
// TYPED CONFIG
// =============================================================================

/// Settings for the optional profile list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub url: Url,
    pub list_field: String,
    pub list_selection: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    /// `None` when the outputs carry no hosted-UI section; sign-in is disabled.
    pub auth: Option<HostedAuthConfig>,
    /// `None` when there is no data URL or no list field configured.
    pub data: Option<DataConfig>,
}

impl BackendConfig {
    /// Read and validate the outputs file named by `app.outputs_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// carries malformed URLs.
    pub fn load(app: &AppConfig) -> Result<Self, ConfigError> {
        let raw = read_outputs(&app.outputs_path)?;
        let outputs: BackendOutputs = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_outputs(outputs, app)
    }

    /// Validate parsed outputs against the process config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unparseable URLs or a hosted-UI
    /// section without a sign-in redirect.
    pub fn from_outputs(outputs: BackendOutputs, app: &AppConfig) -> Result<Self, ConfigError> {
        let auth = match outputs.auth {
            Some(AuthOutputs { user_pool_client_id, oauth: Some(oauth) }) => Some(HostedAuthConfig {
                client_id: user_pool_client_id,
                client_secret: app.client_secret.clone(),
                domain: parse_domain(&oauth.domain)?,
                redirect_uri: oauth
                    .redirect_sign_in_uri
                    .into_iter()
                    .next()
                    .ok_or_else(|| ConfigError::Invalid("auth.oauth.redirect_sign_in_uri is empty".into()))?,
                sign_out_uri: oauth.redirect_sign_out_uri.into_iter().next(),
                scopes: oauth.scopes,
            }),
            Some(AuthOutputs { oauth: None, .. }) | None => None,
        };

        let data = match (outputs.data, app.profile_list_field.as_deref()) {
            (Some(data), Some(field)) => Some(DataConfig {
                url: Url::parse(&data.url).map_err(|e| ConfigError::Invalid(format!("data.url: {e}")))?,
                list_field: field.to_owned(),
                list_selection: app.profile_list_selection.clone(),
            }),
            _ => None,
        };

        Ok(Self { auth, data })
    }
}

fn read_outputs(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read { path: path.display().to_string(), message: e.to_string() })
}

/// Hosted-UI domains are published without a scheme; assume HTTPS.
fn parse_domain(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") { trimmed.to_owned() } else { format!("https://{trimmed}") };
    Url::parse(&with_scheme).map_err(|e| ConfigError::Invalid(format!("auth.oauth.domain: {e}")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
