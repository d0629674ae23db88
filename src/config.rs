//! Process configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present), builds an [`AppConfig`] once, and hands
//! it to the backend initialization step. Nothing else reads the environment
//! at startup except the cookie `Secure` toggle in `routes::auth`.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OUTPUTS_PATH: &str = "amplify_outputs.json";
pub const DEFAULT_PROFILE_LIST_SELECTION: &str = "username attributes";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 12 * 60 * 60;
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 5 * 60;

/// Errors raised while assembling startup configuration. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse backend outputs: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    Invalid(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// How long an unused session survives, and how often the store is swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_secs: u64,
    pub sweep_secs: u64,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { idle_secs: DEFAULT_SESSION_IDLE_SECS, sweep_secs: DEFAULT_SESSION_SWEEP_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Path of the backend outputs JSON written by the hosting toolchain.
    pub outputs_path: PathBuf,
    /// Confidential app clients need a secret for the token endpoint.
    pub client_secret: Option<String>,
    /// GraphQL list field; the data capability is disabled when unset.
    pub profile_list_field: Option<String>,
    pub profile_list_selection: String,
    pub timeouts: HttpTimeouts,
    pub sessions: SessionLimits,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BACKEND_OUTPUTS_PATH`: default `amplify_outputs.json`
    /// - `AUTH_CLIENT_SECRET`
    /// - `PROFILE_LIST_FIELD`: e.g. `listUserProfiles`
    /// - `PROFILE_LIST_SELECTION`: default `username attributes`
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SESSION_IDLE_SECS`: default 43200
    /// - `SESSION_SWEEP_SECS`: default 300
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `PORT` is set but not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env_non_empty("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid(format!("PORT must be a port number, got {raw:?}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            outputs_path: env_non_empty("BACKEND_OUTPUTS_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_OUTPUTS_PATH), PathBuf::from),
            client_secret: env_non_empty("AUTH_CLIENT_SECRET"),
            profile_list_field: env_non_empty("PROFILE_LIST_FIELD"),
            profile_list_selection: env_non_empty("PROFILE_LIST_SELECTION")
                .unwrap_or_else(|| DEFAULT_PROFILE_LIST_SELECTION.to_owned()),
            timeouts: HttpTimeouts {
                request_secs: env_parse("BACKEND_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("BACKEND_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            sessions: SessionLimits {
                idle_secs: env_parse("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS),
                sweep_secs: env_parse("SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS).max(1),
            },
        })
    }
}

/// Parse a boolean flag: `1/true/yes/on` or `0/false/no/off`, case-insensitive.
pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
