//! Identity and profile record types.
//!
//! DESIGN
//! ======
//! Both shapes arrive untyped from external services (userinfo claims, list
//! query items). They are pinned down here with explicit optional fields so
//! the loader and the view never probe JSON by hand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Username given to the synthesized profile when the identity has neither a
/// display name nor an email.
pub const UNKNOWN_USERNAME: &str = "unknown";

// =============================================================================
// IDENTITY
// =============================================================================

/// The signed-in user's minimal attribute set, as reported by the identity
/// provider. Read-only to this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Every claim the provider returned, verbatim.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Identity {
    /// Build an identity from userinfo claims.
    ///
    /// The display name comes from `username`, then `cognito:username`, then
    /// `preferred_username`. Claims promoted to `username` or `email` are
    /// removed; every other claim is kept as an attribute.
    #[must_use]
    pub fn from_claims(mut claims: Map<String, Value>) -> Self {
        let username = ["username", "cognito:username", "preferred_username"]
            .into_iter()
            .find_map(|key| take_string(&mut claims, key));
        let email = take_string(&mut claims, "email");
        Self { username, email, attributes: claims }
    }

    /// First non-empty of display name and email.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        [self.username.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}

/// Remove `key` only if it holds a string.
fn take_string(claims: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !claims.get(key).is_some_and(Value::is_string) {
        return None;
    }
    match claims.remove(key) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

// =============================================================================
// PROFILE RECORD
// =============================================================================

/// One card's worth of data: a username plus an open attribute mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ProfileRecord {
    #[must_use]
    pub fn new(username: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self { username: username.into(), attributes }
    }

    /// Convert a raw list item without validating it.
    ///
    /// - `username`: taken when it is a string, else empty.
    /// - `attributes`: an object is used as-is; a string holding a JSON
    ///   object is decoded. Any other value is kept under `attributes`
    ///   alongside the remaining item fields; when it is missing or null the
    ///   remaining fields alone become the attributes.
    #[must_use]
    pub fn from_item(item: Value) -> Self {
        let mut fields = match item {
            Value::Object(fields) => fields,
            other => {
                let mut wrapped = Map::new();
                wrapped.insert("value".to_owned(), other);
                return Self { username: String::new(), attributes: wrapped };
            }
        };

        let username = match fields.remove("username") {
            Some(Value::String(name)) => name,
            _ => String::new(),
        };

        let attributes = match fields.remove("attributes") {
            Some(Value::Object(map)) => map,
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => {
                    fields.insert("attributes".to_owned(), Value::String(raw));
                    fields
                }
            },
            None | Some(Value::Null) => fields,
            Some(other) => {
                fields.insert("attributes".to_owned(), other);
                fields
            }
        };

        Self { username, attributes }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
