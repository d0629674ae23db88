//! GraphQL implementation of the profile list capability.
//!
//! DESIGN
//! ======
//! One POST per call: `query ListProfiles { <field> { items { <selection> } } }`.
//! The session's current access token goes in the `Authorization` header as
//! the data service expects for user-pool auth (no `Bearer` prefix). Items are
//! converted with [`ProfileRecord::from_item`]; nothing is validated.

use serde::Deserialize;
use serde_json::Value;

use super::BearerToken;
use super::config::DataConfig;
use super::types::{FetchError, ProfileListResponse, ProfileSource};
use crate::model::ProfileRecord;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

pub struct GraphqlProfileSource {
    http: reqwest::Client,
    config: DataConfig,
    token: BearerToken,
}

impl GraphqlProfileSource {
    #[must_use]
    pub fn new(http: reqwest::Client, config: DataConfig, token: BearerToken) -> Self {
        Self { http, config, token }
    }

    /// The query document sent on every call.
    #[must_use]
    pub fn query(&self) -> String {
        build_query(&self.config.list_field, &self.config.list_selection)
    }
}

#[async_trait::async_trait]
impl ProfileSource for GraphqlProfileSource {
    async fn list_profiles(&self) -> Result<ProfileListResponse, FetchError> {
        let resp = self
            .http
            .post(self.config.url.clone())
            .header("Authorization", self.token.get())
            .json(&serde_json::json!({ "query": self.query() }))
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        let body = resp.text().await.map_err(|e| FetchError::Request(e.to_string()))?;
        parse_list_response(&body, &self.config.list_field)
    }
}

pub(crate) fn build_query(field: &str, selection: &str) -> String {
    format!("query ListProfiles {{ {field} {{ items {{ {selection} }} }} }}")
}

/// Pull `data.<field>.items` out of a GraphQL response body.
pub(crate) fn parse_list_response(body: &str, field: &str) -> Result<ProfileListResponse, FetchError> {
    let parsed: GraphqlResponse = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if !parsed.errors.is_empty() {
        let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(FetchError::Graphql(messages.join("; ")));
    }

    let items = parsed
        .data
        .as_ref()
        .and_then(|data| data.get(field))
        .and_then(|list| list.get("items"))
        .and_then(Value::as_array);

    let Some(items) = items else {
        tracing::debug!(field, "list response carried no items field");
        return Ok(ProfileListResponse::default());
    };

    Ok(ProfileListResponse::with_items(
        items.iter().cloned().map(ProfileRecord::from_item).collect(),
    ))
}

#[cfg(test)]
#[path = "graphql_test.rs"]
mod tests;
