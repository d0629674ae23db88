//! Data capability contract shared by the loader and its implementations.

use crate::model::ProfileRecord;

// =============================================================================
// ERROR
// =============================================================================

/// Any failure of the bulk-list call. The loader handles every variant the
/// same way; the split only makes the diagnostic log useful.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request could not be sent or timed out.
    #[error("list request failed: {0}")]
    Request(String),

    /// The data service returned a non-success HTTP status.
    #[error("list response error: status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("list response parse failed: {0}")]
    Parse(String),

    /// The query executed but reported errors.
    #[error("list query returned errors: {0}")]
    Graphql(String),
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Result of a bulk list. `items` is `None` when the response had no items
/// field at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileListResponse {
    pub items: Option<Vec<ProfileRecord>>,
}

impl ProfileListResponse {
    #[must_use]
    pub fn with_items(items: Vec<ProfileRecord>) -> Self {
        Self { items: Some(items) }
    }
}

// =============================================================================
// PROFILE SOURCE TRAIT
// =============================================================================

/// Optional external operation listing every profile record. Enables mocking
/// in tests.
#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    /// List profile records with no filter and no pagination.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails or the response is
    /// unusable.
    async fn list_profiles(&self) -> Result<ProfileListResponse, FetchError>;
}
