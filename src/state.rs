//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the configured backend client (built once at startup) and the
//! in-memory session store.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::services::session::SessionStore;

/// Clone is required by Axum; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub sessions: SessionStore,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<BackendClient>, sessions: SessionStore) -> Self {
        Self { backend, sessions }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
