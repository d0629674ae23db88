//! Profile loader: fetch-or-fallback state machine for the profile grid.
//!
//! DESIGN
//! ======
//! Two states: `Empty` until the first load completes, then `Loaded` with the
//! last applied list. A load is triggered by an identity change reported by
//! the session gate (the first sync counts as one: initial mount).
//!
//! A load never fails. If a data capability is present it is asked once; any
//! error is logged and the loader falls back to a single record synthesized
//! from the identity. No retries, no timeout of its own.
//!
//! ORDERING
//! ========
//! Each load takes a sequence number when it starts. On completion the result
//! is written only if that number is still the latest issued, so a slow,
//! older request can never overwrite a newer one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::ProfileSource;
use crate::model::{Identity, ProfileRecord, UNKNOWN_USERNAME};
use crate::services::session::IdentityWatch;

// =============================================================================
// FETCH OR FALLBACK
// =============================================================================

/// Synthesize the single-record list entry from the signed-in identity.
#[must_use]
pub fn fallback_profile(identity: Option<&Identity>) -> ProfileRecord {
    let username = identity
        .and_then(Identity::display_name)
        .unwrap_or(UNKNOWN_USERNAME);
    let attributes = identity.map(|i| i.attributes.clone()).unwrap_or_default();
    ProfileRecord::new(username, attributes)
}

/// Ask the data capability for every profile, falling back to the identity.
///
/// Always returns a list. Errors from `source` are logged and swallowed.
pub async fn fetch_profiles(source: Option<&dyn ProfileSource>, identity: Option<&Identity>) -> Vec<ProfileRecord> {
    if let Some(source) = source {
        match source.list_profiles().await {
            Ok(response) => return response.items.unwrap_or_default(),
            Err(e) => tracing::error!(error = %e, "profile list fetch failed; using signed-in identity"),
        }
    }
    vec![fallback_profile(identity)]
}

// =============================================================================
// LOADER STATE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProfileState {
    #[default]
    Empty,
    Loaded(Vec<ProfileRecord>),
}

impl ProfileState {
    #[must_use]
    pub fn profiles(&self) -> &[ProfileRecord] {
        match self {
            Self::Empty => &[],
            Self::Loaded(profiles) => profiles,
        }
    }
}

// =============================================================================
// LOADER
// =============================================================================

pub struct ProfileLoader {
    source: Option<Arc<dyn ProfileSource>>,
    identity: Mutex<IdentityWatch>,
    mounted: AtomicBool,
    issued: AtomicU64,
    /// Written only by `apply`, under this lock.
    state: Mutex<ProfileState>,
}

impl ProfileLoader {
    /// A loader in the `Empty` state that follows `identity` for changes.
    #[must_use]
    pub fn new(source: Option<Arc<dyn ProfileSource>>, identity: IdentityWatch) -> Self {
        Self {
            source,
            identity: Mutex::new(identity),
            mounted: AtomicBool::new(false),
            issued: AtomicU64::new(0),
            state: Mutex::new(ProfileState::Empty),
        }
    }

    #[must_use]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Load if this is the first sync or the identity changed since the last
    /// one. Returns whether a load ran and its result was applied.
    pub async fn sync(&self) -> bool {
        let pending = {
            let mut watch = self.identity.lock().unwrap_or_else(PoisonError::into_inner);
            let first = !self.mounted.swap(true, Ordering::SeqCst);
            // A dropped gate counts as no change; the last identity stays.
            let changed = watch.has_changed().unwrap_or(false);
            (first || changed).then(|| watch.borrow_and_update().clone())
        };

        match pending {
            Some(identity) => self.load(identity.as_deref()).await,
            None => false,
        }
    }

    /// Run one fetch-or-fallback cycle for `identity`.
    ///
    /// Returns `true` if the result was applied, `false` if a newer load was
    /// issued while this one was in flight.
    pub async fn load(&self, identity: Option<&Identity>) -> bool {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let profiles = fetch_profiles(self.source.as_deref(), identity).await;
        self.apply(seq, profiles)
    }

    fn apply(&self, seq: u64, profiles: Vec<ProfileRecord>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let latest = self.issued.load(Ordering::SeqCst);
        if seq != latest {
            tracing::debug!(seq, latest, "discarding stale profile load");
            return false;
        }
        *state = ProfileState::Loaded(profiles);
        true
    }

    #[must_use]
    pub fn state(&self) -> ProfileState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Snapshot of the current list; empty before the first load.
    #[must_use]
    pub fn profiles(&self) -> Vec<ProfileRecord> {
        self.state().profiles().to_vec()
    }
}

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;
