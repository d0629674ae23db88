//! Session gate and in-memory session store.
//!
//! ARCHITECTURE
//! ============
//! A browser session is a random cookie token mapped to a [`Session`]. Each
//! session owns a [`SessionGate`] (current identity, sign-out) and a
//! [`ProfileLoader`] subscribed to that gate. The gate notifies subscribers
//! only when the identity *reference* changes: sign-in, sign-out, or a token
//! refresh that produced a fresh identity.
//!
//! LIFETIME
//! ========
//! A session is evicted when it has been idle longer than the store's idle
//! TTL, when its gate is signed out, or when its access token has expired and
//! there is no refresh token to renew it. The store sweeps on every insert
//! and on a fixed interval from [`spawn_session_sweeper`].
//!
//! TRADE-OFFS
//! ==========
//! Sessions live in process memory and vanish on restart. The provider still
//! holds the user's real session, so signing in again is a single redirect.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use crate::backend::{BackendClient, BearerToken, ProfileSource};
use crate::config::SessionLimits;
use crate::model::Identity;
use crate::services::auth::{self, AuthError, TokenResponse};
use crate::services::profiles::ProfileLoader;

/// Refresh this long before the provider's stated expiry.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// SESSION GATE
// =============================================================================

/// Receiver side of a gate; yields the identity after each change.
pub type IdentityWatch = watch::Receiver<Option<Arc<Identity>>>;

pub struct SessionGate {
    tx: watch::Sender<Option<Arc<Identity>>>,
}

impl SessionGate {
    #[must_use]
    pub fn new(identity: Option<Arc<Identity>>) -> Self {
        let (tx, _rx) = watch::channel(identity);
        Self { tx }
    }

    /// Current identity; `None` once signed out.
    #[must_use]
    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> IdentityWatch {
        self.tx.subscribe()
    }

    /// Replace the identity. Subscribers are notified only if the new value
    /// is a different allocation (or a different presence) than the old one.
    pub fn set_identity(&self, identity: Option<Arc<Identity>>) -> bool {
        self.tx.send_if_modified(|current| {
            let same = match (current.as_ref(), identity.as_ref()) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same {
                return false;
            }
            *current = identity;
            true
        })
    }

    /// Drop the identity. The provider-side session is ended by the caller
    /// redirecting to the provider's logout page.
    pub fn sign_out(&self) -> bool {
        self.set_identity(None)
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Default)]
struct RefreshState {
    refresh_token: Option<String>,
    expires_at: Option<Instant>,
}

pub struct Session {
    pub gate: SessionGate,
    pub loader: ProfileLoader,
    access: BearerToken,
    refresh: Mutex<RefreshState>,
    last_seen: Mutex<Instant>,
}

impl Session {
    /// Build a session for a freshly signed-in identity. `source` should be
    /// bound to `access` so refreshed tokens reach the data capability.
    #[must_use]
    pub fn new(
        identity: Identity,
        tokens: &TokenResponse,
        access: BearerToken,
        source: Option<Arc<dyn ProfileSource>>,
    ) -> Self {
        let gate = SessionGate::new(Some(Arc::new(identity)));
        let loader = ProfileLoader::new(source, gate.subscribe());
        Self {
            gate,
            loader,
            access,
            refresh: Mutex::new(RefreshState {
                refresh_token: tokens.refresh_token.clone(),
                expires_at: expiry_from(tokens.expires_in),
            }),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    #[cfg(test)]
    pub(crate) fn access_token(&self) -> String {
        self.access.get()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        let refresh = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        refresh.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Whether the store should drop this session: idle past `idle_ttl`,
    /// signed out, or expired with nothing to refresh it.
    #[must_use]
    pub fn is_evictable(&self, now: Instant, idle_ttl: Duration) -> bool {
        let last_seen = *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        if now.saturating_duration_since(last_seen) >= idle_ttl {
            return true;
        }
        if self.gate.identity().is_none() {
            return true;
        }
        let refresh = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        refresh.refresh_token.is_none() && refresh.expires_at.is_some_and(|at| now >= at)
    }

    /// Refresh provider tokens if the access token has expired, then publish
    /// the re-fetched identity through the gate (which triggers a reload).
    ///
    /// # Errors
    ///
    /// Returns an error if there is no refresh token or the provider rejects
    /// it; the caller should end the session.
    pub async fn refresh_if_expired(&self, backend: &BackendClient) -> Result<bool, AuthError> {
        if !self.is_expired() {
            return Ok(false);
        }
        let config = backend.auth().ok_or(AuthError::NotConfigured)?;
        let refresh_token = {
            let refresh = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            refresh.refresh_token.clone()
        }
        .ok_or_else(|| AuthError::Refresh("no refresh token".into()))?;

        let tokens = auth::refresh_tokens(backend.http(), config, &refresh_token).await?;
        let identity = auth::fetch_identity(backend.http(), config, &tokens.access_token).await?;

        self.access.set(tokens.access_token.clone());
        {
            let mut refresh = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            if tokens.refresh_token.is_some() {
                refresh.refresh_token = tokens.refresh_token.clone();
            }
            refresh.expires_at = expiry_from(tokens.expires_in);
        }
        self.gate.set_identity(Some(Arc::new(identity)));
        tracing::info!("session tokens refreshed");
        Ok(true)
    }

    #[cfg(test)]
    pub(crate) fn force_expired(&self) {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner).expires_at = Some(Instant::now());
    }

    #[cfg(test)]
    pub(crate) fn force_idle_for(&self, idle: Duration) {
        let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(earlier) = Instant::now().checked_sub(idle) {
            *last_seen = earlier;
        }
    }
}

fn expiry_from(expires_in: Option<u64>) -> Option<Instant> {
    expires_in.map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_SKEW))
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Token-keyed map of live sessions. Clone shares the same map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SessionLimits::default())
    }
}

impl SessionStore {
    #[cfg(test)]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: SessionLimits) -> Self {
        Self { sessions: Arc::default(), idle_ttl: Duration::from_secs(limits.idle_secs) }
    }

    /// Store a session under a new random token and return the token.
    /// Evictable sessions are swept first.
    pub async fn insert(&self, session: Session) -> String {
        let token = generate_token();
        let mut sessions = self.sessions.write().await;
        let evicted = sweep_locked(&mut sessions, self.idle_ttl);
        if evicted > 0 {
            tracing::debug!(evicted, "swept sessions on insert");
        }
        sessions.insert(token.clone(), Arc::new(session));
        token
    }

    /// Look up a session and mark it as just used.
    pub async fn get(&self, token: &str) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(token).cloned()?;
        session.touch();
        Some(session)
    }

    pub async fn remove(&self, token: &str) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(token)
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every evictable session and return how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        sweep_locked(&mut sessions, self.idle_ttl)
    }
}

fn sweep_locked(sessions: &mut HashMap<String, Arc<Session>>, idle_ttl: Duration) -> usize {
    let now = Instant::now();
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_evictable(now, idle_ttl));
    before - sessions.len()
}

/// Spawn the periodic sweep that keeps abandoned sessions from piling up.
pub fn spawn_session_sweeper(store: SessionStore, limits: SessionLimits) -> JoinHandle<()> {
    let every = Duration::from_secs(limits.sweep_secs.max(1));
    tracing::info!(idle_secs = limits.idle_secs, sweep_secs = limits.sweep_secs, "session sweeper configured");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(every).await;
            let evicted = store.sweep().await;
            if evicted > 0 {
                tracing::info!(evicted, "swept idle or expired sessions");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
