use super::*;
use crate::backend::BackendConfig;
use crate::config::HttpTimeouts;

fn tokens(expires_in: Option<u64>, refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: "access-1".into(),
        refresh_token: refresh_token.map(str::to_owned),
        expires_in,
    }
}

fn alice() -> Identity {
    Identity { username: Some("alice".into()), ..Identity::default() }
}

fn session(expires_in: Option<u64>, refresh_token: Option<&str>) -> Session {
    Session::new(alice(), &tokens(expires_in, refresh_token), BearerToken::new("access-1"), None)
}

// =============================================================================
// bytes_to_hex / generate_token
// =============================================================================

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// SessionGate
// =============================================================================

#[test]
fn gate_exposes_initial_identity() {
    let identity = Arc::new(alice());
    let gate = SessionGate::new(Some(identity.clone()));
    assert!(Arc::ptr_eq(&gate.identity().unwrap(), &identity));
}

#[test]
fn gate_same_reference_is_not_a_change() {
    let identity = Arc::new(alice());
    let gate = SessionGate::new(Some(identity.clone()));
    let rx = gate.subscribe();
    assert!(!gate.set_identity(Some(identity)));
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn gate_equal_but_new_identity_is_a_change() {
    let gate = SessionGate::new(Some(Arc::new(alice())));
    let rx = gate.subscribe();
    assert!(gate.set_identity(Some(Arc::new(alice()))));
    assert!(rx.has_changed().unwrap());
}

#[test]
fn gate_sign_out_clears_and_notifies_once() {
    let gate = SessionGate::new(Some(Arc::new(alice())));
    let mut rx = gate.subscribe();
    assert!(gate.sign_out());
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_none());
    assert!(gate.identity().is_none());

    assert!(!gate.sign_out());
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn gate_works_without_subscribers() {
    let gate = SessionGate::new(None);
    assert!(gate.set_identity(Some(Arc::new(alice()))));
    assert_eq!(gate.identity().unwrap().username.as_deref(), Some("alice"));
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn session_without_expiry_never_expires() {
    assert!(!session(None, None).is_expired());
}

#[test]
fn session_with_future_expiry_is_fresh() {
    assert!(!session(Some(3600), None).is_expired());
}

#[test]
fn session_expiry_shorter_than_skew_is_already_expired() {
    assert!(session(Some(5), None).is_expired());
}

#[test]
fn session_exposes_access_token() {
    assert_eq!(session(None, None).access_token(), "access-1");
}

#[tokio::test]
async fn refresh_skipped_when_fresh() {
    let backend = BackendClient::new(BackendConfig::default(), HttpTimeouts::default()).unwrap();
    let refreshed = session(Some(3600), Some("r")).refresh_if_expired(&backend).await.unwrap();
    assert!(!refreshed);
}

#[tokio::test]
async fn refresh_without_auth_config_fails() {
    let backend = BackendClient::new(BackendConfig::default(), HttpTimeouts::default()).unwrap();
    let s = session(Some(3600), Some("r"));
    s.force_expired();
    let err = s.refresh_if_expired(&backend).await.unwrap_err();
    assert!(matches!(err, AuthError::NotConfigured));
}

#[tokio::test]
async fn refresh_without_refresh_token_fails() {
    let config = BackendConfig {
        auth: Some(crate::services::auth::HostedAuthConfig {
            client_id: "c".into(),
            client_secret: None,
            domain: reqwest::Url::parse("https://auth.invalid").unwrap(),
            redirect_uri: "http://localhost/auth/callback".into(),
            sign_out_uri: None,
            scopes: vec![],
        }),
        data: None,
    };
    let backend = BackendClient::new(config, HttpTimeouts::default()).unwrap();
    let s = session(None, None);
    s.force_expired();
    let err = s.refresh_if_expired(&backend).await.unwrap_err();
    assert!(matches!(err, AuthError::Refresh(_)));
}

// =============================================================================
// SessionStore
// =============================================================================

#[tokio::test]
async fn store_insert_get_remove() {
    let store = SessionStore::new();
    let token = store.insert(session(None, None)).await;
    assert_eq!(token.len(), 64);
    assert_eq!(store.count().await, 1);

    let found = store.get(&token).await.unwrap();
    assert_eq!(found.gate.identity().unwrap().username.as_deref(), Some("alice"));

    assert!(store.remove(&token).await.is_some());
    assert!(store.get(&token).await.is_none());
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn store_clones_share_sessions() {
    let store = SessionStore::new();
    let other = store.clone();
    let token = store.insert(session(None, None)).await;
    assert!(other.get(&token).await.is_some());
}

#[tokio::test]
async fn store_unknown_token_is_none() {
    assert!(SessionStore::new().get("nope").await.is_none());
}

// =============================================================================
// Eviction
// =============================================================================

const HOUR: Duration = Duration::from_secs(60 * 60);

#[test]
fn fresh_session_is_not_evictable() {
    assert!(!session(None, None).is_evictable(Instant::now(), HOUR));
}

#[test]
fn expired_session_without_refresh_token_is_evictable() {
    assert!(session(Some(0), None).is_evictable(Instant::now(), HOUR));
}

#[test]
fn expired_session_with_refresh_token_is_kept() {
    assert!(!session(Some(0), Some("refresh-1")).is_evictable(Instant::now(), HOUR));
}

#[test]
fn idle_session_is_evictable_even_if_refreshable() {
    let s = session(None, Some("refresh-1"));
    s.force_idle_for(2 * HOUR);
    assert!(s.is_evictable(Instant::now(), HOUR));
}

#[test]
fn signed_out_session_is_evictable() {
    let s = session(None, None);
    s.gate.sign_out();
    assert!(s.is_evictable(Instant::now(), HOUR));
}

#[tokio::test]
async fn sweep_drops_only_evictable_sessions() {
    let store = SessionStore::new();
    let kept = store.insert(session(None, None)).await;
    let refreshable = store.insert(session(Some(0), Some("refresh-1"))).await;
    let expired = store.insert(session(Some(0), None)).await;

    assert_eq!(store.sweep().await, 1);
    assert!(store.get(&kept).await.is_some());
    assert!(store.get(&refreshable).await.is_some());
    assert!(store.get(&expired).await.is_none());
}

#[tokio::test]
async fn insert_sweeps_abandoned_sessions() {
    let store = SessionStore::new();
    let abandoned = store.insert(session(Some(0), None)).await;
    assert_eq!(store.count().await, 1);

    let fresh = store.insert(session(None, None)).await;
    assert_eq!(store.count().await, 1);
    assert!(store.get(&abandoned).await.is_none());
    assert!(store.get(&fresh).await.is_some());
}

#[tokio::test]
async fn sweep_uses_configured_idle_ttl() {
    let store = SessionStore::with_limits(SessionLimits { idle_secs: 60, sweep_secs: 1 });
    let token = store.insert(session(None, None)).await;
    store.get(&token).await.unwrap().force_idle_for(Duration::from_secs(120));

    assert_eq!(store.sweep().await, 1);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn get_refreshes_last_seen() {
    let store = SessionStore::with_limits(SessionLimits { idle_secs: 60, sweep_secs: 1 });
    let token = store.insert(session(None, None)).await;
    let s = store.get(&token).await.unwrap();
    s.force_idle_for(Duration::from_secs(120));

    assert!(store.get(&token).await.is_some());
    assert_eq!(store.sweep().await, 0);
}

#[tokio::test]
async fn sweeper_task_evicts_on_interval() {
    let limits = SessionLimits { idle_secs: 3600, sweep_secs: 1 };
    let store = SessionStore::with_limits(limits);
    let token = store.insert(session(None, None)).await;
    let handle = spawn_session_sweeper(store.clone(), limits);

    store.get(&token).await.unwrap().gate.sign_out();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(store.count().await, 0);
    handle.abort();
}
