use super::*;

// =============================================================================
// env_bool: uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_PB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_PB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_case_insensitive_and_trimmed() {
    let key = "__TEST_PB_CI_311__";
    unsafe { std::env::set_var(key, "  On ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__TEST_PB_INVALID_312__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_PB_SURELY_UNSET_313__"), None);
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_reads_value() {
    let key = "__TEST_PB_PARSE_321__";
    unsafe { std::env::set_var(key, " 42 ") };
    assert_eq!(env_parse(key, 7_u64), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_PB_PARSE_322__";
    unsafe { std::env::set_var(key, "forty-two") };
    assert_eq!(env_parse(key, 7_u64), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse("__TEST_PB_PARSE_UNSET_323__", 9_u16), 9);
}

// =============================================================================
// AppConfig::from_env: touches shared variable names, so everything that
// reads them lives in one test.
// =============================================================================

/// # Safety
/// Only called from the single test below.
unsafe fn clear_app_env() {
    unsafe {
        for key in [
            "PORT",
            "BACKEND_OUTPUTS_PATH",
            "AUTH_CLIENT_SECRET",
            "PROFILE_LIST_FIELD",
            "PROFILE_LIST_SELECTION",
            "BACKEND_REQUEST_TIMEOUT_SECS",
            "BACKEND_CONNECT_TIMEOUT_SECS",
            "SESSION_IDLE_SECS",
            "SESSION_SWEEP_SECS",
        ] {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn from_env_defaults_overrides_and_bad_port() {
    unsafe { clear_app_env() };
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.outputs_path, PathBuf::from(DEFAULT_OUTPUTS_PATH));
    assert!(cfg.client_secret.is_none());
    assert!(cfg.profile_list_field.is_none());
    assert_eq!(cfg.profile_list_selection, DEFAULT_PROFILE_LIST_SELECTION);
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
    assert_eq!(cfg.sessions, SessionLimits::default());

    unsafe {
        std::env::set_var("PORT", "8080");
        std::env::set_var("BACKEND_OUTPUTS_PATH", "/etc/app/outputs.json");
        std::env::set_var("AUTH_CLIENT_SECRET", "shh");
        std::env::set_var("PROFILE_LIST_FIELD", "listUserProfiles");
        std::env::set_var("PROFILE_LIST_SELECTION", "id username");
        std::env::set_var("BACKEND_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("BACKEND_CONNECT_TIMEOUT_SECS", "2");
        std::env::set_var("SESSION_IDLE_SECS", "600");
        std::env::set_var("SESSION_SWEEP_SECS", "0");
    }
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.outputs_path, PathBuf::from("/etc/app/outputs.json"));
    assert_eq!(cfg.client_secret.as_deref(), Some("shh"));
    assert_eq!(cfg.profile_list_field.as_deref(), Some("listUserProfiles"));
    assert_eq!(cfg.profile_list_selection, "id username");
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.sessions, SessionLimits { idle_secs: 600, sweep_secs: 1 });

    unsafe { std::env::set_var("PORT", "not-a-port") };
    let err = AppConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("PORT"));

    unsafe { clear_app_env() };
}
