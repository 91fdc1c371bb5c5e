use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SHOPDESK_STORE_PROJECT_ID", "abc123xy");
    m.insert("SHOPDESK_STORE_DATASET", "production");
    m.insert("SHOPDESK_STORE_TOKEN", "sk-write-token");
    m.insert("SHOPDESK_ADMIN_EMAIL", "Admin@Example.com");
    m.insert("SHOPDESK_ADMIN_PASSWORD_SALT", "pepper");
    m.insert(
        "SHOPDESK_ADMIN_PASSWORD_SHA256",
        "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
    );
    m.insert(
        "SHOPDESK_SESSION_SECRET",
        "0123456789abcdef0123456789abcdef",
    );
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SHOPDESK_ENV"));
}

#[test]
fn build_app_config_fails_without_project_id() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHOPDESK_STORE_PROJECT_ID"),
        "expected MissingEnvVar(SHOPDESK_STORE_PROJECT_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_store_token() {
    let mut map = full_env();
    map.remove("SHOPDESK_STORE_TOKEN");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHOPDESK_STORE_TOKEN"),
        "expected MissingEnvVar(SHOPDESK_STORE_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_required_var_as_missing() {
    let mut map = full_env();
    map.insert("SHOPDESK_STORE_DATASET", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHOPDESK_STORE_DATASET"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("SHOPDESK_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPDESK_BIND_ADDR"),
        "expected InvalidEnvVar(SHOPDESK_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_short_session_secret() {
    let mut map = full_env();
    map.insert("SHOPDESK_SESSION_SECRET", "too-short");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPDESK_SESSION_SECRET"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_malformed_password_hash() {
    let mut map = full_env();
    map.insert("SHOPDESK_ADMIN_PASSWORD_SHA256", "not-hex");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPDESK_ADMIN_PASSWORD_SHA256"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.admin_email, "admin@example.com");
    assert_eq!(cfg.session_ttl_secs, 3600);
    assert_eq!(cfg.rate_limit_per_minute, 120);
    assert_eq!(cfg.store.project_id, "abc123xy");
    assert_eq!(cfg.store.dataset, "production");
    assert_eq!(cfg.store.api_version, "2023-01-01");
    assert_eq!(cfg.store.timeout_secs, 30);
    assert_eq!(cfg.store.max_retries, 2);
    assert_eq!(cfg.store.retry_backoff_base_ms, 500);
    assert_eq!(cfg.store.api_host(), "https://abc123xy.api.sanity.io");
}

#[test]
fn store_api_version_leading_v_is_stripped() {
    let mut map = full_env();
    map.insert("SHOPDESK_STORE_API_VERSION", "v2024-06-01");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.store.api_version, "2024-06-01");
}

#[test]
fn store_api_host_override_drops_trailing_slash() {
    let mut map = full_env();
    map.insert("SHOPDESK_STORE_API_HOST", "http://127.0.0.1:9999/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.store.api_host(), "http://127.0.0.1:9999");
}

#[test]
fn store_max_retries_invalid() {
    let mut map = full_env();
    map.insert("SHOPDESK_STORE_MAX_RETRIES", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPDESK_STORE_MAX_RETRIES"),
        "got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-write-token"));
    assert!(!rendered.contains("0123456789abcdef0123456789abcdef"));
    assert!(!rendered.contains("pepper"));
    assert!(rendered.contains("[redacted]"));
}
