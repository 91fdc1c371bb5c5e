use crate::app_config::{AppConfig, Environment, StoreConfig};
use crate::ConfigError;

const DEFAULT_API_VERSION: &str = "2023-01-01";
const MIN_SESSION_SECRET_LEN: usize = 32;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the document store settings (after loading `.env`).
///
/// Operator tooling needs the store but not the admin credentials.
///
/// # Errors
///
/// Returns `ConfigError` if required store env vars are missing or invalid.
pub fn load_store_config() -> Result<StoreConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_store_config(&|key: &str| std::env::var(key))
}

fn required<F>(lookup: &F, var: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(var.to_string())),
    }
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup(var).unwrap_or_else(|_| default.to_string())
}

fn parse_or_default<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = or_default(lookup, var, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn build_store_config<F>(lookup: &F) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let project_id = required(lookup, "SHOPDESK_STORE_PROJECT_ID")?;
    let dataset = required(lookup, "SHOPDESK_STORE_DATASET")?;
    let token = required(lookup, "SHOPDESK_STORE_TOKEN")?;
    let api_version = or_default(lookup, "SHOPDESK_STORE_API_VERSION", DEFAULT_API_VERSION)
        .trim_start_matches('v')
        .to_owned();
    let api_host = lookup("SHOPDESK_STORE_API_HOST")
        .ok()
        .filter(|h| !h.trim().is_empty());

    Ok(StoreConfig {
        project_id,
        dataset,
        api_version,
        token,
        api_host,
        timeout_secs: parse_or_default(lookup, "SHOPDESK_STORE_TIMEOUT_SECS", "30")?,
        max_retries: parse_or_default(lookup, "SHOPDESK_STORE_MAX_RETRIES", "2")?,
        retry_backoff_base_ms: parse_or_default(
            lookup,
            "SHOPDESK_STORE_RETRY_BACKOFF_BASE_MS",
            "500",
        )?,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let store = build_store_config(&lookup)?;

    let env = parse_environment(&or_default(&lookup, "SHOPDESK_ENV", "development"))?;
    let bind_addr = parse_or_default(&lookup, "SHOPDESK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default(&lookup, "SHOPDESK_LOG_LEVEL", "info");

    let admin_email = required(&lookup, "SHOPDESK_ADMIN_EMAIL")?
        .trim()
        .to_lowercase();
    let admin_password_salt = required(&lookup, "SHOPDESK_ADMIN_PASSWORD_SALT")?;
    let admin_password_sha256 = required(&lookup, "SHOPDESK_ADMIN_PASSWORD_SHA256")?
        .trim()
        .to_lowercase();
    if admin_password_sha256.len() != 64
        || !admin_password_sha256.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPDESK_ADMIN_PASSWORD_SHA256".to_string(),
            reason: "expected 64 hex characters".to_string(),
        });
    }

    let session_secret = required(&lookup, "SHOPDESK_SESSION_SECRET")?;
    if session_secret.len() < MIN_SESSION_SECRET_LEN {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPDESK_SESSION_SECRET".to_string(),
            reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
        });
    }
    let session_ttl_secs = parse_or_default(&lookup, "SHOPDESK_SESSION_TTL_SECS", "3600")?;
    let rate_limit_per_minute =
        parse_or_default(&lookup, "SHOPDESK_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store,
        admin_email,
        admin_password_salt,
        admin_password_sha256,
        session_secret,
        session_ttl_secs,
        rate_limit_per_minute,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPDESK_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
