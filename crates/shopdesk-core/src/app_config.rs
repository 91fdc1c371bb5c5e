use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection settings for the hosted document store.
#[derive(Clone)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: String,
    /// Overrides the `https://<project>.api.sanity.io` host (mock servers, proxies).
    pub api_host: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl StoreConfig {
    /// Host the client talks to, without a trailing slash.
    #[must_use]
    pub fn api_host(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_owned(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("token", &"[redacted]")
            .field("api_host", &self.api_host)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub store: StoreConfig,
    pub admin_email: String,
    pub admin_password_salt: String,
    /// Lower-case hex SHA-256 of `salt \0 password`, see [`crate::credentials::hash_password`].
    pub admin_password_sha256: String,
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("store", &self.store)
            .field("admin_email", &self.admin_email)
            .field("admin_password_salt", &"[redacted]")
            .field("admin_password_sha256", &"[redacted]")
            .field("session_secret", &"[redacted]")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
