use thiserror::Error;

/// Errors returned by the document store client and repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("store API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A write payload could not be encoded as a store document.
    #[error("cannot encode {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The mutation reported no affected document for the requested id.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The write would break a reference held by other documents.
    #[error("{0}")]
    Conflict(String),

    #[error("invalid store base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
