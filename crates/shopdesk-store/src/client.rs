//! HTTP client for the hosted document store.
//!
//! Wraps `reqwest` with bearer authentication, store error decoding, and
//! typed query results. Reads are retried on transient failures; writes
//! are sent exactly once.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shopdesk_core::StoreConfig;

use crate::error::StoreError;
use crate::mutation::{MutationResponse, Transaction};
use crate::retry::retry_with_backoff;

pub const DOCUMENT_COUNT_QUERY: &str = "count(*[_type == $type && _id == $id])";

/// Client for one project/dataset of the document store.
///
/// Build it once per process and share it; the inner `reqwest::Client`
/// pools connections.
pub struct StoreClient {
    client: Client,
    token: String,
    base_url: Url,
    dataset: String,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("dataset", &self.dataset)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct AssetResponse {
    document: AssetDocument,
}

/// An uploaded image asset.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl StoreClient {
    /// Creates a client from configuration, honoring an `api_host` override.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be built
    /// and [`StoreError::InvalidBaseUrl`] if the host does not parse.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::with_base_url(config, &config.api_host())
    }

    /// Creates a client against an explicit host (wiremock in tests).
    ///
    /// # Errors
    ///
    /// See [`StoreClient::new`].
    pub fn with_base_url(config: &StoreConfig, host: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shopdesk/0.1 (catalog-admin)")
            .build()?;

        // Trailing slash so that `join` appends below the version segment.
        let raw = format!(
            "{}/v{}/",
            host.trim_end_matches('/'),
            config.api_version.trim_start_matches('v')
        );
        let base_url = Url::parse(&raw).map_err(|e| StoreError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl {
                url: raw,
                reason: "not a hierarchical URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            token: config.token.clone(),
            base_url,
            dataset: config.dataset.clone(),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    fn endpoint(&self, kind: &str) -> Result<Url, StoreError> {
        let relative = format!("{kind}/{}", self.dataset);
        self.base_url
            .join(&relative)
            .map_err(|e| StoreError::InvalidBaseUrl {
                url: format!("{}{relative}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Runs a query and decodes its `result` as `T`.
    ///
    /// Each param is sent as `$name=<json>`, so `("id", json!("p1"))` binds
    /// `$id` to the string `"p1"`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Http`] on network failure after retries.
    /// - [`StoreError::Api`] when the store rejects the query.
    /// - [`StoreError::Deserialize`] when the result does not match `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, Value)],
    ) -> Result<T, StoreError> {
        let mut url = self.endpoint("data/query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }

        let body = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.get_json(&url)
        })
        .await?;

        let envelope: QueryResponse =
            serde_json::from_value(body).map_err(|e| StoreError::Deserialize {
                context: format!("query `{query}`"),
                source: e,
            })?;
        serde_json::from_value(envelope.result).map_err(|e| StoreError::Deserialize {
            context: format!("result of `{query}`"),
            source: e,
        })
    }

    /// Confirms that `id` names a document of `doc_type` before it is written.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no document of that type has the id,
    /// including ids that belong to another document type.
    pub async fn require_document(
        &self,
        doc_type: &str,
        kind: &'static str,
        id: &str,
    ) -> Result<(), StoreError> {
        let count: u64 = self
            .query(
                DOCUMENT_COUNT_QUERY,
                &[("type", Value::from(doc_type)), ("id", Value::from(id))],
            )
            .await?;
        if count == 0 {
            return Err(StoreError::NotFound {
                kind,
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    /// Applies a batch of mutations atomically. Never retried.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Api`] when the store rejects the batch (nothing applied).
    /// - [`StoreError::Deserialize`] when the response is malformed.
    pub async fn mutate(&self, tx: &Transaction) -> Result<MutationResponse, StoreError> {
        let mut url = self.endpoint("data/mutate")?;
        url.query_pairs_mut()
            .append_pair("returnIds", "true")
            .append_pair("returnDocuments", "true")
            .append_pair("visibility", "sync");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(tx)
            .send()
            .await?;
        let body = Self::read_json(response, "mutate").await?;
        serde_json::from_value(body).map_err(|e| StoreError::Deserialize {
            context: "mutate response".to_owned(),
            source: e,
        })
    }

    /// Uploads raw image bytes as an image asset.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Api`] when the store rejects the upload.
    /// - [`StoreError::Deserialize`] when the response lacks an asset document.
    pub async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AssetDocument, StoreError> {
        let mut url = self.endpoint("assets/images")?;
        if !filename.is_empty() {
            url.query_pairs_mut().append_pair("filename", filename);
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let body = Self::read_json(response, "asset upload").await?;
        let asset: AssetResponse =
            serde_json::from_value(body).map_err(|e| StoreError::Deserialize {
                context: format!("asset upload of '{filename}'"),
                source: e,
            })?;
        Ok(asset.document)
    }

    async fn get_json(&self, url: &Url) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::read_json(response, "query").await
    }

    /// Checks the HTTP status and parses the body as JSON.
    async fn read_json(response: Response, context: &str) -> Result<Value, StoreError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Pulls a human-readable message out of a store error body.
///
/// Handles `{"error": {"description": ...}}`, `{"error": "...", "message": ...}`
/// and falls back to the raw body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().chars().take(200).collect();
    };
    let error = value.get("error");
    error
        .and_then(|e| e.get("description"))
        .or_else(|| value.get("message"))
        .or(error)
        .and_then(Value::as_str)
        .map_or_else(|| value.to_string(), str::to_owned)
}
