//! Mutation payloads for the store's `data/mutate` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A single write. Serializes to the store's externally tagged shape,
/// e.g. `{"create": {...}}` or `{"delete": {"id": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Create(Map<String, Value>),
    Patch(Patch),
    Delete { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patch {
    pub id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,
}

/// Encode `fields` as a JSON object and stamp it with `_type` (and `_id` when given).
fn document(
    doc_type: &str,
    id: Option<&str>,
    fields: &impl Serialize,
) -> Result<Map<String, Value>, StoreError> {
    let mut doc = into_object(doc_type, fields)?;
    doc.insert("_type".to_owned(), Value::String(doc_type.to_owned()));
    if let Some(id) = id {
        doc.insert("_id".to_owned(), Value::String(id.to_owned()));
    }
    Ok(doc)
}

fn into_object(context: &str, fields: &impl Serialize) -> Result<Map<String, Value>, StoreError> {
    let encode_err = |source| StoreError::Encode {
        context: context.to_owned(),
        source,
    };
    match serde_json::to_value(fields).map_err(encode_err)? {
        Value::Object(map) => Ok(map),
        other => Err(encode_err(<serde_json::Error as serde::ser::Error>::custom(
            format!("expected a JSON object, got {other}"),
        ))),
    }
}

impl Mutation {
    /// Create a new document. Without `id` the store assigns one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if `fields` does not serialize to an object.
    pub fn create(
        doc_type: &str,
        id: Option<&str>,
        fields: &impl Serialize,
    ) -> Result<Self, StoreError> {
        document(doc_type, id, fields).map(Mutation::Create)
    }

    /// Patch that sets every field present in `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if `fields` does not serialize to an object.
    pub fn set(id: &str, fields: &impl Serialize) -> Result<Self, StoreError> {
        Ok(Mutation::Patch(Patch {
            id: id.to_owned(),
            set: into_object("patch", fields)?,
        }))
    }

    #[must_use]
    pub fn delete(id: &str) -> Self {
        Mutation::Delete { id: id.to_owned() }
    }
}

/// An ordered batch of mutations applied atomically by one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transaction {
    mutations: Vec<Mutation>,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) -> &mut Self {
        self.mutations.push(mutation);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

impl From<Vec<Mutation>> for Transaction {
    fn from(mutations: Vec<Mutation>) -> Self {
        Self { mutations }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutationResult {
    pub id: String,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub document: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

impl MutationResponse {
    /// Whether the store reported a result for `id`.
    #[must_use]
    pub fn touched(&self, id: &str) -> bool {
        self.results.iter().any(|r| r.id == id)
    }

    /// Decode the returned document for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no document came back for `id`
    /// and [`StoreError::Deserialize`] when it does not match `T`.
    pub fn document<T: serde::de::DeserializeOwned>(
        &self,
        kind: &'static str,
        id: &str,
    ) -> Result<T, StoreError> {
        let doc = self
            .results
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.document.clone())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_owned(),
            })?;
        serde_json::from_value(doc).map_err(|e| StoreError::Deserialize {
            context: format!("{kind} document {id}"),
            source: e,
        })
    }
}
