//! Shapes shared by every document kind in the store: type discriminators,
//! references, image fields, and lenient readers for loosely typed fields.

use serde::{Deserialize, Deserializer, Serialize};

pub const PRODUCT_TYPE: &str = "products";
pub const ORDER_TYPE: &str = "orders";
pub const ORDER_ITEM_TYPE: &str = "orderItems";
pub const REVIEW_TYPE: &str = "review";

fn reference_kind() -> String {
    "reference".to_owned()
}

fn image_kind() -> String {
    "image".to_owned()
}

/// A store-level reference to another document (`{_type: "reference", _ref}`).
///
/// Members of reference arrays also carry a `_key` unique within the array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type", default = "reference_kind")]
    pub kind: String,
    #[serde(rename = "_ref")]
    pub id: String,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Reference {
    #[must_use]
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            kind: reference_kind(),
            id: id.into(),
            key: None,
        }
    }

    /// A reference suitable for an array member.
    #[must_use]
    pub fn keyed(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::to(id)
        }
    }
}

/// An image field: a reference to an uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    #[serde(rename = "_type", default = "image_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Reference>,
}

impl ImageField {
    /// Image field pointing at an uploaded asset id (e.g. `image-abc-600x400-png`).
    #[must_use]
    pub fn from_asset(asset_id: impl Into<String>) -> Self {
        Self {
            kind: image_kind(),
            asset: Some(Reference::to(asset_id)),
        }
    }

    #[must_use]
    pub fn asset_id(&self) -> Option<&str> {
        self.asset.as_ref().map(|a| a.id.as_str())
    }
}

/// Readers for fields that older documents stored with inconsistent JSON types.
pub mod lenient {
    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberLike {
        Int(i64),
        Float(f64),
        Text(String),
    }

    /// Accepts an integer, a float (rounded), a numeric string, or null.
    #[allow(clippy::cast_possible_truncation)]
    pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<NumberLike>::deserialize(deserializer)?;
        Ok(match raw {
            Some(NumberLike::Int(v)) => Some(v),
            Some(NumberLike::Float(v)) if v.is_finite() => Some(v.round() as i64),
            Some(NumberLike::Text(s)) => s.trim().parse::<i64>().ok(),
            Some(NumberLike::Float(_)) | None => None,
        })
    }

    /// Accepts a number, a numeric string, or null.
    #[allow(clippy::cast_precision_loss)]
    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<NumberLike>::deserialize(deserializer)?;
        Ok(match raw {
            Some(NumberLike::Int(v)) => Some(v as f64),
            Some(NumberLike::Float(v)) => Some(v),
            Some(NumberLike::Text(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        })
    }

    /// Reads an array, dropping `null` members (dereferenced dangling references).
    pub fn vec_skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let raw = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
        Ok(raw.unwrap_or_default().into_iter().flatten().collect())
    }
}

/// Generates the `_key` for an array member.
///
/// Keys only need to be unique within one array, so the index is enough
/// when combined with the owning document id.
#[must_use]
pub fn array_key(owner_id: &str, index: usize) -> String {
    let prefix: String = owner_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect();
    format!("{prefix}{index}")
}
