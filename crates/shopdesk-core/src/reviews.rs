use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// A star rating, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns [`ValidationError::RatingOutOfRange`] outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(ValidationError::RatingOutOfRange(value)),
        }
    }

    /// Accepts a JSON number; `4.0` is fine, `4.5` is not.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAnInteger`] or
    /// [`ValidationError::RatingOutOfRange`].
    pub fn from_number(value: f64) -> Result<Self, ValidationError> {
        Self::new(validation::whole_number("rating", value)?)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `review` document as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDocument {
    #[serde(rename = "_id")]
    pub doc_id: String,
    #[serde(default)]
    pub user: Option<String>,
    /// Raw stored rating; legacy documents may hold values outside `1..=5`.
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub product_id: Option<i64>,
}

/// Review fields as submitted by a caller. All five are required on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFields {
    pub user: Option<String>,
    pub rating: Option<f64>,
    pub comment: Option<String>,
    pub date: Option<String>,
    pub product_id: Option<f64>,
}

/// A validated full replacement of a review's fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub user: String,
    pub rating: Rating,
    pub comment: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub date: DateTime<Utc>,
    pub product_id: i64,
}

fn serialize_rfc3339<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Parse a review date given as RFC 3339 or as a bare `YYYY-MM-DD`
/// (midnight UTC).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when neither form matches.
pub fn parse_review_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDate {
            field: "date",
            value: raw.to_owned(),
        })
}

impl ReviewFields {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn into_update(self) -> Result<ReviewUpdate, ValidationError> {
        let user = validation::require_text("user", self.user)?;
        let rating = Rating::from_number(
            self.rating
                .ok_or(ValidationError::Missing { field: "rating" })?,
        )?;
        let comment = validation::require_text("comment", self.comment)?;
        let date = parse_review_date(&validation::require_text("date", self.date)?)?;
        let product_id = validation::whole_number(
            "productId",
            self.product_id
                .ok_or(ValidationError::Missing { field: "productId" })?,
        )?;

        Ok(ReviewUpdate {
            user,
            rating,
            comment,
            date,
            product_id,
        })
    }
}
