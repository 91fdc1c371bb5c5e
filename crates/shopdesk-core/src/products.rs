use serde::{Deserialize, Serialize};

use crate::documents::{ImageField, Reference};
use crate::validation::{self, ValidationError};

/// Curated tag values offered by the catalog schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductTag {
    #[serde(rename = "featured")]
    Featured,
    #[serde(rename = "ourProducts")]
    OurProducts,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "gallery")]
    Gallery,
}

impl std::str::FromStr for ProductTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "featured" => Ok(ProductTag::Featured),
            "ourProducts" => Ok(ProductTag::OurProducts),
            "instagram" => Ok(ProductTag::Instagram),
            "gallery" => Ok(ProductTag::Gallery),
            other => Err(ValidationError::UnknownTag(other.to_owned())),
        }
    }
}

/// A review embedded directly in a product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedReview {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A `products` document as read from the store.
///
/// Every field except the identity is optional: the store never enforced
/// presence, and older documents carry gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    #[serde(rename = "_id")]
    pub doc_id: String,
    /// Numeric catalog id, separate from the store identity.
    #[serde(
        rename = "id",
        default,
        deserialize_with = "crate::documents::lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub catalog_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_f64")]
    pub price_without_discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Reference>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub inventory: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<EmbeddedReview>>,
}

/// A `categories` document as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDocument {
    #[serde(rename = "_id")]
    pub doc_id: String,
    #[serde(
        rename = "id",
        default,
        deserialize_with = "crate::documents::lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub catalog_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_f64")]
    pub price_without_discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageField>,
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub inventory: Option<i64>,
    /// Number of products in the category.
    #[serde(default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub products: Option<i64>,
}

/// One row of the catalog listing: products and categories share a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum CatalogEntry {
    #[serde(rename = "products")]
    Product(ProductDocument),
    #[serde(rename = "categories")]
    Category(CategoryDocument),
}

impl CatalogEntry {
    #[must_use]
    pub fn doc_id(&self) -> &str {
        match self {
            CatalogEntry::Product(p) => &p.doc_id,
            CatalogEntry::Category(c) => &c.doc_id,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            CatalogEntry::Product(p) => p.title.as_deref(),
            CatalogEntry::Category(c) => c.title.as_deref(),
        }
    }

    #[must_use]
    pub fn as_product(&self) -> Option<&ProductDocument> {
        match self {
            CatalogEntry::Product(p) => Some(p),
            CatalogEntry::Category(_) => None,
        }
    }
}

/// Product fields as submitted by an admin form or API caller.
///
/// Shared by create and update; [`ProductFields::into_new_product`] and
/// [`ProductFields::into_update`] apply the validation for each.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    #[serde(rename = "id", default, deserialize_with = "crate::documents::lenient::opt_i64")]
    pub catalog_id: Option<i64>,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub price_without_discount: Option<f64>,
    pub badge: Option<String>,
    pub description: Option<String>,
    pub inventory: Option<i64>,
    /// Asset id of an already-uploaded image.
    pub image: Option<String>,
    /// Store id of a category document.
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A validated product ready to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<i64>,
    pub title: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_without_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ProductTag>>,
}

/// A validated partial product patch. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_without_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<u32>,
    /// Only set when a new image was uploaded; otherwise the stored image stays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ProductTag>>,
}

impl ProductUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_tags(tags: Option<Vec<String>>) -> Result<Option<Vec<ProductTag>>, ValidationError> {
    tags.map(|list| {
        list.iter()
            .map(|t| t.parse::<ProductTag>())
            .collect::<Result<Vec<_>, _>>()
    })
    .transpose()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProductFields {
    /// Validate fields for a new product: `title` and `price` are required,
    /// amounts must be non-negative, inventory a non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn into_new_product(self) -> Result<NewProduct, ValidationError> {
        let title = validation::require_text("title", self.title)?;
        let price = validation::amount(
            "price",
            self.price.ok_or(ValidationError::Missing { field: "price" })?,
        )?;
        let price_without_discount = self
            .price_without_discount
            .map(|v| validation::amount("priceWithoutDiscount", v))
            .transpose()?;
        let inventory = self
            .inventory
            .map(|v| validation::count("inventory", v))
            .transpose()?;

        Ok(NewProduct {
            catalog_id: self.catalog_id,
            title,
            price,
            price_without_discount,
            badge: non_blank(self.badge),
            description: self.description,
            inventory,
            image: non_blank(self.image).map(ImageField::from_asset),
            category: non_blank(self.category).map(Reference::to),
            tags: parse_tags(self.tags)?,
        })
    }

    /// Validate fields for a partial update. Absent fields stay untouched.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn into_update(self) -> Result<ProductUpdate, ValidationError> {
        let title = match self.title {
            Some(t) => Some(validation::require_text("title", Some(t))?),
            None => None,
        };
        let price = self
            .price
            .map(|v| validation::amount("price", v))
            .transpose()?;
        let price_without_discount = self
            .price_without_discount
            .map(|v| validation::amount("priceWithoutDiscount", v))
            .transpose()?;
        let inventory = self
            .inventory
            .map(|v| validation::count("inventory", v))
            .transpose()?;

        Ok(ProductUpdate {
            catalog_id: self.catalog_id,
            title,
            price,
            price_without_discount,
            badge: self.badge,
            description: self.description,
            inventory,
            image: non_blank(self.image).map(ImageField::from_asset),
            category: non_blank(self.category).map(Reference::to),
            tags: parse_tags(self.tags)?,
        })
    }
}
