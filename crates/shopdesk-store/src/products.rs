//! Catalog repository: products and categories.

use serde_json::json;
use shopdesk_core::documents::PRODUCT_TYPE;
use shopdesk_core::{CatalogEntry, ImageField, NewProduct, ProductDocument, ProductUpdate};
use uuid::Uuid;

use crate::client::{AssetDocument, StoreClient};
use crate::error::StoreError;
use crate::mutation::{Mutation, Transaction};

pub const CATALOG_QUERY: &str = r#"*[_type in ["products", "categories"]]{
  _id, _type, id, title, price, priceWithoutDiscount, badge, description,
  inventory, image, tags, category, products
}"#;

pub const REFERENCE_COUNT_QUERY: &str = "count(*[references($id)])";

/// An image to upload alongside a product write.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    async fn upload(self, client: &StoreClient) -> Result<AssetDocument, StoreError> {
        client
            .upload_image(&self.filename, &self.content_type, self.bytes)
            .await
    }
}

/// Every product and category document.
///
/// # Errors
///
/// Propagates [`StoreError`] from the query.
pub async fn list(client: &StoreClient) -> Result<Vec<CatalogEntry>, StoreError> {
    client.query(CATALOG_QUERY, &[]).await
}

/// Creates a product, uploading `image` first when given. The uploaded
/// asset replaces any asset id already present on `product`.
///
/// # Errors
///
/// Propagates [`StoreError`] from the upload or the mutation. A failed
/// create after a successful upload leaves the asset orphaned.
pub async fn create(
    client: &StoreClient,
    mut product: NewProduct,
    image: Option<ImageUpload>,
) -> Result<ProductDocument, StoreError> {
    if let Some(upload) = image {
        let asset = upload.upload(client).await?;
        product.image = Some(ImageField::from_asset(asset.id));
    }

    let id = Uuid::new_v4().to_string();
    let tx = Transaction::from(vec![Mutation::create(PRODUCT_TYPE, Some(&id), &product)?]);
    let response = client.mutate(&tx).await?;
    tracing::info!(product_id = %id, title = %product.title, "product created");
    response.document("product", &id)
}

/// Patches the provided fields. A new upload replaces the image; without
/// one the stored image is left as it was.
///
/// # Errors
///
/// [`StoreError::NotFound`] when `id` is not a product or the store reports
/// no patched document, otherwise whatever the upload or mutation returns.
pub async fn update(
    client: &StoreClient,
    id: &str,
    mut update: ProductUpdate,
    image: Option<ImageUpload>,
) -> Result<(), StoreError> {
    client.require_document(PRODUCT_TYPE, "product", id).await?;
    if let Some(upload) = image {
        let asset = upload.upload(client).await?;
        update.image = Some(ImageField::from_asset(asset.id));
    }
    if update.is_empty() {
        return Ok(());
    }

    let tx = Transaction::from(vec![Mutation::set(id, &update)?]);
    let response = client.mutate(&tx).await?;
    if !response.touched(id) {
        return Err(StoreError::NotFound {
            kind: "product",
            id: id.to_owned(),
        });
    }
    Ok(())
}

/// Deletes a product unless another document references it.
///
/// # Errors
///
/// - [`StoreError::Conflict`] when the product is still referenced.
/// - [`StoreError::NotFound`] when `id` is not a product or nothing was deleted.
pub async fn delete(client: &StoreClient, id: &str) -> Result<(), StoreError> {
    client.require_document(PRODUCT_TYPE, "product", id).await?;
    let references: u64 = client
        .query(REFERENCE_COUNT_QUERY, &[("id", json!(id))])
        .await?;
    if references > 0 {
        return Err(StoreError::Conflict(format!(
            "product '{id}' is referenced by {references} document(s)"
        )));
    }

    let response = client
        .mutate(&Transaction::from(vec![Mutation::delete(id)]))
        .await?;
    if !response.touched(id) {
        return Err(StoreError::NotFound {
            kind: "product",
            id: id.to_owned(),
        });
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(())
}
