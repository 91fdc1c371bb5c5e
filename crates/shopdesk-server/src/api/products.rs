use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use shopdesk_core::{CatalogEntry, ProductDocument, ProductFields};
use shopdesk_store::products;

use crate::middleware::RequestId;

use super::{
    json_body, map_store_error, message, missing_id, validation_error, ApiError, ApiResponse,
    AppState,
};

/// `PUT /api/products` body: the document id plus any fields to change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateProductRequest {
    id: Option<String>,
    title: Option<String>,
    price: Option<f64>,
    price_without_discount: Option<f64>,
    badge: Option<String>,
    description: Option<String>,
    inventory: Option<i64>,
    image: Option<String>,
    category: Option<String>,
    tags: Option<Vec<String>>,
}

impl UpdateProductRequest {
    fn split(self) -> (Option<String>, ProductFields) {
        let fields = ProductFields {
            catalog_id: None,
            title: self.title,
            price: self.price,
            price_without_discount: self.price_without_discount,
            badge: self.badge,
            description: self.description,
            inventory: self.inventory,
            image: self.image,
            category: self.category,
            tags: self.tags,
        };
        (self.id.filter(|id| !id.trim().is_empty()), fields)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteRequest {
    pub id: Option<String>,
}

impl DeleteRequest {
    pub(super) fn into_id(self, req_id: &RequestId) -> Result<String, ApiError> {
        self.id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing_id(req_id))
    }
}

/// GET /api/products: products and categories.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<ApiResponse<Vec<CatalogEntry>>, ApiError> {
    let entries = products::list(&state.store)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(ApiResponse::new(&req_id, "products", entries))
}

/// POST /api/products: create a product. `image` is the id of an asset
/// uploaded through `/api/assets/images`.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ProductFields>, JsonRejection>,
) -> Result<ApiResponse<ProductDocument>, ApiError> {
    let product = json_body(&req_id, body)?
        .into_new_product()
        .map_err(|e| validation_error(&req_id, &e))?;
    let created = products::create(&state.store, product, None)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(ApiResponse::new(&req_id, "product", created))
}

/// PUT /api/products: partial update; omitted fields are left untouched.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let (id, fields) = json_body(&req_id, body)?.split();
    let id = id.ok_or_else(|| missing_id(&req_id))?;
    let update = fields
        .into_update()
        .map_err(|e| validation_error(&req_id, &e))?;
    products::update(&state.store, &id, update, None)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(message(&req_id, "Product updated"))
}

/// DELETE /api/products: refused with 409 while other documents reference it.
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let id = json_body(&req_id, body)?.into_id(&req_id)?;
    products::delete(&state.store, &id)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(message(&req_id, "Product deleted"))
}
