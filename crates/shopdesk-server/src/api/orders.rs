use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use shopdesk_core::{OrderDocument, OrderFields, OrderStatus, ValidationError};
use shopdesk_store::orders;

use crate::middleware::RequestId;

use super::products::DeleteRequest;
use super::{
    json_body, map_store_error, message, missing_id, validation_error, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub(super) struct OrderListQuery {
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusRequest {
    id: Option<String>,
    status: Option<String>,
}

/// GET /api/orders: orders with expanded items, `?search=` on email or status.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrderListQuery>,
) -> Result<ApiResponse<Vec<OrderDocument>>, ApiError> {
    let list = orders::list(&state.store, query.search.as_deref())
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(ApiResponse::new(&req_id, "orders", list))
}

/// POST /api/orders: create an order and its line items atomically.
pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<OrderFields>, JsonRejection>,
) -> Result<ApiResponse<OrderDocument>, ApiError> {
    let order = json_body(&req_id, body)?
        .into_new_order()
        .map_err(|e| validation_error(&req_id, &e))?;
    let created = orders::create(&state.store, &order)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(ApiResponse::new(&req_id, "order", created))
}

/// PUT /api/orders: set an order's status.
pub(super) async fn update_order_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let body = json_body(&req_id, body)?;
    let id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| missing_id(&req_id))?;
    let status: OrderStatus = body
        .status
        .ok_or(ValidationError::Missing { field: "status" })
        .and_then(|s| s.parse())
        .map_err(|e| validation_error(&req_id, &e))?;
    orders::update_status(&state.store, &id, status)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(message(&req_id, "Order status updated"))
}

/// DELETE /api/orders: remove an order and its line items.
pub(super) async fn delete_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let id = json_body(&req_id, body)?.into_id(&req_id)?;
    orders::delete(&state.store, &id)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(message(&req_id, "Order deleted"))
}
