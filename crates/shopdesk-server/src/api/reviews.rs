use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use shopdesk_core::{ReviewDocument, ReviewFields};
use shopdesk_store::reviews;

use crate::middleware::RequestId;

use super::{
    json_body, map_store_error, message, missing_id, validation_error, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ReviewIdQuery {
    id: Option<String>,
}

impl ReviewIdQuery {
    fn require(self, req_id: &RequestId) -> Result<String, ApiError> {
        self.id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing_id(req_id))
    }
}

/// GET /api/reviews
pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<ApiResponse<Vec<ReviewDocument>>, ApiError> {
    let list = reviews::list(&state.store)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(ApiResponse::new(&req_id, "reviews", list))
}

/// `PUT /api/reviews?id=`: replace user, rating, comment, date and productId.
pub(super) async fn update_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReviewIdQuery>,
    body: Result<Json<ReviewFields>, JsonRejection>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let id = query.require(&req_id)?;
    let update = json_body(&req_id, body)?
        .into_update()
        .map_err(|e| validation_error(&req_id, &e))?;
    reviews::update(&state.store, &id, &update)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(message(&req_id, "Review updated successfully"))
}

/// DELETE /api/reviews?id=
pub(super) async fn delete_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReviewIdQuery>,
) -> Result<ApiResponse<&'static str>, ApiError> {
    let id = query.require(&req_id)?;
    reviews::delete(&state.store, &id)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(message(&req_id, "Review deleted successfully"))
}
