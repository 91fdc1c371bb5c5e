use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension,
};
use serde::Deserialize;
use shopdesk_store::AssetDocument;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct UploadQuery {
    filename: Option<String>,
}

/// `POST /api/assets/images?filename=`: raw image body, forwarded to the
/// store. The returned asset id goes into a product's `image` field.
pub(super) async fn upload_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<AssetDocument>, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(ApiError::new(
            req_id.0.as_str(),
            "validation_error",
            format!("Content-Type must be an image type, got '{content_type}'"),
        ));
    }
    if body.is_empty() {
        return Err(ApiError::new(
            req_id.0.as_str(),
            "validation_error",
            "image body is empty",
        ));
    }

    let filename = query.filename.unwrap_or_default();
    let asset = state
        .store
        .upload_image(filename.trim(), content_type, body.to_vec())
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    tracing::info!(asset_id = %asset.id, bytes = body.len(), "image asset uploaded");
    Ok(ApiResponse::new(&req_id, "asset", asset))
}
