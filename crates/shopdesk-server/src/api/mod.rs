mod assets;
mod dashboard;
mod orders;
mod products;
mod reviews;
mod session;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Serialize, Serializer};
use shopdesk_core::{AdminCredentials, ValidationError};
use shopdesk_store::{StoreClient, StoreError};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::middleware::{
    enforce_rate_limit, request_id, require_session, RateLimitState, RequestId,
};
use crate::session::SessionKeys;

/// Image uploads may exceed axum's 2 MB default.
const ASSET_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub sessions: Arc<SessionKeys>,
    pub credentials: Arc<AdminCredentials>,
}

/// Success envelope: `{"success": true, "<key>": data, "meta": {...}}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    key: &'static str,
    data: T,
    meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    success: bool,
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(req_id: &RequestId, key: &'static str, data: T) -> Self {
        Self {
            key,
            data,
            meta: ResponseMeta::new(req_id.0.clone()),
        }
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry(self.key, &self.data)?;
        map.serialize_entry("meta", &self.meta)?;
        map.end()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A plain confirmation message, returned by update and delete routes.
pub(super) fn message(req_id: &RequestId, text: &'static str) -> ApiResponse<&'static str> {
    ApiResponse::new(req_id, "message", text)
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn validation_error(req_id: &RequestId, error: &ValidationError) -> ApiError {
    ApiError::new(req_id.0.as_str(), "validation_error", error.to_string())
}

pub(super) fn missing_id(req_id: &RequestId) -> ApiError {
    validation_error(req_id, &ValidationError::Missing { field: "id" })
}

/// Unwraps a JSON body, turning axum's rejection into a `bad_request` envelope.
pub(super) fn json_body<T>(
    req_id: &RequestId,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::new(req_id.0.as_str(), "bad_request", rejection.body_text()))
}

pub(super) fn map_store_error(req_id: &RequestId, error: &StoreError) -> ApiError {
    let rid = req_id.0.as_str();
    match error {
        StoreError::NotFound { .. } => ApiError::new(rid, "not_found", error.to_string()),
        StoreError::Conflict(message) => ApiError::new(rid, "conflict", message.as_str()),
        // The store rejected the write because of what was submitted, e.g. a
        // patch on a missing document or a reference to one.
        StoreError::Api { status: 404, message } => {
            tracing::warn!(request_id = rid, error = %error, "document store reported a missing document");
            ApiError::new(rid, "not_found", message.as_str())
        }
        StoreError::Api { status: 409, message } => {
            tracing::warn!(request_id = rid, error = %error, "document store rejected the write");
            ApiError::new(rid, "conflict", message.as_str())
        }
        StoreError::Encode { .. } => {
            tracing::error!(request_id = rid, error = %error, "failed to encode store document");
            ApiError::new(rid, "internal_error", "failed to encode document")
        }
        StoreError::Http(_)
        | StoreError::Api { .. }
        | StoreError::Deserialize { .. }
        | StoreError::InvalidBaseUrl { .. } => {
            tracing::error!(request_id = rid, error = %error, "document store request failed");
            ApiError::new(rid, "upstream_error", "document store request failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(sessions: Arc<SessionKeys>, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/products",
            get(products::list_products)
                .post(products::create_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/orders",
            get(orders::list_orders)
                .post(orders::create_order)
                .put(orders::update_order_status)
                .delete(orders::delete_order),
        )
        .route(
            "/api/reviews",
            get(reviews::list_reviews)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/api/dashboard", get(dashboard::dashboard_summary))
        .route(
            "/api/assets/images",
            post(assets::upload_image).layer(DefaultBodyLimit::max(ASSET_BODY_LIMIT)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    sessions,
                    require_session,
                )),
        )
}

/// `POST` signs in and stays public; `GET` inspects the current session.
fn session_router(sessions: Arc<SessionKeys>, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/session",
            get(session::current_session)
                .route_layer(axum::middleware::from_fn_with_state(
                    sessions,
                    require_session,
                ))
                .post(session::create_session),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(session_router(Arc::clone(&state.sessions), rate_limit.clone()))
        .merge(protected_router(Arc::clone(&state.sessions), rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    dataset: String,
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> ApiResponse<HealthData> {
    ApiResponse::new(
        &req_id,
        "status",
        HealthData {
            status: "ok",
            dataset: state.store.dataset().to_owned(),
        },
    )
}
