use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopdesk_core::credentials::validate_login;

use crate::middleware::{RequestId, Session};

use super::{json_body, validation_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IssuedSession {
    token: String,
    token_type: &'static str,
    subject: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionInfo {
    subject: String,
    expires_at: Option<DateTime<Utc>>,
}

/// POST /api/session: exchange admin credentials for a bearer token.
pub(super) async fn create_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<IssuedSession>, ApiError> {
    let login = json_body(&req_id, body)?;
    validate_login(&login.email, &login.password).map_err(|e| validation_error(&req_id, &e))?;

    if !state.credentials.verify(&login.email, &login.password) {
        tracing::warn!(request_id = %req_id.0, email = %login.email.trim(), "admin sign-in rejected");
        return Err(ApiError::new(
            req_id.0.as_str(),
            "unauthorized",
            "invalid email or password",
        ));
    }

    let issued = state.sessions.issue(state.credentials.email()).map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "failed to sign session token");
        ApiError::new(req_id.0.as_str(), "internal_error", "failed to issue session")
    })?;
    tracing::info!(subject = %issued.claims.sub, jti = %issued.claims.jti, "admin signed in");

    let expires_at = issued.claims.expires_at();
    Ok(ApiResponse::new(
        &req_id,
        "session",
        IssuedSession {
            token: issued.token,
            token_type: "Bearer",
            subject: issued.claims.sub,
            expires_at,
        },
    ))
}

/// GET /api/session: who the current token belongs to and when it expires.
pub(super) async fn current_session(
    Extension(req_id): Extension<RequestId>,
    Extension(Session(claims)): Extension<Session>,
) -> ApiResponse<SessionInfo> {
    let expires_at = claims.expires_at();
    ApiResponse::new(
        &req_id,
        "session",
        SessionInfo {
            subject: claims.sub,
            expires_at,
        },
    )
}
