use axum::{extract::State, Extension};
use shopdesk_store::{dashboard, DashboardSummary};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

/// GET /api/dashboard: catalog and order counts plus per-order chart data.
pub(super) async fn dashboard_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<ApiResponse<DashboardSummary>, ApiError> {
    let summary = dashboard::summary(&state.store)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;
    Ok(ApiResponse::new(&req_id, "dashboard", summary))
}
