use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::ApiResult;
use crate::middleware::{AdminOnly, Authorized, JsonBody, Members};
use crate::services::harvest_service::CreateHarvestRequest;
use crate::services::HarvestService;
use crate::state::AppState;

/// POST /harvests
pub async fn create(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateHarvestRequest>,
) -> ApiResult<impl IntoResponse> {
    let harvest = HarvestService::new(state.store).create(request).await?;
    Ok((StatusCode::CREATED, Json(harvest)))
}

/// GET /harvests - Most recent first, each with its plot
pub async fn list(_caller: Authorized<Members>, State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let harvests = HarvestService::new(state.store).list().await?;
    Ok(Json(harvests))
}

/// GET /harvests/plot/:plotId
pub async fn list_by_plot(
    _caller: Authorized<Members>,
    State(state): State<AppState>,
    Path(plot_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let harvests = HarvestService::new(state.store).list_by_plot(&plot_id).await?;
    Ok(Json(harvests))
}
