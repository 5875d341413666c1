use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::ApiResult;
use crate::middleware::{AdminOnly, Authorized, JsonBody, Members};
use crate::services::plot_service::{CreatePlotRequest, UpdatePlotRequest};
use crate::services::PlotService;
use crate::state::AppState;

/// POST /plots
pub async fn create(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreatePlotRequest>,
) -> ApiResult<impl IntoResponse> {
    let plot = PlotService::new(state.store).create(request).await?;
    Ok((StatusCode::CREATED, Json(plot)))
}

/// GET /plots - All plots ordered by name
pub async fn list(_caller: Authorized<Members>, State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let plots = PlotService::new(state.store).list().await?;
    Ok(Json(plots))
}

/// GET /plots/:id
pub async fn get(
    _caller: Authorized<Members>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let plot = PlotService::new(state.store).get(&id).await?;
    Ok(Json(plot))
}

/// PATCH /plots/:id - Partial update, returns the stored plot
pub async fn update(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdatePlotRequest>,
) -> ApiResult<impl IntoResponse> {
    let plot = PlotService::new(state.store).update(&id, request).await?;
    Ok(Json(plot))
}

/// DELETE /plots/:id - Removes the plot and its harvests
pub async fn delete(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    PlotService::new(state.store).delete(&id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// GET /plots/:id/summary - Total harvested kilograms
pub async fn summary(
    _caller: Authorized<Members>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let summary = PlotService::new(state.store).summary(&id).await?;
    Ok(Json(summary))
}
