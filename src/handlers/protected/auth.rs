// handlers/protected/auth.rs - Account operations for the token holder, plus admin user management

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ApiResult;
use crate::middleware::{AdminOnly, Authenticated, Authorized, JsonBody, Members};
use crate::services::auth_service::{AdminCreateUserRequest, SetRoleRequest, UpdatePasswordRequest};
use crate::services::AuthService;
use crate::state::AppState;

/// GET /auth/me - The provider's user record, unchanged
pub async fn me(caller: Authorized<Authenticated>) -> impl IntoResponse {
    Json(caller.user)
}

/// PATCH /auth/update-password
pub async fn update_password(
    caller: Authorized<Authenticated>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdatePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let body = AuthService::new(state.identity)
        .update_password(&caller.token, request)
        .await?;
    Ok(Json(body))
}

/// POST /auth/logout - Revoke the caller's session
pub async fn logout(caller: Authorized<Authenticated>, State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = AuthService::new(state.identity).logout(&caller.token).await?;
    Ok(Json(body))
}

/// GET /auth/test/user - Smoke check for the member policy
pub async fn test_user(caller: Authorized<Members>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "route": "/auth/test/user",
        "uid": caller.user.id,
        "role": caller.role(),
    }))
}

/// POST /auth/admin/users
pub async fn admin_create_user(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AdminCreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = AuthService::new(state.identity).admin_create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /auth/admin/role
pub async fn set_role(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SetRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = AuthService::new(state.identity).set_role(request).await?;
    Ok(Json(user))
}
