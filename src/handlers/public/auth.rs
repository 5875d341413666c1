// handlers/public/auth.rs - Account sign-up, sign-in and recovery

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::middleware::JsonBody;
use crate::services::auth_service::{LoginRequest, RecoverPasswordRequest, RegisterRequest};
use crate::services::AuthService;
use crate::state::AppState;

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// POST /auth/register - Create an account with the identity provider
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = AuthService::new(state.identity).register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login - Password sign-in
///
/// The session tokens travel in the `Authorization` and `x-refresh-token`
/// response headers; the body carries only the user.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = AuthService::new(state.identity).login(request).await?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", session.access_token))?);
    headers.insert(
        HeaderName::from_static(REFRESH_TOKEN_HEADER),
        header_value(&session.refresh_token)?,
    );

    Ok((headers, Json(json!({ "user": session.user }))))
}

/// GET /auth/login/google - URL that starts the Google OAuth flow
pub async fn google(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let url = AuthService::new(state.identity).google_login_url()?;
    Ok(Json(json!({ "url": url })))
}

/// POST /auth/recover-password - Ask the provider to send a reset email
pub async fn recover_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RecoverPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let body = AuthService::new(state.identity).recover_password(request).await?;
    Ok(Json(body))
}

fn header_value(raw: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|_| ApiError::internal_server_error("Identity provider returned an unusable token"))
}
