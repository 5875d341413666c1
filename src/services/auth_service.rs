use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::validation;
use crate::auth::{AdminCreateUser, AuthenticatedUser, IdentityError, IdentityProvider, Session, SignUp};
use crate::error::{ApiError, ApiResult};
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecoverPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email_confirm: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// Map a provider failure to the status the calling route reports.
/// Missing configuration is always a server fault.
fn provider_error(err: IdentityError, status: fn(String) -> ApiError) -> ApiError {
    match err {
        missing @ IdentityError::NotConfigured(_) => missing.into(),
        IdentityError::Rejected { message, .. } => status(message),
        other => {
            warn!("Identity provider call failed: {}", other);
            status("Identity provider unavailable".to_string())
        }
    }
}

fn parse_role(value: Option<String>) -> ApiResult<Role> {
    let raw = value.unwrap_or_default();
    raw.parse::<Role>()
        .map_err(|problem| ApiError::invalid_field("role", problem))
}

/// Account flows delegated to the identity provider
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthenticatedUser> {
        let input = SignUp {
            full_name: validation::required_text("fullName", request.full_name)?,
            email: validation::email("email", request.email)?,
            password: validation::password("password", request.password)?,
        };

        let user = self
            .identity
            .sign_up(input)
            .await
            .map_err(|e| provider_error(e, ApiError::BadRequest))?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Password sign-in. Any provider refusal is reported as 401.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<Session> {
        let email = validation::email("email", request.email)?;
        let password = validation::required_text("password", request.password)?;

        self.identity
            .sign_in_with_password(&email, &password)
            .await
            .map_err(|e| provider_error(e, ApiError::Unauthorized))
    }

    pub fn google_login_url(&self) -> ApiResult<String> {
        self.identity
            .oauth_authorize_url("google")
            .map_err(|e| provider_error(e, ApiError::BadRequest))
    }

    pub async fn recover_password(&self, request: RecoverPasswordRequest) -> ApiResult<Value> {
        let email = validation::email("email", request.email)?;
        self.identity
            .recover_password(&email)
            .await
            .map_err(|e| provider_error(e, ApiError::BadRequest))?;
        Ok(json!({ "message": "Password recovery email sent" }))
    }

    pub async fn update_password(&self, token: &str, request: UpdatePasswordRequest) -> ApiResult<Value> {
        let password = validation::password("password", request.password)?;
        self.identity
            .update_password(token, &password)
            .await
            .map_err(|e| provider_error(e, ApiError::BadRequest))?;
        Ok(json!({ "message": "Password updated successfully" }))
    }

    pub async fn logout(&self, token: &str) -> ApiResult<Value> {
        self.identity
            .sign_out(token)
            .await
            .map_err(|e| provider_error(e, ApiError::InternalServerError))?;
        Ok(json!({ "message": "Logged out successfully" }))
    }

    pub async fn admin_create_user(&self, request: AdminCreateUserRequest) -> ApiResult<AuthenticatedUser> {
        let input = AdminCreateUser {
            email: validation::email("email", request.email)?,
            password: validation::password("password", request.password)?,
            full_name: request.full_name,
            role: match request.role {
                Some(role) => Some(parse_role(Some(role))?),
                None => None,
            },
            email_confirm: request.email_confirm.unwrap_or(false),
        };

        let user = self
            .identity
            .admin_create_user(input)
            .await
            .map_err(|e| provider_error(e, ApiError::BadRequest))?;
        info!("Admin created user {} with role {}", user.id, user.resolved_role());
        Ok(user)
    }

    /// Write `role` into the user's `app_metadata`, the location that takes
    /// precedence during role resolution.
    pub async fn set_role(&self, request: SetRoleRequest) -> ApiResult<AuthenticatedUser> {
        let raw_id = validation::required_text("userId", request.user_id)?;
        let user_id = validation::parse_uuid("userId", raw_id.trim())?.to_string();
        let role = parse_role(request.role)?;

        let user = self
            .identity
            .admin_update_user_by_id(&user_id, json!({ "app_metadata": { "role": role } }))
            .await
            .map_err(|e| provider_error(e, ApiError::BadRequest))?;
        info!("Set role of user {} to {}", user_id, role);
        Ok(user)
    }
}
