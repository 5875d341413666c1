use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::AuthenticatedUser;
use crate::types::Role;

/// Errors from the hosted identity provider
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing identity provider configuration: {0}")]
    NotConfigured(&'static str),

    /// The provider answered and said no (bad credentials, expired token, ...).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected identity provider response: {0}")]
    UnexpectedResponse(String),
}

/// Self-service registration
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Tokens issued by a successful password sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

/// Account creation with the service-role key
#[derive(Debug, Clone)]
pub struct AdminCreateUser {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub email_confirm: bool,
}

/// Operations this service needs from the identity provider. Every call is a
/// single request/response; nothing is cached or retried.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, input: SignUp) -> Result<AuthenticatedUser, IdentityError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Resolve an access token. `Ok(None)` means the provider answered without a user.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthenticatedUser>, IdentityError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    async fn recover_password(&self, email: &str) -> Result<(), IdentityError>;

    async fn update_password(&self, access_token: &str, password: &str) -> Result<AuthenticatedUser, IdentityError>;

    async fn admin_create_user(&self, input: AdminCreateUser) -> Result<AuthenticatedUser, IdentityError>;

    /// Patch arbitrary user attributes (`app_metadata`, `email`, ...) by id.
    async fn admin_update_user_by_id(&self, user_id: &str, attributes: Value) -> Result<AuthenticatedUser, IdentityError>;

    /// Where to send the browser to start an OAuth sign-in with `provider`.
    fn oauth_authorize_url(&self, provider: &str) -> Result<String, IdentityError>;
}
