use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::marker::PhantomData;

use super::auth::{extract_bearer_token, validate_token};
use super::roles::{authorize, RolePolicy};
use crate::auth::{AuthenticatedUser, IdentityProvider};
use crate::error::ApiError;
use crate::state::AppState;

/// Run the request guards in order, stopping at the first failure:
/// bearer extraction and token validation (401), then the role check (403).
pub async fn authorize_request(
    headers: &HeaderMap,
    provider: &dyn IdentityProvider,
    required: &[&str],
) -> Result<(AuthenticatedUser, String), ApiError> {
    let token = extract_bearer_token(headers)?;
    let user = validate_token(provider, &token).await?;
    authorize(&user, required)?;
    Ok((user, token))
}

/// A caller that passed every guard for policy `R`.
///
/// Handlers name the policy in their signature, e.g.
/// `Authorized<AdminOnly>`, and receive the validated user. The raw token is
/// kept for calls made back to the identity provider on the user's behalf.
pub struct Authorized<R: RolePolicy> {
    pub user: AuthenticatedUser,
    pub token: String,
    _policy: PhantomData<R>,
}

impl<R: RolePolicy> Authorized<R> {
    pub fn role(&self) -> &str {
        self.user.resolved_role()
    }
}

#[axum::async_trait]
impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    AppState: FromRef<S>,
    R: RolePolicy,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let (user, token) = authorize_request(&parts.headers, app.identity.as_ref(), R::ROLES).await?;

        Ok(Self {
            user,
            token,
            _policy: PhantomData,
        })
    }
}
