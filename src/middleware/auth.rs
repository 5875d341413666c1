use axum::http::{header::AUTHORIZATION, HeaderMap};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::auth::{AuthenticatedUser, IdentityProvider};
use crate::error::ApiError;

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::unauthorized("Missing bearer token")),
    }
}

/// Resolve `token` to a user through the identity provider.
///
/// Fails closed: a provider error, a transport failure and an empty answer
/// all come back as `Unauthorized`. Nothing is cached between requests.
pub async fn validate_token(
    provider: &dyn IdentityProvider,
    token: &str,
) -> Result<AuthenticatedUser, ApiError> {
    match provider.get_user(token).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            warn!(token = %token_fingerprint(token), "Identity provider returned no user");
            Err(ApiError::unauthorized("Invalid token"))
        }
        Err(e) => {
            warn!(token = %token_fingerprint(token), "Token rejected: {}", e);
            Err(ApiError::unauthorized("Invalid token"))
        }
    }
}

/// Short stable identifier for a token so logs can correlate requests
/// without recording the credential itself.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}
