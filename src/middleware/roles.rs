use tracing::warn;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;

/// Effective role of `user`. Never fails; falls back to `"user"`.
pub fn resolve_role(user: &AuthenticatedUser) -> &str {
    user.resolved_role()
}

/// Permit when `required` is empty or contains the user's resolved role.
pub fn authorize(user: &AuthenticatedUser, required: &[&str]) -> Result<(), ApiError> {
    if required.is_empty() {
        return Ok(());
    }

    let role = resolve_role(user);
    if required.contains(&role) {
        Ok(())
    } else {
        warn!(user = %user.id, role, required = ?required, "Insufficient role");
        Err(ApiError::forbidden("Insufficient role"))
    }
}

/// Static role requirement attached to a route through `Authorized<R>`.
pub trait RolePolicy: Send + Sync + 'static {
    const ROLES: &'static [&'static str];
}

/// Any authenticated user
pub struct Authenticated;

/// Regular members and administrators
pub struct Members;

/// Administrators only
pub struct AdminOnly;

impl RolePolicy for Authenticated {
    const ROLES: &'static [&'static str] = &[];
}

impl RolePolicy for Members {
    const ROLES: &'static [&'static str] = &["user", "admin"];
}

impl RolePolicy for AdminOnly {
    const ROLES: &'static [&'static str] = &["admin"];
}
