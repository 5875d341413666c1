//! Identity provider seam and the authenticated user record it returns.

pub mod provider;
pub mod supabase;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use provider::{AdminCreateUser, IdentityError, IdentityProvider, Session, SignUp};
pub use supabase::SupabaseIdentityProvider;

/// Role assumed when no metadata location carries one.
pub const DEFAULT_ROLE: &str = "user";

/// User record as resolved by the identity provider.
///
/// Read-only to this service. Fields we do not interpret are kept in `extra`
/// so `/auth/me` can hand the provider record back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthenticatedUser {
    /// Effective role, first hit wins:
    /// `app_metadata.role`, top-level `role`, `user_metadata.role`, then `"user"`.
    ///
    /// Only non-empty strings count; any other value falls through. Never fails.
    pub fn resolved_role(&self) -> &str {
        [
            self.app_metadata.get("role"),
            self.role.as_ref(),
            self.user_metadata.get("role"),
        ]
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_ROLE)
    }
}
