//! Request guards: bearer token validation, role policies, JSON body extraction.

pub mod auth;
pub mod guard;
pub mod json;
pub mod roles;

pub use auth::{extract_bearer_token, token_fingerprint, validate_token};
pub use guard::{authorize_request, Authorized};
pub use json::JsonBody;
pub use roles::{authorize, resolve_role, AdminOnly, Authenticated, Members, RolePolicy};
