use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::provider::{AdminCreateUser, IdentityError, IdentityProvider, Session, SignUp};
use super::AuthenticatedUser;
use crate::config::IdentityConfig;

/// Client for a Supabase (GoTrue) auth server at `{url}/auth/v1/`.
///
/// Public calls carry the anon key; admin calls carry the service-role key,
/// which is optional so that deployments without admin routes can omit it.
#[derive(Clone)]
pub struct SupabaseIdentityProvider {
    client: Client,
    base: Url,
    anon_key: String,
    service_role_key: Option<String>,
    oauth_redirect_url: Option<String>,
}

impl std::fmt::Debug for SupabaseIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseIdentityProvider")
            .field("base", &self.base.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("service_role_key", &self.service_role_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SupabaseIdentityProvider {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let url = config.url.as_deref().ok_or(IdentityError::NotConfigured("SUPABASE_URL"))?;
        let anon_key = config
            .anon_key
            .clone()
            .ok_or(IdentityError::NotConfigured("SUPABASE_ANON_KEY"))?;

        let base = Self::auth_base(url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            anon_key,
            service_role_key: config.service_role_key.clone(),
            oauth_redirect_url: config.oauth_redirect_url.clone(),
        })
    }

    fn auth_base(project_url: &str) -> Result<Url, IdentityError> {
        let trimmed = project_url.trim_end_matches('/');
        Url::parse(&format!("{}/auth/v1/", trimmed))
            .map_err(|e| IdentityError::UnexpectedResponse(format!("invalid SUPABASE_URL: {}", e)))
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base
            .join(path)
            .map_err(|e| IdentityError::UnexpectedResponse(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// `admin/users/{id}` with the id pushed as a single encoded segment.
    fn user_endpoint(&self, user_id: &str) -> Result<Url, IdentityError> {
        let mut url = self.endpoint("admin/users")?;
        url.path_segments_mut()
            .map_err(|_| IdentityError::UnexpectedResponse("identity base URL cannot carry a path".to_string()))?
            .push(user_id);
        Ok(url)
    }

    fn service_role_key(&self) -> Result<&str, IdentityError> {
        self.service_role_key
            .as_deref()
            .ok_or(IdentityError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))
    }

    /// Request authorized as the project (anon key), optionally on behalf of a user.
    fn public(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let builder = builder.header("apikey", &self.anon_key);
        match access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder.bearer_auth(&self.anon_key),
        }
    }

    fn admin(&self, builder: RequestBuilder) -> Result<RequestBuilder, IdentityError> {
        let key = self.service_role_key()?;
        Ok(builder.header("apikey", key).bearer_auth(key))
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, IdentityError> {
        let response = Self::checked(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))
    }

    async fn send_empty(builder: RequestBuilder) -> Result<(), IdentityError> {
        Self::checked(builder).await.map(|_| ())
    }

    async fn checked(builder: RequestBuilder) -> Result<reqwest::Response, IdentityError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Rejected {
            status: status.as_u16(),
            message: Self::error_message(status, &body),
        })
    }

    /// GoTrue reports errors under several keys depending on version and endpoint.
    fn error_message(status: StatusCode, body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                ["error_description", "msg", "message", "error"]
                    .into_iter()
                    .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("identity provider error")
                    .to_string()
            })
    }

    /// Signup answers with a bare user, or with a session wrapping it when
    /// email confirmation is disabled.
    fn user_from_signup(body: Value) -> Result<AuthenticatedUser, IdentityError> {
        let user = match body.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => body,
        };
        serde_json::from_value(user).map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn sign_up(&self, input: SignUp) -> Result<AuthenticatedUser, IdentityError> {
        let url = self.endpoint("signup")?;
        let body = json!({
            "email": input.email,
            "password": input.password,
            "data": { "full_name": input.full_name },
        });

        let raw: Value = Self::send_json(self.public(self.client.post(url), None).json(&body)).await?;
        Self::user_from_signup(raw)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = json!({ "email": email, "password": password });

        Self::send_json(self.public(self.client.post(url), None).json(&body)).await
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let url = self.endpoint("user")?;
        let raw: Value = Self::send_json(self.public(self.client.get(url), Some(access_token))).await?;
        if raw.is_null() {
            return Ok(None);
        }
        serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| IdentityError::UnexpectedResponse(e.to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = self.endpoint("logout")?;
        Self::send_empty(self.public(self.client.post(url), Some(access_token))).await
    }

    async fn recover_password(&self, email: &str) -> Result<(), IdentityError> {
        let url = self.endpoint("recover")?;
        let body = json!({ "email": email });
        Self::send_empty(self.public(self.client.post(url), None).json(&body)).await
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<AuthenticatedUser, IdentityError> {
        let url = self.endpoint("user")?;
        let body = json!({ "password": password });
        Self::send_json(self.public(self.client.put(url), Some(access_token)).json(&body)).await
    }

    async fn admin_create_user(&self, input: AdminCreateUser) -> Result<AuthenticatedUser, IdentityError> {
        let url = self.endpoint("admin/users")?;

        let mut user_metadata = serde_json::Map::new();
        if let Some(full_name) = input.full_name {
            user_metadata.insert("full_name".to_string(), Value::String(full_name));
        }
        let mut app_metadata = serde_json::Map::new();
        if let Some(role) = input.role {
            app_metadata.insert("role".to_string(), Value::String(role.to_string()));
        }

        let body = json!({
            "email": input.email,
            "password": input.password,
            "email_confirm": input.email_confirm,
            "user_metadata": user_metadata,
            "app_metadata": app_metadata,
        });

        Self::send_json(self.admin(self.client.post(url))?.json(&body)).await
    }

    async fn admin_update_user_by_id(&self, user_id: &str, attributes: Value) -> Result<AuthenticatedUser, IdentityError> {
        let url = self.user_endpoint(user_id)?;
        Self::send_json(self.admin(self.client.put(url))?.json(&attributes)).await
    }

    fn oauth_authorize_url(&self, provider: &str) -> Result<String, IdentityError> {
        let mut url = self.endpoint("authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            if let Some(redirect) = &self.oauth_redirect_url {
                query.append_pair("redirect_to", redirect);
            }
        }
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn provider(url: &str) -> SupabaseIdentityProvider {
        let mut config = AppConfig::development().identity;
        config.url = Some(url.to_string());
        config.anon_key = Some("anon".to_string());
        SupabaseIdentityProvider::from_config(&config).unwrap()
    }

    #[test]
    fn requires_url_and_anon_key() {
        let config = AppConfig::development().identity;
        let err = SupabaseIdentityProvider::from_config(&config).unwrap_err();
        assert!(matches!(err, IdentityError::NotConfigured("SUPABASE_URL")));
    }

    #[test]
    fn endpoints_hang_off_auth_v1() {
        let p = provider("https://project.supabase.co/");
        assert_eq!(p.endpoint("token").unwrap().as_str(), "https://project.supabase.co/auth/v1/token");
        assert_eq!(
            p.endpoint("admin/users/abc").unwrap().as_str(),
            "https://project.supabase.co/auth/v1/admin/users/abc"
        );
    }

    #[test]
    fn user_ids_cannot_leave_the_admin_users_path() {
        let p = provider("https://project.supabase.co/");
        let url = p.user_endpoint("../../../rest/v1/profiles?id=eq.1").unwrap();
        assert!(url.path().starts_with("/auth/v1/admin/users/"), "{}", url);
        assert_eq!(url.path_segments().unwrap().count(), 5);
        assert_eq!(url.query(), None);

        let id = "0f8a1d2e-3c4b-4a5d-8e6f-7a8b9c0d1e2f";
        assert_eq!(
            p.user_endpoint(id).unwrap().as_str(),
            format!("https://project.supabase.co/auth/v1/admin/users/{}", id)
        );
    }

    #[test]
    fn oauth_url_carries_provider_and_redirect() {
        let mut config = AppConfig::development().identity;
        config.url = Some("https://project.supabase.co".to_string());
        config.anon_key = Some("anon".to_string());
        config.oauth_redirect_url = Some("http://localhost:5173/callback".to_string());
        let p = SupabaseIdentityProvider::from_config(&config).unwrap();

        let url = p.oauth_authorize_url("google").unwrap();
        assert!(url.starts_with("https://project.supabase.co/auth/v1/authorize?provider=google"));
        assert!(url.contains("redirect_to=http%3A%2F%2Flocalhost%3A5173%2Fcallback"));
    }

    #[test]
    fn admin_calls_need_service_role_key() {
        let p = provider("https://project.supabase.co");
        assert!(matches!(
            p.service_role_key(),
            Err(IdentityError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))
        ));
    }

    #[test]
    fn picks_first_known_error_key() {
        let msg = SupabaseIdentityProvider::error_message(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(msg, "Invalid login credentials");

        let msg = SupabaseIdentityProvider::error_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"msg":"User already registered"}"#);
        assert_eq!(msg, "User already registered");

        let msg = SupabaseIdentityProvider::error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(msg, "Bad Gateway");
    }

    #[test]
    fn signup_unwraps_session_shape() {
        let user = SupabaseIdentityProvider::user_from_signup(json!({
            "access_token": "t",
            "user": { "id": "u1", "email": "a@b.co" }
        }))
        .unwrap();
        assert_eq!(user.id, "u1");

        let user = SupabaseIdentityProvider::user_from_signup(json!({ "id": "u2" })).unwrap();
        assert_eq!(user.id, "u2");
    }
}
