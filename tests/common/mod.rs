#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use plot_harvest_api::auth::{
    AdminCreateUser, AuthenticatedUser, IdentityError, IdentityProvider, Session, SignUp,
};
use plot_harvest_api::config::AppConfig;
use plot_harvest_api::database::MemoryFarmStore;
use plot_harvest_api::routes;
use plot_harvest_api::state::AppState;

pub const ADMIN: &str = "admin-token";
pub const USER: &str = "user-token";
pub const NO_ROLE: &str = "norole-token";
pub const MANAGER: &str = "manager-token";
/// Role only present in the user-editable metadata
pub const METADATA_ADMIN: &str = "metadata-admin-token";

/// Provider user ids are UUIDs
pub const MEMBER_ID: &str = "0f8a1d2e-3c4b-4a5d-8e6f-7a8b9c0d1e2f";
/// Id the provider answers "User not found" for
pub const MISSING_USER_ID: &str = "5d6c7b8a-0000-4000-8000-000000000000";

pub const GOOD_PASSWORD: &str = "correct-horse";

/// Identity provider double with a fixed set of known tokens.
/// Records the calls that change provider state.
#[derive(Default)]
pub struct StubIdentity {
    pub calls: Mutex<Vec<String>>,
}

impl StubIdentity {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn user(raw: Value) -> AuthenticatedUser {
        serde_json::from_value(raw).unwrap()
    }

    pub fn user_for(token: &str) -> Option<AuthenticatedUser> {
        let raw = match token {
            ADMIN => json!({
                "id": "admin-1",
                "email": "admin@farm.io",
                "aud": "authenticated",
                "role": "authenticated",
                "app_metadata": { "role": "admin" },
                "user_metadata": {}
            }),
            USER => json!({
                "id": "user-1",
                "email": "user@farm.io",
                "aud": "authenticated",
                "app_metadata": { "role": "user" },
                "user_metadata": { "full_name": "Ana Lima" }
            }),
            NO_ROLE => json!({ "id": "norole-1", "email": "plain@farm.io" }),
            MANAGER => json!({ "id": "manager-1", "app_metadata": { "role": "manager" } }),
            METADATA_ADMIN => json!({ "id": "meta-1", "user_metadata": { "role": "admin" } }),
            _ => return None,
        };
        Some(Self::user(raw))
    }

    fn rejected(message: &str) -> IdentityError {
        IdentityError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_up(&self, input: SignUp) -> Result<AuthenticatedUser, IdentityError> {
        if input.email == "taken@farm.io" {
            return Err(Self::rejected("User already registered"));
        }
        self.record(format!("sign_up:{}", input.email));
        Ok(Self::user(json!({
            "id": "new-1",
            "email": input.email,
            "user_metadata": { "full_name": input.full_name }
        })))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        if email != "user@farm.io" || password != GOOD_PASSWORD {
            return Err(Self::rejected("Invalid login credentials"));
        }
        Ok(Session {
            access_token: USER.to_string(),
            refresh_token: "refresh-1".to_string(),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            user: Self::user_for(USER),
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthenticatedUser>, IdentityError> {
        match Self::user_for(access_token) {
            Some(user) => Ok(Some(user)),
            None if access_token == "empty-token" => Ok(None),
            None => Err(IdentityError::Rejected {
                status: 401,
                message: "invalid JWT".to_string(),
            }),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.record(format!("sign_out:{}", access_token));
        Ok(())
    }

    async fn recover_password(&self, email: &str) -> Result<(), IdentityError> {
        self.record(format!("recover:{}", email));
        Ok(())
    }

    async fn update_password(&self, access_token: &str, _password: &str) -> Result<AuthenticatedUser, IdentityError> {
        self.record(format!("update_password:{}", access_token));
        Self::user_for(access_token).ok_or_else(|| Self::rejected("invalid JWT"))
    }

    async fn admin_create_user(&self, input: AdminCreateUser) -> Result<AuthenticatedUser, IdentityError> {
        self.record(format!("admin_create_user:{}", input.email));
        let role = input.role.map(|r| r.to_string());
        Ok(Self::user(json!({
            "id": "created-1",
            "email": input.email,
            "app_metadata": { "role": role },
            "user_metadata": { "full_name": input.full_name }
        })))
    }

    async fn admin_update_user_by_id(&self, user_id: &str, attributes: Value) -> Result<AuthenticatedUser, IdentityError> {
        if user_id == MISSING_USER_ID {
            return Err(Self::rejected("User not found"));
        }
        self.record(format!("admin_update:{}:{}", user_id, attributes));
        Ok(Self::user(json!({
            "id": user_id,
            "app_metadata": attributes["app_metadata"].clone()
        })))
    }

    fn oauth_authorize_url(&self, provider: &str) -> Result<String, IdentityError> {
        Ok(format!("https://idp.test/auth/v1/authorize?provider={}", provider))
    }
}

/// Router served on a free local port with an in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub identity: Arc<StubIdentity>,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let identity = Arc::new(StubIdentity::default());
        let state = AppState::new(Arc::new(MemoryFarmStore::new()), identity.clone());

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let app = routes::app(state, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            identity,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.get(self.url(path)), token)
    }

    pub fn post(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.post(self.url(path)), token)
    }

    pub fn patch(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.patch(self.url(path)), token)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.delete(self.url(path)), token)
    }

    /// Create a plot as admin and return its JSON
    pub async fn create_plot(&self, name: &str, area: f64) -> Result<Value> {
        let res = self
            .post("/plots", Some(ADMIN))
            .json(&json!({ "name": name, "area": area }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create plot: {}", res.status());
        Ok(res.json().await?)
    }

    /// Record a harvest as admin and return its JSON
    pub async fn create_harvest(&self, plot_id: &str, date: &str, weight_kg: f64) -> Result<Value> {
        let res = self
            .post("/harvests", Some(ADMIN))
            .json(&json!({ "plotId": plot_id, "date": date, "weightKg": weight_kg }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create harvest: {}", res.status());
        Ok(res.json().await?)
    }
}

fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}
