use axum::{
    extract::DefaultBodyLimit,
    http::{header::AUTHORIZATION, HeaderName, HeaderValue},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::handlers::public::auth::REFRESH_TOKEN_HEADER;
use crate::state::AppState;

/// Full router: public and protected routes plus the global layers.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(public::health_get))
        .merge(auth_public_routes())
        .merge(auth_routes())
        .merge(plot_routes())
        .merge(harvest_routes())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if let Some(cors) = cors_layer(config) {
        router = router.layer(cors);
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(public::auth_register))
        .route("/auth/login", post(public::auth_login))
        .route("/auth/login/google", get(public::auth_login_google))
        .route("/auth/recover-password", post(public::auth_recover_password))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(protected::auth_me))
        .route("/auth/update-password", patch(protected::auth_update_password))
        .route("/auth/logout", post(protected::auth_logout))
        .route("/auth/test/user", get(protected::auth_test_user))
        .route("/auth/admin/users", post(protected::auth_admin_create_user))
        .route("/auth/admin/role", patch(protected::auth_set_role))
}

fn plot_routes() -> Router<AppState> {
    Router::new()
        .route("/plots", get(protected::plots_get).post(protected::plots_post))
        .route(
            "/plots/:id",
            get(protected::plot_get)
                .patch(protected::plot_patch)
                .delete(protected::plot_delete),
        )
        .route("/plots/:id/summary", get(protected::plot_summary_get))
}

fn harvest_routes() -> Router<AppState> {
    Router::new()
        .route("/harvests", get(protected::harvests_get).post(protected::harvests_post))
        .route("/harvests/plot/:plot_id", get(protected::harvests_by_plot_get))
}

/// CORS per `SECURITY_*` settings. `*` or an empty origin list allows any
/// origin. The session headers set by login are exposed to browsers.
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins = &config.security.cors_origins;
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([AUTHORIZATION, HeaderName::from_static(REFRESH_TOKEN_HEADER)]),
    )
}
