use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::SupabaseIdentityProvider;
use crate::config::config;
use crate::database::{DatabaseManager, FarmStore, MemoryFarmStore, PgFarmStore};
use crate::routes;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT / API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep plots and harvests in memory instead of PostgreSQL")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config();
    info!("Starting plot-harvest-api in {:?} mode", config.environment);

    if args.memory && crate::is_production!() {
        anyhow::bail!("--memory is not allowed in production");
    }

    let store: Arc<dyn FarmStore> = if args.memory {
        warn!("Using in-memory store; data is lost on shutdown");
        Arc::new(MemoryFarmStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool)
                .await
                .context("failed to apply migrations")?;
        }
        Arc::new(PgFarmStore::new(pool))
    };

    let identity = SupabaseIdentityProvider::from_config(&config.identity)
        .context("identity provider is not configured")?;

    let app = routes::app(AppState::new(store, Arc::new(identity)), config);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
