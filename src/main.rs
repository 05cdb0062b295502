//! Schoollibrary Server - school library catalog and lending

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schoollibrary_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{
        credentials::ProcessVerifier, csrf::CsrfService, hooks::resolve_hook, roster::ProcessRoster,
        Services,
    },
    AppState,
};

/// How often the CSRF rotation task checks whether a rotation is due
const ROTATION_TICK: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("schoollibrary_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Schoollibrary Server v{}", env!("CARGO_PKG_VERSION"));

    let repository = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations completed");

            Repository::new(pool)
        }
        None => {
            tracing::warn!("No database configured, books are kept in memory");
            Repository::in_memory()
        }
    };

    // External hooks
    let timeout = Duration::from_secs(config.hooks.timeout_secs);
    let auth_hook = resolve_hook(&config.hooks.auth_local, &config.hooks.auth_system);
    let users_hook = resolve_hook(&config.hooks.users_local, &config.hooks.users_system);
    tracing::info!(auth = %auth_hook.display(), users = %users_hook.display(), "Using hooks");

    // CSRF secrets rotate for the lifetime of the process
    let csrf = Arc::new(CsrfService::new(
        Duration::from_secs(config.csrf.rotation_hours * 60 * 60),
        Utc::now(),
    ));
    csrf.clone().spawn_rotation(ROTATION_TICK);

    let services = Services::new(
        repository,
        Arc::new(ProcessVerifier::new(auth_hook, timeout)),
        Arc::new(ProcessRoster::new(users_hook, timeout)),
        csrf,
        &config,
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
