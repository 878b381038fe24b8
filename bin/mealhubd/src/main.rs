//! `mealhubd` — the mealhub server binary.
//!
//! Usage:
//!   mealhubd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/mealhub/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use mealhub_core::{CalorieLedger, ContributionStats, Module, RecipeCatalog, UserDirectory};
use mealhub_sql::{SQLStore, SqliteStore};

use auth::AuthModule;
use auth::service::{AuthConfig, AuthService};
use family::FamilyModule;
use family::service::{FamilyConfig, FamilyService};
use recipe::RecipeModule;
use recipe::service::RecipeService;

use auth_middleware::JwtState;
use config::ServerConfig;

/// mealhub server.
#[derive(Parser, Debug)]
#[command(name = "mealhubd", about = "mealhub server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sql: Arc<dyn SQLStore> = Arc::new(
        SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Services, wired through the core collaborator traits. Auth owns
    // users, recipe owns recipes/engagement, family consumes both.
    let auth_service = AuthService::new(
        Arc::clone(&sql),
        AuthConfig {
            jwt_secret: server_config.jwt.secret.clone(),
            token_ttl: server_config.jwt.expire_secs,
        },
    )
    .map_err(|e| anyhow::anyhow!("auth service init: {}", e))?;
    info!("Auth service initialized");

    let directory: Arc<dyn UserDirectory> = auth_service.clone();
    let ledger: Arc<dyn CalorieLedger> = auth_service.clone();

    let recipe_service = RecipeService::new(
        Arc::clone(&sql),
        Arc::clone(&directory),
        Arc::clone(&ledger),
    )
    .map_err(|e| anyhow::anyhow!("recipe service init: {}", e))?;
    info!("Recipe service initialized");

    let catalog: Arc<dyn RecipeCatalog> = recipe_service.clone();
    let stats: Arc<dyn ContributionStats> = recipe_service.clone();

    let family_service = FamilyService::new(
        Arc::clone(&sql),
        Arc::clone(&directory),
        Arc::clone(&catalog),
        FamilyConfig {
            allow_duplicate_options: server_config.family.allow_duplicate_vote_options,
        },
    )
    .map_err(|e| anyhow::anyhow!("family service init: {}", e))?;
    info!("Family service initialized");

    let auth_module = AuthModule::new(auth_service, stats);
    let recipe_module = RecipeModule::new(recipe_service);
    let family_module = FamilyModule::new(family_service);

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (recipe_module.name(), recipe_module.routes()),
        (family_module.name(), family_module.routes()),
    ];

    let jwt_state = Arc::new(JwtState::new(&server_config.jwt.secret));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    let app = routes::build_router(jwt_state, module_routes).layer(cors);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("mealhub server listening on {}", cli.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
