use std::sync::Arc;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pool_db::capture;
use pool_db::common::AppState;
use pool_db::config::Config;
use pool_db::routes;
use pool_db::sensors::MockSensors;
use pool_db::store::settings::{SettingName, SettingValue, SettingsStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pool_db=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting pool-db...");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        deployment = ?config.deployment,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    // Connect to database (fail-fast)
    tracing::info!(url = %config.database_url, "Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations completed");

    // Load settings; a schema-version mismatch is fatal here
    let mut settings = SettingsStore::load(&db).await?;
    settings
        .update(
            &db,
            SettingName::StartUpTime,
            SettingValue::Int(chrono::Utc::now().timestamp()),
        )
        .await?;
    tracing::info!("Settings loaded");

    // Create application state with the mock sensor hub
    let state = AppState::new(db, config.clone(), settings, Arc::new(MockSensors));

    // Spawn the background capture task (fire-and-forget, non-blocking)
    tracing::info!("Spawning reading capture scheduler...");
    tokio::spawn(capture::scheduler::run_reading_capture(state.clone()));

    // Build router
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
