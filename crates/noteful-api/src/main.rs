use std::net::SocketAddr;

use tracing::info;

use noteful_api::{build_router, config::StorageBackend, telemetry, AppState, ServerConfig};
use noteful_db::{log_pool_metrics, Database, MemoryStore, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let _log_guard = telemetry::init(&config.log);

    info!(
        log_format = ?config.log.format,
        log_file = ?config.log.file,
        "Logging initialized"
    );

    let (repos, db) = match config.storage {
        StorageBackend::Postgres => {
            let pool_config = PoolConfig::new().max_connections(config.max_connections);
            let db = Database::connect_with_config(&config.database_url, pool_config).await?;
            if config.run_migrations {
                db.migrate().await?;
                info!(subsystem = "db", "Migrations applied");
            }
            log_pool_metrics(db.pool());
            (db.repositories(), Some(db))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            (MemoryStore::new().repositories(), None)
        }
    };

    let app = build_router(AppState::new(repos), &config.http);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server stopped");

    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
