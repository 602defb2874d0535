//! Libris application library
//!
//! Wires the catalog modules onto the kernel: database, migrations, module
//! lifecycle, and the HTTP server.

use std::time::Duration;

use anyhow::Context;
use libris_db::Database;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Open the configured SQLite database
pub fn open_database(settings: &Settings) -> anyhow::Result<Database> {
    Database::open(
        &settings.database.path,
        Duration::from_millis(settings.database.busy_timeout_ms),
    )
    .with_context(|| format!("failed to open database '{}'", settings.database.path))
}

/// Register all modules, apply their migrations, and initialize them
pub async fn bootstrap(settings: &Settings, db: &Database) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;

    registry.run_migrations(db).await?;

    let ctx = InitCtx { settings, db };
    registry.init_modules(&ctx).await?;

    Ok(registry)
}

/// Run the service until ctrl-c or SIGTERM
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path,
        "libris bootstrap starting"
    );

    let db = open_database(&settings)?;
    let registry = bootstrap(&settings, &db).await?;

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.start_modules(&ctx).await?;

    tracing::info!(modules = registry.len(), "libris bootstrap complete");

    let served = libris_http::start_server(&registry, &settings, shutdown_signal()).await;
    registry.stop_modules().await?;
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received");
}
