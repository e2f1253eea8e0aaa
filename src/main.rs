//! Film catalog backend
//!
//! Entry point: loads configuration, opens the database and serves REST at /rest and
//! GraphQL at /graphql.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use film_catalog::config::{Config, LogFormat};
use film_catalog::db::Database;
use film_catalog::services::LogMailer;
use film_catalog::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(config.log_format);
    tracing::info!("Starting film catalog");

    ensure_database_dir(&config.database_url)?;
    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    let sync = db.sync_schema().await?;
    tracing::info!(
        tables_created = sync.tables_created.len(),
        "Database connected and schema synchronized"
    );

    let mailer = Arc::new(LogMailer::new(config.mail_from.clone()));
    let addr = config.bind_addr();
    let app = build_app(AppState::new(&config, db, mailer));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://{}/graphql", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "film_catalog=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Create the directory holding the SQLite file, if any
fn ensure_database_dir(database_url: &str) -> anyhow::Result<()> {
    let path = database_url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
