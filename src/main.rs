//! Service entry point
//!
//! `tradebook` serves the API; `tradebook import <file>` bulk-loads a
//! trade file into the relational store and exits.

use std::path::PathBuf;
use std::sync::Arc;

use tradebook::config::AppConfig;
use tradebook::ingest;
use tradebook::server::ApiServer;
use tradebook::store::{SnapshotStore, SqliteDb};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradebook=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("import") {
        let file = args
            .get(2)
            .map(PathBuf::from)
            .unwrap_or_else(|| config.snapshot_file());

        let db = SqliteDb::new(&config.database_path)?;
        ingest::import_file(&db, &file)?;
        return Ok(());
    }

    tracing::info!("Starting tradebook...");

    let db = Arc::new(SqliteDb::new(&config.database_path)?);
    let snapshot = Arc::new(SnapshotStore::new(config.snapshot_file()));

    let mut server = ApiServer::new(snapshot, db);
    server.start(&config.host, config.port).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.stop();

    Ok(())
}
