//! HTTP server for the trade API
//!
//! Provides:
//! - Read endpoints over both backends (/api/data for the snapshot,
//!   /api/trades for the relational store)
//! - Create/update/delete against the relational store
//! - Health checks

pub mod handlers;

use crate::error::{AppError, Result};
use crate::store::{SnapshotStore, SqliteDb};
use axum::{
    routing::{get, patch},
    Router,
};
use handlers::ApiState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// API server manager
pub struct ApiServer {
    state: Arc<ApiState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Create a new server over the two storage backends
    pub fn new(snapshot: Arc<SnapshotStore>, db: Arc<SqliteDb>) -> Self {
        Self {
            state: Arc::new(ApiState { snapshot, db }),
            shutdown_tx: None,
        }
    }

    /// Build the router with all routes and middleware
    fn router(&self) -> Router {
        // Allow all origins for local development
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(handlers::healthz))
            .route("/healthz", get(handlers::healthz))
            // Snapshot backend (read-only)
            .route("/api/data", get(handlers::list_snapshot))
            .route("/api/data/trade-codes", get(handlers::snapshot_trade_codes))
            // Relational backend (read/write)
            .route(
                "/api/trades",
                get(handlers::list_trades).post(handlers::create_trade),
            )
            .route(
                "/api/trades/:id",
                patch(handlers::update_trade).delete(handlers::delete_trade),
            )
            .route("/api/trade-codes", get(handlers::trade_codes))
            .with_state(self.state.clone())
            .layer(cors)
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    pub async fn start(&mut self, host: &str, port: u16) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid address: {}", e)))?;

        let app = self.router();

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting trade API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        // Spawn server task
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        info!("Trade API server started successfully");
        info!("  GET    http://{}:{}/healthz", host, port);
        info!("  GET    http://{}:{}/api/data", host, port);
        info!("  GET    http://{}:{}/api/data/trade-codes", host, port);
        info!("  GET    http://{}:{}/api/trades", host, port);
        info!("  POST   http://{}:{}/api/trades", host, port);
        info!("  PATCH  http://{}:{}/api/trades/{{id}}", host, port);
        info!("  DELETE http://{}:{}/api/trades/{{id}}", host, port);
        info!("  GET    http://{}:{}/api/trade-codes", host, port);

        Ok(())
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}
