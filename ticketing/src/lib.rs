//! Ticket inventory service.
//!
//! Sells tickets for events without overselling, even with many purchasers
//! racing for the last units across several service instances that share one
//! `PostgreSQL` database.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum, ticketbooth-web)
//!   │  JSON in/out, {code, message} errors, correlation ids, metrics
//!   ▼
//! TicketInventory (ticketbooth-core)
//!   │  validation, (event, type) lookup, error classification
//!   ▼
//! PostgresTicketStore (ticketbooth-postgres)
//!      single conditional UPDATE per purchase
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::from_env()?;
//! let app = TicketingApp::new(config).await?;
//! app.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod metrics;
pub mod server;

pub use config::{Config, ConfigError};
pub use server::{build_router, AppState};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use ticketbooth_core::{PurchasePolicy, TicketInventory};
use ticketbooth_postgres::PostgresTicketStore;
use tracing::info;

/// Fully initialised service: database pool, inventory and router.
pub struct TicketingApp {
    config: Config,
    store: PostgresTicketStore,
    router: axum::Router,
}

impl TicketingApp {
    /// Connect to the database, apply migrations and build the router.
    ///
    /// Also installs the Prometheus exporter when metrics are enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect, a migration fails or the
    /// metrics exporter cannot be installed.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db = &config.database;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .min_connections(db.min_connections)
            .acquire_timeout(db.connect_timeout())
            .idle_timeout(db.idle_timeout())
            .connect(&db.url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        info!(
            max_connections = db.max_connections,
            "Connected to PostgreSQL"
        );

        let store = PostgresTicketStore::from_pool(pool);
        if db.run_migrations {
            store.migrate().await.context("Failed to run migrations")?;
            info!("Migrations applied");
        }

        if config.metrics.enabled {
            crate::metrics::install_exporter(&config.metrics)?;
        }

        let inventory = TicketInventory::with_policy(
            Arc::new(store.clone()),
            PurchasePolicy {
                max_quantity_per_purchase: config.inventory.max_tickets_per_purchase,
            },
        );
        let router = build_router(AppState::new(inventory));

        Ok(Self {
            config,
            store,
            router,
        })
    }

    /// Serve HTTP until shutdown, then close the database pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.server.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(address = %addr, "HTTP server listening");

        lifecycle::serve(
            listener,
            self.router,
            self.config.server.shutdown_timeout(),
        )
        .await?;

        self.store.pool().close().await;
        info!("Database pool closed, shutdown complete");
        Ok(())
    }
}
