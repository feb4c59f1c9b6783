//! FraudGuard - Transaction Fraud Detection Service
//!
//! HTTP API flagging potentially fraudulent user activity. Each fraud-check
//! request fetches the user's transactions inside a trailing time window
//! and runs the pure multi-signal risk evaluator over that snapshot:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      FRAUDGUARD                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────────┐   ┌───────────────┐ │
//! │  │  API      │   │  Transaction   │   │  Risk         │ │
//! │  │  (Axum)   │──▶│  Source        │──▶│  Evaluator    │ │
//! │  │           │   │  (sqlx)        │   │  (pure)       │ │
//! │  └───────────┘   └───────┬────────┘   └───────────────┘ │
//! │                          ▼                               │
//! │                   ┌─────────────┐                        │
//! │                   │ PostgreSQL  │                        │
//! │                   └─────────────┘                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod fraud;
mod handlers;
mod models;

use anyhow::Context;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraudguard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("FraudGuard server starting...");
    tracing::info!(
        "Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/users/:user_id/fraud-check", get(handlers::fraud::check))
        .route(
            "/analytics/suspicious-activity",
            get(handlers::analytics::suspicious_activity),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
