//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for requisitions, purchasing, the warehouse ledger,
//!   budgets, and reports
//! - Shared application state
//! - Response types

pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use acopio_core::report::ReportCache;
use acopio_shared::config::BudgetConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Budget gate configuration (policy + report cache TTL).
    pub budget: BudgetConfig,
    /// TTL cache for stock report snapshots.
    pub report_cache: ReportCache,
}

impl AppState {
    /// Creates application state from a connection and configuration.
    #[must_use]
    pub fn new(db: DatabaseConnection, budget: BudgetConfig) -> Self {
        let report_cache = ReportCache::with_config(100, budget.report_cache_ttl_secs);
        Self {
            db: Arc::new(db),
            budget,
            report_cache,
        }
    }

    /// Returns a connection clone for repository construction.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        self.db.as_ref().clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
