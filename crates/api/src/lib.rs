//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over the consolidated reporting facade
//! - The JSON error envelope

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use consolidator_core::entity::EntityRegistry;
use consolidator_core::ledger::LedgerSource;
use consolidator_shared::config::AnalyticsConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger data per entity, usually the cached ERP source.
    pub source: Arc<dyn LedgerSource>,
    /// Entities and relationships of the group.
    pub registry: Arc<EntityRegistry>,
    /// Engine thresholds and windows.
    pub analytics: Arc<AnalyticsConfig>,
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
