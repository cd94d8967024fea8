//! Consolidator API Server
//!
//! Serves consolidated group reports over the Odoo ledger.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consolidator_api::{AppState, create_router};
use consolidator_core::entity::EntityRegistry;
use consolidator_core::ledger::CachedLedgerSource;
use consolidator_erp::OdooLedgerSource;
use consolidator_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consolidator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.analytics.validate()?;

    let registry = EntityRegistry::from_config(&config.entities, &config.relationships)?;
    info!(
        entities = registry.entities().len(),
        relationships = registry.relationships().len(),
        "Entity registry loaded"
    );

    let odoo = OdooLedgerSource::new(&config.erp, &registry)?;
    info!(
        url = %config.erp.url,
        database = %config.erp.database,
        cache_ttl_secs = config.analytics.cache_ttl_secs,
        "ERP source configured"
    );
    let source = CachedLedgerSource::new(odoo, config.analytics.cache_ttl_secs);

    let state = AppState {
        source: Arc::new(source),
        registry: Arc::new(registry),
        analytics: Arc::new(config.analytics),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
