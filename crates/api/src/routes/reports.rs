//! Consolidated report endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use consolidator_core::report::{ConsolidatedReport, ReportService};
use consolidator_shared::AppError;
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Query parameters for the consolidated report.
#[derive(Debug, Deserialize)]
pub struct ConsolidatedQuery {
    /// Reference date, `YYYY-MM-DD`. Defaults to the configured date or today.
    pub as_of: Option<String>,
}

/// Parses the `as_of` parameter.
///
/// # Errors
///
/// Returns `AppError::Validation` for anything but an ISO calendar date.
pub fn parse_as_of(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("as_of must be YYYY-MM-DD, got '{raw}'")))
}

async fn get_consolidated(
    State(state): State<AppState>,
    Query(query): Query<ConsolidatedQuery>,
) -> Result<Json<ConsolidatedReport>, ApiError> {
    let as_of = match query.as_of.as_deref() {
        Some(raw) => parse_as_of(raw)?,
        None => state.analytics.resolve_as_of(Utc::now().date_naive()),
    };
    info!(as_of = %as_of, "Consolidated report requested");

    let report =
        ReportService::generate(state.source.as_ref(), &state.registry, &state.analytics, as_of)
            .await;
    Ok(Json(report))
}

/// Creates report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/consolidated", get(get_consolidated))
}
