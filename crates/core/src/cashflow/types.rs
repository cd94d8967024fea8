//! Cashflow types.

use chrono::NaiveDate;
use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whose cash a forecast projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastScope {
    /// All available entities together.
    Consolidated,
    /// A single entity.
    Entity(EntityId),
}

/// One week of projected cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowBucket {
    /// Scope of the forecast the bucket belongs to.
    pub scope: ForecastScope,
    /// Zero-based week number.
    pub week_index: u32,
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Last day of the week.
    pub week_end: NaiveDate,
    /// Sum of positive residuals.
    pub inflow: Decimal,
    /// Sum of the magnitudes of negative residuals.
    pub outflow: Decimal,
    /// `inflow - outflow`.
    pub net: Decimal,
    /// Balance after this week.
    pub running_balance: Decimal,
}

/// A weekly cash projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowForecast {
    /// Whose cash is projected.
    pub scope: ForecastScope,
    /// Projection start.
    pub as_of: NaiveDate,
    /// Bank balance the running balance starts from.
    pub opening_balance: Decimal,
    /// Weekly buckets, `week_index` 0 upward without gaps.
    pub buckets: Vec<CashflowBucket>,
    /// Net of items due after the last bucket.
    pub beyond_horizon: Decimal,
    /// Inflow part of `beyond_horizon`.
    pub beyond_horizon_inflow: Decimal,
    /// Outflow part of `beyond_horizon`.
    pub beyond_horizon_outflow: Decimal,
    /// Lowest running balance over the horizon, or the opening balance.
    pub lowest_running_balance: Decimal,
    /// First week whose running balance is negative.
    pub first_shortfall_week: Option<u32>,
}

impl CashflowForecast {
    /// Closing balance after the last bucket.
    #[must_use]
    pub fn closing_balance(&self) -> Decimal {
        self.buckets
            .last()
            .map_or(self.opening_balance, |b| b.running_balance)
    }
}

/// Consolidated and per-entity forecasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowOverview {
    /// Forecast over all available entities.
    pub consolidated: CashflowForecast,
    /// One forecast per available entity, in registry order.
    pub entities: Vec<CashflowForecast>,
}
