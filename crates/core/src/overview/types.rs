//! Overview types.

use chrono::NaiveDate;
use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyService;

/// Decimal places of the margin percentage.
pub const MARGIN_PRECISION: u32 = 1;

/// Revenue, costs and their difference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    /// Income.
    pub revenue: Decimal,
    /// Expenses, cost of sales included.
    pub costs: Decimal,
    /// `revenue - costs`.
    pub result: Decimal,
    /// Result as a percentage of revenue; absent unless revenue is positive.
    pub margin_pct: Option<Decimal>,
}

impl ProfitAndLoss {
    /// Builds the figures from revenue and costs.
    #[must_use]
    pub fn new(revenue: Decimal, costs: Decimal) -> Self {
        let result = revenue - costs;
        let margin_pct = if revenue > Decimal::ZERO {
            result
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|r| r.checked_div(revenue))
                .map(|m| CurrencyService::round(m, MARGIN_PRECISION))
        } else {
            None
        };
        Self {
            revenue,
            costs,
            result,
            margin_pct,
        }
    }
}

/// Profit and loss of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyResult {
    /// Month number, 1 to 12.
    pub month: u32,
    /// `YYYY-MM`.
    pub label: String,
    /// Income in the month.
    pub revenue: Decimal,
    /// Expenses in the month.
    pub costs: Decimal,
    /// `revenue - costs`.
    pub result: Decimal,
}

/// Year-to-date figures of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewFigures {
    /// Year-to-date profit and loss.
    pub profit_and_loss: ProfitAndLoss,
    /// One entry per month from January up to the reference month.
    pub months: Vec<MonthlyResult>,
    /// Open receivables (debtors), sum of positive residuals.
    pub receivables: Decimal,
    /// Open payables (creditors), sum of the magnitudes of negative residuals.
    pub payables: Decimal,
}

/// Figures of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOverview {
    /// Entity.
    pub entity_id: EntityId,
    /// Its figures.
    #[serde(flatten)]
    pub figures: OverviewFigures,
}

/// Group and per-entity financial overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialOverview {
    /// Calendar year covered.
    pub year: i32,
    /// First day of the year.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub as_of: NaiveDate,
    /// Sum over all available entities.
    pub consolidated: OverviewFigures,
    /// One entry per available entity, in registry order.
    pub entities: Vec<EntityOverview>,
}
