//! Year-to-date financial overview.
//!
//! Revenue, costs, result and margin per month, plus debtor and creditor
//! totals from the open items, per entity and for the group.

pub mod calculator;
pub mod types;

#[cfg(test)]
mod tests;

pub use calculator::OverviewCalculator;
pub use types::{
    EntityOverview, FinancialOverview, MonthlyResult, OverviewFigures, ProfitAndLoss,
};
