//! Weekly cash projection from open receivables and payables.

pub mod forecaster;
pub mod types;

#[cfg(test)]
mod tests;

pub use forecaster::CashflowForecaster;
pub use types::{CashflowBucket, CashflowForecast, CashflowOverview, ForecastScope};
