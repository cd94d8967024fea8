//! VAT (BTW) aggregation and risk classification.
//!
//! Each entity's VAT entries are summed per filing period and checked against
//! a fixed rule set. Missing data yields an incomplete position, never a zero.

pub mod analyzer;
pub mod period;
pub mod types;


pub use analyzer::VatAnalyzer;
pub use period::VatPeriod;
pub use types::{IncompleteReason, RiskCode, Severity, VatOverview, VatPosition};
