//! Intercompany current-account (R/C) reconciliation.
//!
//! For every configured relationship the engine compares both entities' view
//! of their shared balance. The two views should cancel out; a remainder above
//! the tolerance is a break, reported and never raised.

pub mod engine;
pub mod types;


pub use engine::ReconciliationEngine;
pub use types::{Completeness, IntercompanyPosition, ReconciliationResult};
