//! Reconciliation types.

use chrono::NaiveDate;
use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much one side of a position is backed by data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// The side has intercompany records for the counterparty.
    Reported,
    /// The fetch succeeded but found nothing; the zero balance is real.
    NoRecords,
    /// The fetch failed; the zero balance is a placeholder.
    Unavailable,
}

/// One relationship's current-account position as seen from both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntercompanyPosition {
    /// First entity of the relationship.
    pub entity_a: EntityId,
    /// Second entity of the relationship.
    pub entity_b: EntityId,
    /// What A's books say B owes A.
    pub balance_a_view: Decimal,
    /// What B's books say A owes B.
    pub balance_b_view: Decimal,
    /// `balance_a_view + balance_b_view`; zero when the books agree.
    pub difference: Decimal,
    /// True when `|difference|` exceeds the tolerance and both sides are known.
    pub is_break: bool,
    /// Data coverage of A's side.
    pub completeness_a: Completeness,
    /// Data coverage of B's side.
    pub completeness_b: Completeness,
    /// Report date.
    pub as_of_date: NaiveDate,
}

impl IntercompanyPosition {
    /// Returns true if either side could not be fetched.
    #[must_use]
    pub fn is_unverifiable(&self) -> bool {
        self.completeness_a == Completeness::Unavailable
            || self.completeness_b == Completeness::Unavailable
    }
}

/// Output of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Report date.
    pub as_of: NaiveDate,
    /// Tolerance the breaks were judged against.
    pub tolerance: Decimal,
    /// One position per configured relationship, in registry order.
    pub positions: Vec<IntercompanyPosition>,
    /// Sum of every position's difference; zero for a consistent group.
    pub group_net: Decimal,
    /// Number of positions flagged as breaks.
    pub breaks: usize,
}
