//! Per-entity fetch results.

use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;

use super::bank::BankAccount;
use super::error::SourceError;
use super::record::LedgerRecord;

/// Raw result of fetching one entity, before normalization.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    /// Entity fetched.
    pub entity_id: EntityId,
    /// Records, or the upstream failure.
    pub records: Result<Vec<LedgerRecord>, SourceError>,
    /// Bank accounts, or the upstream failure.
    pub bank_accounts: Result<Vec<BankAccount>, SourceError>,
}

impl EntitySnapshot {
    /// A snapshot with both fetches successful.
    #[must_use]
    pub fn available(
        entity_id: EntityId,
        records: Vec<LedgerRecord>,
        bank_accounts: Vec<BankAccount>,
    ) -> Self {
        Self {
            entity_id,
            records: Ok(records),
            bank_accounts: Ok(bank_accounts),
        }
    }

    /// A snapshot whose fetches both failed with `error`.
    #[must_use]
    pub fn unavailable(entity_id: EntityId, error: SourceError) -> Self {
        Self {
            entity_id,
            records: Err(error.clone()),
            bank_accounts: Err(error),
        }
    }
}

/// Normalized records of one entity as seen by the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityBook {
    /// Records in the reporting currency, de-duplicated.
    Available {
        /// The records.
        records: Vec<LedgerRecord>,
        /// Total bank balance in the reporting currency, when known.
        bank_balance: Option<Decimal>,
        /// Bank accounts, converted where a rate is configured.
        bank_accounts: Vec<BankAccount>,
    },
    /// The upstream fetch failed.
    Unavailable(SourceError),
}

impl EntityBook {
    /// Returns the records, if the fetch succeeded.
    #[must_use]
    pub fn records(&self) -> Option<&[LedgerRecord]> {
        match self {
            Self::Available { records, .. } => Some(records),
            Self::Unavailable(_) => None,
        }
    }

    /// Returns the bank balance, if known.
    #[must_use]
    pub const fn bank_balance(&self) -> Option<Decimal> {
        match self {
            Self::Available { bank_balance, .. } => *bank_balance,
            Self::Unavailable(_) => None,
        }
    }

    /// Returns the bank accounts; empty when the fetch failed.
    #[must_use]
    pub fn bank_accounts(&self) -> &[BankAccount] {
        match self {
            Self::Available { bank_accounts, .. } => bank_accounts,
            Self::Unavailable(_) => &[],
        }
    }

    /// Returns true if the fetch succeeded.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}
