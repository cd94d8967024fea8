//! The adapter seam between the ERP and the analytics core.

use std::sync::Arc;

use chrono::NaiveDate;
use consolidator_shared::types::{EntityId, Money};
use serde::{Deserialize, Serialize};

use super::bank::{BankAccount, total_balance};
use super::error::SourceError;
use super::record::LedgerRecord;

/// Date window of a record query.
///
/// Flow records (payments, bank lines, VAT entries) are returned when posted
/// within `[from, to]`. Balance-carrying records (intercompany journals, open
/// items) are returned when posted on or before `to`, whatever their age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryWindow {
    /// First posting date for flow records.
    pub from: NaiveDate,
    /// Last posting date for all records.
    pub to: NaiveDate,
}

impl QueryWindow {
    /// Creates a window, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// Returns true if `record` belongs to this window.
    #[must_use]
    pub fn admits(&self, record: &LedgerRecord) -> bool {
        if record.posting_date > self.to {
            return false;
        }
        record.is_balance_carrying() || record.posting_date >= self.from
    }
}

/// Supplies ledger data per legal entity.
///
/// Implementations own transport, authentication and retries. Returned records
/// are signed from the entity's perspective and may be in any currency.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetches the entity's records for `window`.
    async fn fetch_records(
        &self,
        entity: EntityId,
        window: QueryWindow,
    ) -> Result<Vec<LedgerRecord>, SourceError>;

    /// Fetches the entity's bank accounts with their balances as of `as_of`.
    async fn fetch_bank_accounts(
        &self,
        entity: EntityId,
        as_of: NaiveDate,
    ) -> Result<Vec<BankAccount>, SourceError>;

    /// Fetches the entity's bank balance as of `as_of`, the sum over its
    /// accounts.
    ///
    /// Fails with `SourceError::Rejected` when the accounts are kept in
    /// different currencies.
    async fn fetch_bank_balance(
        &self,
        entity: EntityId,
        as_of: NaiveDate,
    ) -> Result<Money, SourceError> {
        let accounts = self.fetch_bank_accounts(entity, as_of).await?;
        total_balance(&accounts).ok_or_else(|| {
            SourceError::Rejected(format!(
                "bank accounts of entity {entity} are kept in several currencies"
            ))
        })
    }
}

#[async_trait::async_trait]
impl<S: LedgerSource + ?Sized> LedgerSource for Arc<S> {
    async fn fetch_records(
        &self,
        entity: EntityId,
        window: QueryWindow,
    ) -> Result<Vec<LedgerRecord>, SourceError> {
        (**self).fetch_records(entity, window).await
    }

    async fn fetch_bank_accounts(
        &self,
        entity: EntityId,
        as_of: NaiveDate,
    ) -> Result<Vec<BankAccount>, SourceError> {
        (**self).fetch_bank_accounts(entity, as_of).await
    }

    async fn fetch_bank_balance(
        &self,
        entity: EntityId,
        as_of: NaiveDate,
    ) -> Result<Money, SourceError> {
        (**self).fetch_bank_balance(entity, as_of).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::record::{RecordStatus, RecordType};
    use consolidator_shared::types::{Currency, RecordId};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn record(record_type: RecordType, posted: NaiveDate) -> LedgerRecord {
        LedgerRecord::new(
            RecordId(1),
            EntityId(1),
            record_type,
            dec!(10),
            Currency::Eur,
            posted,
        )
        .with_status(RecordStatus::Paid)
    }

    #[test]
    fn test_window_swaps_reversed_bounds() {
        let window = QueryWindow::new(date(30), date(1));
        assert_eq!(window.from, date(1));
        assert_eq!(window.to, date(30));
    }

    #[test]
    fn test_window_admits_flow_records_inside_bounds_only() {
        let window = QueryWindow::new(date(10), date(20));
        assert!(window.admits(&record(RecordType::VatEntry, date(10))));
        assert!(window.admits(&record(RecordType::VatEntry, date(20))));
        assert!(!window.admits(&record(RecordType::VatEntry, date(9))));
        assert!(!window.admits(&record(RecordType::Bank, date(21))));
    }

    #[test]
    fn test_window_admits_old_balance_carrying_records() {
        let window = QueryWindow::new(date(10), date(20));
        let open_invoice = record(RecordType::Invoice, date(1)).with_status(RecordStatus::Open);
        let ic_journal = record(RecordType::Journal, date(1)).with_counterparty(EntityId(2));
        assert!(window.admits(&open_invoice));
        assert!(window.admits(&ic_journal));
        assert!(!window.admits(&record(RecordType::Invoice, date(1))));
    }
}
