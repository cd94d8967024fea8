//! In-memory ledger source for fixtures and tests.

use std::collections::HashMap;

use chrono::NaiveDate;
use consolidator_shared::types::EntityId;

use super::bank::BankAccount;
use super::error::SourceError;
use super::record::LedgerRecord;
use super::source::{LedgerSource, QueryWindow};

/// A [`LedgerSource`] backed by fixed data.
///
/// Entities without data return no records and no bank accounts. Entities
/// registered with [`InMemoryLedgerSource::with_failure`] fail every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerSource {
    records: HashMap<EntityId, Vec<LedgerRecord>>,
    bank_accounts: HashMap<EntityId, Vec<BankAccount>>,
    failures: HashMap<EntityId, SourceError>,
}

impl InMemoryLedgerSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds records, keyed by each record's own entity.
    #[must_use]
    pub fn with_records(mut self, records: impl IntoIterator<Item = LedgerRecord>) -> Self {
        for record in records {
            self.records.entry(record.entity_id).or_default().push(record);
        }
        self
    }

    /// Adds a bank account to `entity`.
    #[must_use]
    pub fn with_bank_account(mut self, entity: EntityId, account: BankAccount) -> Self {
        self.bank_accounts.entry(entity).or_default().push(account);
        self
    }

    /// Makes every call for `entity` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, entity: EntityId, error: SourceError) -> Self {
        self.failures.insert(entity, error);
        self
    }

    fn check(&self, entity: EntityId) -> Result<(), SourceError> {
        self.failures.get(&entity).map_or(Ok(()), |e| Err(e.clone()))
    }
}

#[async_trait::async_trait]
impl LedgerSource for InMemoryLedgerSource {
    async fn fetch_records(
        &self,
        entity: EntityId,
        window: QueryWindow,
    ) -> Result<Vec<LedgerRecord>, SourceError> {
        self.check(entity)?;
        Ok(self
            .records
            .get(&entity)
            .map(|records| records.iter().filter(|r| window.admits(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_bank_accounts(
        &self,
        entity: EntityId,
        _as_of: NaiveDate,
    ) -> Result<Vec<BankAccount>, SourceError> {
        self.check(entity)?;
        Ok(self.bank_accounts.get(&entity).cloned().unwrap_or_default())
    }
}
