//! Ledger snapshot caching using Moka.
//!
//! Wraps any [`LedgerSource`] so that repeated report requests within the TTL
//! reuse the fetched records instead of hitting the ERP again.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use consolidator_shared::types::EntityId;
use moka::future::Cache;
use tracing::debug;

use super::bank::BankAccount;
use super::error::SourceError;
use super::record::LedgerRecord;
use super::source::{LedgerSource, QueryWindow};

/// Default cache capacity (number of entries per cache).
const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default time-to-live for cache entries (5 minutes).
pub const DEFAULT_TTL_SECS: u64 = 300;

/// A [`LedgerSource`] with a TTL cache in front.
///
/// Keys are `(entity, window)` for records and `(entity, as_of)` for bank
/// accounts. The bank balance is summed from the cached accounts. Concurrent requests for the same key share one upstream call.
/// Errors are returned to every waiting caller but never stored.
pub struct CachedLedgerSource<S> {
    inner: S,
    records: Cache<(EntityId, QueryWindow), Arc<Vec<LedgerRecord>>>,
    bank_accounts: Cache<(EntityId, NaiveDate), Arc<Vec<BankAccount>>>,
}

impl<S: LedgerSource> CachedLedgerSource<S> {
    /// Wraps `inner` with the default capacity and a TTL of `ttl_secs`.
    #[must_use]
    pub fn new(inner: S, ttl_secs: u64) -> Self {
        Self::with_config(inner, DEFAULT_CACHE_CAPACITY, ttl_secs)
    }

    /// Wraps `inner` with a custom capacity and TTL.
    #[must_use]
    pub fn with_config(inner: S, max_capacity: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        Self {
            inner,
            records: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            bank_accounts: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the wrapped source.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached entry.
    pub fn invalidate_all(&self) {
        self.records.invalidate_all();
        self.bank_accounts.invalidate_all();
    }

    /// Number of cached record sets.
    ///
    /// Moka updates counts lazily; call after [`Self::run_pending_tasks`] for an
    /// exact figure.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.records.entry_count() + self.bank_accounts.entry_count()
    }

    /// Runs pending cache maintenance.
    pub async fn run_pending_tasks(&self) {
        self.records.run_pending_tasks().await;
        self.bank_accounts.run_pending_tasks().await;
    }
}

#[async_trait::async_trait]
impl<S: LedgerSource> LedgerSource for CachedLedgerSource<S> {
    async fn fetch_records(
        &self,
        entity: EntityId,
        window: QueryWindow,
    ) -> Result<Vec<LedgerRecord>, SourceError> {
        let key = (entity, window);
        if let Some(records) = self.records.get(&key).await {
            debug!(entity = %entity, from = %window.from, to = %window.to, "Ledger cache hit");
            return Ok(records.as_ref().clone());
        }

        let records = self
            .records
            .try_get_with(key, async {
                self.inner.fetch_records(entity, window).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())?;
        Ok(records.as_ref().clone())
    }

    async fn fetch_bank_accounts(
        &self,
        entity: EntityId,
        as_of: NaiveDate,
    ) -> Result<Vec<BankAccount>, SourceError> {
        let key = (entity, as_of);
        if let Some(accounts) = self.bank_accounts.get(&key).await {
            debug!(entity = %entity, as_of = %as_of, "Bank account cache hit");
            return Ok(accounts.as_ref().clone());
        }

        let accounts = self
            .bank_accounts
            .try_get_with(key, async {
                self.inner.fetch_bank_accounts(entity, as_of).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())?;
        Ok(accounts.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::record::RecordType;
    use crate::ledger::source::MockLedgerSource;
    use consolidator_shared::types::{Currency, Money, RecordId};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn window() -> QueryWindow {
        QueryWindow::new(date(1), date(30))
    }

    fn sample() -> Vec<LedgerRecord> {
        vec![LedgerRecord::new(
            RecordId(11),
            EntityId(1),
            RecordType::Invoice,
            dec!(250),
            Currency::Eur,
            date(2),
        )]
    }

    #[tokio::test]
    async fn test_identical_fetches_hit_upstream_once() {
        let mut mock = MockLedgerSource::new();
        mock.expect_fetch_records()
            .times(1)
            .returning(|_, _| Ok(sample()));
        let cached = CachedLedgerSource::new(mock, 300);

        let first = cached.fetch_records(EntityId(1), window()).await.unwrap();
        let second = cached.fetch_records(EntityId(1), window()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, sample());
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let mut mock = MockLedgerSource::new();
        mock.expect_fetch_records()
            .times(2)
            .returning(|_, _| Ok(sample()));
        let cached = CachedLedgerSource::new(mock, 300);

        cached.fetch_records(EntityId(1), window()).await.unwrap();
        cached.fetch_records(EntityId(2), window()).await.unwrap();
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mut mock = MockLedgerSource::new();
        mock.expect_fetch_records()
            .times(2)
            .returning(|_, _| Err(SourceError::Unavailable("connection reset".into())));
        let cached = CachedLedgerSource::new(mock, 300);

        for _ in 0..2 {
            let err = cached.fetch_records(EntityId(1), window()).await.unwrap_err();
            assert!(err.is_retryable());
        }
    }

    #[tokio::test]
    async fn test_bank_accounts_are_cached_per_date() {
        let mut mock = MockLedgerSource::new();
        mock.expect_fetch_bank_accounts().times(2).returning(|_, _| {
            Ok(vec![
                BankAccount::new("ING", Money::new(dec!(4000), Currency::Eur)),
                BankAccount::new("Rabobank", Money::new(dec!(1000), Currency::Eur)),
            ])
        });
        let cached = CachedLedgerSource::new(mock, 300);

        cached.fetch_bank_accounts(EntityId(1), date(5)).await.unwrap();
        cached.fetch_bank_balance(EntityId(1), date(5)).await.unwrap();
        let balance = cached.fetch_bank_balance(EntityId(1), date(6)).await.unwrap();
        assert_eq!(balance.amount, dec!(5000));
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_refetch() {
        let mut mock = MockLedgerSource::new();
        mock.expect_fetch_records()
            .times(2)
            .returning(|_, _| Ok(sample()));
        let cached = CachedLedgerSource::new(mock, 300);

        cached.fetch_records(EntityId(1), window()).await.unwrap();
        cached.invalidate_all();
        cached.fetch_records(EntityId(1), window()).await.unwrap();
    }
}
