//! `LedgerSource` over Odoo.

use std::collections::HashMap;

use chrono::NaiveDate;
use consolidator_core::entity::EntityRegistry;
use consolidator_core::ledger::{BankAccount, LedgerRecord, LedgerSource, QueryWindow, SourceError};
use consolidator_shared::config::ErpConfig;
use consolidator_shared::types::{EntityId, Money};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::OdooClient;
use crate::mapping::{AccountMapping, BankJournal, JOURNAL_FIELDS, MOVE_LINE_FIELDS, MoveLine};
use crate::retry::RetryPolicy;

const MOVE_LINE_MODEL: &str = "account.move.line";
const JOURNAL_MODEL: &str = "account.journal";

/// Reads ledger records and bank balances from Odoo.
///
/// Every registered entity is an Odoo company whose id equals the entity id.
pub struct OdooLedgerSource {
    client: OdooClient,
    mapping: AccountMapping,
    retry: RetryPolicy,
    jurisdictions: HashMap<EntityId, String>,
}

impl OdooLedgerSource {
    /// Builds the source for the entities in `registry`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &ErpConfig, registry: &EntityRegistry) -> Result<Self, SourceError> {
        Ok(Self {
            client: OdooClient::new(config)?,
            mapping: AccountMapping::from_config(config),
            retry: RetryPolicy::from_config(config),
            jurisdictions: registry
                .entities()
                .iter()
                .filter_map(|e| e.jurisdiction().map(|j| (e.id, j)))
                .collect(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn search<T: DeserializeOwned>(
        &self,
        operation: &str,
        entity: EntityId,
        model: &str,
        domain: &Value,
        fields: &[&str],
    ) -> Result<Vec<T>, SourceError> {
        let rows = self
            .retry
            .run(operation, entity, || {
                self.client.search_read(model, domain.clone(), fields, None)
            })
            .await?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| SourceError::Decode(format!("{model} row: {e}")))
            })
            .collect()
    }
}

/// Domain selecting posted lines of `entity` dated inside `window`.
#[must_use]
pub fn flow_domain(entity: EntityId, window: QueryWindow) -> Value {
    json!([
        ["company_id", "=", entity.0],
        ["parent_state", "=", "posted"],
        ["date", ">=", window.from.to_string()],
        ["date", "<=", window.to.to_string()],
    ])
}

/// Domain selecting posted lines of `entity` dated before the window that
/// still carry a balance: open items and intercompany current-account lines.
#[must_use]
pub fn carrying_domain(entity: EntityId, window: QueryWindow, intercompany_codes: &[&str]) -> Value {
    json!([
        ["company_id", "=", entity.0],
        ["parent_state", "=", "posted"],
        ["date", "<", window.from.to_string()],
        "|",
        ["amount_residual", "!=", 0],
        ["account_id.code", "in", intercompany_codes],
    ])
}

/// Domain selecting the bank journals of `entity`.
#[must_use]
pub fn bank_journal_domain(entity: EntityId) -> Value {
    json!([["company_id", "=", entity.0], ["type", "=", "bank"]])
}

#[async_trait::async_trait]
impl LedgerSource for OdooLedgerSource {
    async fn fetch_records(
        &self,
        entity: EntityId,
        window: QueryWindow,
    ) -> Result<Vec<LedgerRecord>, SourceError> {
        let home = self
            .jurisdictions
            .get(&entity)
            .ok_or_else(|| SourceError::Rejected(format!("entity {entity} is not registered")))?;

        let flow = flow_domain(entity, window);
        let carrying = carrying_domain(entity, window, &self.mapping.intercompany_codes());
        let (flow_lines, carrying_lines) = tokio::try_join!(
            self.search::<MoveLine>("fetch_records", entity, MOVE_LINE_MODEL, &flow, MOVE_LINE_FIELDS),
            self.search::<MoveLine>("fetch_records", entity, MOVE_LINE_MODEL, &carrying, MOVE_LINE_FIELDS),
        )?;

        let fetched = flow_lines.len() + carrying_lines.len();
        let records: Vec<LedgerRecord> = flow_lines
            .iter()
            .chain(&carrying_lines)
            .filter_map(|line| self.mapping.map_line(line, entity, home))
            .filter(|record| window.admits(record))
            .collect();

        debug!(
            entity = %entity,
            fetched,
            mapped = records.len(),
            "Mapped Odoo journal items"
        );
        Ok(records)
    }

    async fn fetch_bank_accounts(
        &self,
        entity: EntityId,
        as_of: NaiveDate,
    ) -> Result<Vec<BankAccount>, SourceError> {
        let journals: Vec<BankJournal> = self
            .search(
                "fetch_bank_accounts",
                entity,
                JOURNAL_MODEL,
                &bank_journal_domain(entity),
                JOURNAL_FIELDS,
            )
            .await?;

        // Odoo only exposes the latest statement balance.
        let currency = self.mapping.currency();
        let accounts: Vec<BankAccount> = journals
            .into_iter()
            .map(|j| {
                let name = j.name.unwrap_or_else(|| format!("journal {}", j.id));
                BankAccount::new(name, Money::new(j.current_statement_balance, currency))
            })
            .collect();
        debug!(
            entity = %entity,
            as_of = %as_of,
            journals = accounts.len(),
            "Read bank journal balances"
        );
        Ok(accounts)
    }
}
