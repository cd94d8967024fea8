//! Reconciliation engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;

use super::types::{Completeness, IntercompanyPosition, ReconciliationResult};
use crate::entity::EntityRegistry;
use crate::error::SectionError;
use crate::ledger::{EntityBook, LedgerRecord, RecordStatus, ensure_currency};

/// Pairwise intercompany reconciliation.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Computes one position per configured relationship.
    ///
    /// Only intercompany journal records posted on or before `as_of` count;
    /// cancelled lines are ignored. An entity missing from `books` is treated
    /// as unavailable.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::Configuration` if any intercompany record is not
    /// in the reporting currency.
    pub fn reconcile(
        registry: &EntityRegistry,
        books: &BTreeMap<EntityId, EntityBook>,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Result<ReconciliationResult, SectionError> {
        ensure_currency(
            books
                .values()
                .filter_map(EntityBook::records)
                .flatten()
                .filter(|r| r.is_intercompany()),
            config.reporting_currency,
        )?;

        let tolerance = config.tolerance_amount;
        let positions: Vec<IntercompanyPosition> = registry
            .relationships()
            .iter()
            .map(|rel| {
                let (balance_a_view, completeness_a) = Self::side(books.get(&rel.a), rel.b, as_of);
                let (balance_b_view, completeness_b) = Self::side(books.get(&rel.b), rel.a, as_of);
                let difference = balance_a_view + balance_b_view;
                let verifiable = completeness_a != Completeness::Unavailable
                    && completeness_b != Completeness::Unavailable;

                IntercompanyPosition {
                    entity_a: rel.a,
                    entity_b: rel.b,
                    balance_a_view,
                    balance_b_view,
                    difference,
                    is_break: verifiable && Self::is_break(difference, tolerance),
                    completeness_a,
                    completeness_b,
                    as_of_date: as_of,
                }
            })
            .collect();

        let group_net = positions.iter().map(|p| p.difference).sum();
        let breaks = positions.iter().filter(|p| p.is_break).count();

        Ok(ReconciliationResult {
            as_of,
            tolerance,
            positions,
            group_net,
            breaks,
        })
    }

    /// Returns true if `difference` lies strictly outside `tolerance`.
    #[must_use]
    pub fn is_break(difference: Decimal, tolerance: Decimal) -> bool {
        difference.abs() > tolerance
    }

    fn side(
        book: Option<&EntityBook>,
        counterparty: EntityId,
        as_of: NaiveDate,
    ) -> (Decimal, Completeness) {
        let Some(records) = book.and_then(EntityBook::records) else {
            return (Decimal::ZERO, Completeness::Unavailable);
        };

        let mut lines = records
            .iter()
            .filter(|r| Self::counts_towards(r, counterparty, as_of))
            .peekable();
        if lines.peek().is_none() {
            return (Decimal::ZERO, Completeness::NoRecords);
        }
        (lines.map(|r| r.amount).sum(), Completeness::Reported)
    }

    fn counts_towards(record: &LedgerRecord, counterparty: EntityId, as_of: NaiveDate) -> bool {
        record.is_intercompany()
            && record.counterparty_id == Some(counterparty)
            && record.posting_date <= as_of
            && record.status != RecordStatus::Cancelled
    }
}
