//! Year-to-date profit and loss and open item totals.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;

use super::types::{EntityOverview, FinancialOverview, MonthlyResult, OverviewFigures, ProfitAndLoss};
use crate::entity::EntityRegistry;
use crate::error::SectionError;
use crate::ledger::{EntityBook, LedgerRecord, RecordType, ensure_currency};

/// Builds the financial overview.
pub struct OverviewCalculator;

impl OverviewCalculator {
    /// First day of the calendar year of `as_of`.
    #[must_use]
    pub fn year_start(as_of: NaiveDate) -> NaiveDate {
        NaiveDate::from_yo_opt(as_of.year(), 1).unwrap_or(as_of)
    }

    /// Computes the figures of one scope.
    ///
    /// Revenue and cost records posted between January 1 and `as_of` feed the
    /// profit and loss. Open invoices posted on or before `as_of` feed the
    /// receivable and payable totals by the sign of their residual.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::Configuration` if a counted record is not in the
    /// reporting currency.
    pub fn figures<'a, I>(
        records: I,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Result<OverviewFigures, SectionError>
    where
        I: IntoIterator<Item = &'a LedgerRecord>,
    {
        let start = Self::year_start(as_of);
        let counted: Vec<&LedgerRecord> = records
            .into_iter()
            .filter(|r| r.posting_date <= as_of)
            .filter(|r| {
                r.is_open_item() || (r.record_type.is_profit_and_loss() && r.posting_date >= start)
            })
            .collect();
        ensure_currency(counted.iter().copied(), config.reporting_currency)?;

        // (revenue, costs) per month, January first.
        let mut months = vec![(Decimal::ZERO, Decimal::ZERO); as_of.month0() as usize + 1];
        let mut receivables = Decimal::ZERO;
        let mut payables = Decimal::ZERO;

        for record in counted {
            let slot = record.posting_date.month0() as usize;
            match record.record_type {
                RecordType::Revenue => months[slot].0 += record.amount,
                RecordType::Cost => months[slot].1 += record.amount,
                _ if record.residual.is_sign_negative() => payables -= record.residual,
                _ => receivables += record.residual,
            }
        }

        let revenue = months.iter().map(|(r, _)| *r).sum();
        let costs = months.iter().map(|(_, c)| *c).sum();
        let months = months
            .into_iter()
            .zip(1..)
            .map(|((revenue, costs), month)| MonthlyResult {
                month,
                label: format!("{}-{month:02}", as_of.year()),
                revenue,
                costs,
                result: revenue - costs,
            })
            .collect();

        Ok(OverviewFigures {
            profit_and_loss: ProfitAndLoss::new(revenue, costs),
            months,
            receivables,
            payables,
        })
    }

    /// Computes the overview over the available books, in registry order.
    ///
    /// Unavailable entities are left out of both the entity list and the
    /// consolidated figures.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::Configuration` on a currency mismatch.
    pub fn overview(
        registry: &EntityRegistry,
        books: &BTreeMap<EntityId, EntityBook>,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Result<FinancialOverview, SectionError> {
        let available: Vec<(EntityId, &[LedgerRecord])> = registry
            .entities()
            .iter()
            .filter_map(|e| books.get(&e.id).and_then(EntityBook::records).map(|r| (e.id, r)))
            .collect();

        let entities = available
            .iter()
            .map(|(id, records)| {
                Self::figures(records.iter(), as_of, config).map(|figures| EntityOverview {
                    entity_id: *id,
                    figures,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let consolidated = Self::figures(
            available.iter().flat_map(|(_, records)| records.iter()),
            as_of,
            config,
        )?;

        Ok(FinancialOverview {
            year: as_of.year(),
            period_start: Self::year_start(as_of),
            as_of,
            consolidated,
            entities,
        })
    }
}
