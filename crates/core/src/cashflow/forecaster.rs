//! Cashflow forecaster.

use chrono::{Days, NaiveDate};
use consolidator_shared::config::AnalyticsConfig;
use rust_decimal::Decimal;

use super::types::{CashflowBucket, CashflowForecast, ForecastScope};
use crate::error::SectionError;
use crate::ledger::{LedgerRecord, ensure_currency};

/// Where an open item lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Week(usize),
    BeyondHorizon,
}

/// Projects open items into weekly buckets.
pub struct CashflowForecaster;

impl CashflowForecaster {
    /// Builds a forecast from open invoices.
    ///
    /// Only open or partially paid `invoice` records count, with their
    /// residual. Items without a due date use their posting date. Overdue
    /// items land in week 0. Items due on or after `as_of + 7 * horizon` are
    /// summed into `beyond_horizon`.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::Configuration` if an open item is not in the
    /// reporting currency.
    pub fn forecast<'a, I>(
        scope: ForecastScope,
        records: I,
        opening_balance: Decimal,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Result<CashflowForecast, SectionError>
    where
        I: IntoIterator<Item = &'a LedgerRecord>,
    {
        let items: Vec<&LedgerRecord> = records.into_iter().filter(|r| r.is_open_item()).collect();
        ensure_currency(items.iter().copied(), config.reporting_currency)?;

        let horizon = config.forecast_horizon_weeks;
        let mut buckets: Vec<CashflowBucket> = (0..horizon)
            .map(|week| {
                let week_start = as_of + Days::new(u64::from(week) * 7);
                CashflowBucket {
                    scope,
                    week_index: week,
                    week_start,
                    week_end: week_start + Days::new(6),
                    inflow: Decimal::ZERO,
                    outflow: Decimal::ZERO,
                    net: Decimal::ZERO,
                    running_balance: Decimal::ZERO,
                }
            })
            .collect();

        let mut beyond_inflow = Decimal::ZERO;
        let mut beyond_outflow = Decimal::ZERO;
        for item in items {
            let (inflow, outflow) = if item.residual.is_sign_negative() {
                (Decimal::ZERO, -item.residual)
            } else {
                (item.residual, Decimal::ZERO)
            };
            match Self::slot(item.effective_due_date(), as_of, buckets.len()) {
                Slot::Week(k) => {
                    buckets[k].inflow += inflow;
                    buckets[k].outflow += outflow;
                }
                Slot::BeyondHorizon => {
                    beyond_inflow += inflow;
                    beyond_outflow += outflow;
                }
            }
        }

        let mut running = opening_balance;
        let mut lowest: Option<Decimal> = None;
        let mut first_shortfall_week = None;
        for bucket in &mut buckets {
            bucket.net = bucket.inflow - bucket.outflow;
            running += bucket.net;
            bucket.running_balance = running;
            lowest = Some(lowest.map_or(running, |l| l.min(running)));
            if first_shortfall_week.is_none() && running < Decimal::ZERO {
                first_shortfall_week = Some(bucket.week_index);
            }
        }

        Ok(CashflowForecast {
            scope,
            as_of,
            opening_balance,
            buckets,
            beyond_horizon: beyond_inflow - beyond_outflow,
            beyond_horizon_inflow: beyond_inflow,
            beyond_horizon_outflow: beyond_outflow,
            lowest_running_balance: lowest.unwrap_or(opening_balance),
            first_shortfall_week,
        })
    }

    fn slot(due: NaiveDate, as_of: NaiveDate, weeks: usize) -> Slot {
        let days = (due - as_of).num_days();
        if days < 0 {
            return if weeks > 0 { Slot::Week(0) } else { Slot::BeyondHorizon };
        }
        match usize::try_from(days / 7) {
            Ok(k) if k < weeks => Slot::Week(k),
            _ => Slot::BeyondHorizon,
        }
    }
}
