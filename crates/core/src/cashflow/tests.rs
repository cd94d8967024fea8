//! Tests for the cashflow forecaster.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::{Currency, EntityId, RecordId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::forecaster::CashflowForecaster;
use super::types::ForecastScope;
use crate::error::SectionError;
use crate::ledger::{LedgerRecord, RecordStatus, RecordType};

/// A Monday.
fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn item(id: u64, residual: Decimal, due: NaiveDate) -> LedgerRecord {
    LedgerRecord::new(
        RecordId(id),
        EntityId(1),
        RecordType::Invoice,
        residual,
        Currency::Eur,
        as_of() - Days::new(30),
    )
    .with_due_date(due)
}

fn config(weeks: u32) -> AnalyticsConfig {
    AnalyticsConfig {
        forecast_horizon_weeks: weeks,
        ..AnalyticsConfig::default()
    }
}

fn run(records: &[LedgerRecord], opening: Decimal, weeks: u32) -> super::CashflowForecast {
    CashflowForecaster::forecast(
        ForecastScope::Entity(EntityId(1)),
        records,
        opening,
        as_of(),
        &config(weeks),
    )
    .unwrap()
}

#[test]
fn test_invoice_overdue_by_ten_days_lands_in_week_zero() {
    assert_eq!(as_of().weekday(), Weekday::Mon);
    let records = [item(1, dec!(1200), as_of() - Days::new(10))];

    let forecast = run(&records, Decimal::ZERO, 12);

    assert_eq!(forecast.buckets[0].inflow, dec!(1200));
    assert_eq!(forecast.beyond_horizon, Decimal::ZERO);
}

#[test]
fn test_bucket_boundaries_are_half_open() {
    let records = [
        item(1, dec!(1), as_of()),
        item(2, dec!(2), as_of() + Days::new(6)),
        item(3, dec!(4), as_of() + Days::new(7)),
        item(4, dec!(8), as_of() + Days::new(27)),
        item(5, dec!(16), as_of() + Days::new(28)),
    ];

    let forecast = run(&records, Decimal::ZERO, 4);

    let inflows: Vec<Decimal> = forecast.buckets.iter().map(|b| b.inflow).collect();
    assert_eq!(inflows, vec![dec!(3), dec!(4), dec!(0), dec!(8)]);
    assert_eq!(forecast.beyond_horizon, dec!(16));
    assert_eq!(forecast.beyond_horizon_inflow, dec!(16));
}

#[test]
fn test_weeks_are_contiguous_from_as_of() {
    let forecast = run(&[], Decimal::ZERO, 12);

    assert_eq!(forecast.buckets.len(), 12);
    for (i, bucket) in forecast.buckets.iter().enumerate() {
        assert_eq!(bucket.week_index as usize, i);
        assert_eq!((bucket.week_end - bucket.week_start).num_days(), 6);
    }
    assert_eq!(forecast.buckets[0].week_start, as_of());
    assert_eq!(forecast.buckets[11].week_end, as_of() + Days::new(83));
}

#[test]
fn test_running_balance_is_seeded_by_opening_balance() {
    let records = [
        item(1, dec!(500), as_of() + Days::new(1)),
        item(2, dec!(-2000), as_of() + Days::new(8)),
        item(3, dec!(300), as_of() + Days::new(9)),
    ];

    let forecast = run(&records, dec!(1000), 3);

    let running: Vec<Decimal> = forecast.buckets.iter().map(|b| b.running_balance).collect();
    assert_eq!(running, vec![dec!(1500), dec!(-200), dec!(-200)]);
    assert_eq!(forecast.buckets[1].outflow, dec!(2000));
    assert_eq!(forecast.buckets[1].net, dec!(-1700));
    assert_eq!(forecast.lowest_running_balance, dec!(-200));
    assert_eq!(forecast.first_shortfall_week, Some(1));
    assert_eq!(forecast.closing_balance(), dec!(-200));
}

#[test]
fn test_missing_due_date_uses_posting_date() {
    let mut undated = item(1, dec!(75), as_of());
    undated.due_date = None;
    undated.posting_date = as_of() + Days::new(15);

    let forecast = run(&[undated], Decimal::ZERO, 4);

    assert_eq!(forecast.buckets[2].inflow, dec!(75));
}

#[test]
fn test_only_outstanding_invoices_count() {
    let paid = item(1, dec!(100), as_of()).with_status(RecordStatus::Paid);
    let cancelled = item(2, dec!(100), as_of()).with_status(RecordStatus::Cancelled);
    let partial = item(3, dec!(100), as_of())
        .with_residual(dec!(40))
        .with_status(RecordStatus::Partial);
    let mut payment = item(4, dec!(100), as_of());
    payment.record_type = RecordType::Payment;
    let payable = item(5, dec!(-25), as_of());

    let forecast = run(&[paid, cancelled, partial, payment, payable], Decimal::ZERO, 2);

    assert_eq!(forecast.buckets[0].inflow, dec!(40));
    assert_eq!(forecast.buckets[0].outflow, dec!(25));
}

#[test]
fn test_open_intercompany_journal_moves_no_bucket() {
    let mut current_account = LedgerRecord::new(
        RecordId(9),
        EntityId(1),
        RecordType::Journal,
        dec!(250000),
        Currency::Eur,
        as_of() - Days::new(90),
    )
    .with_counterparty(EntityId(3));
    current_account.status = RecordStatus::Open;
    assert_eq!(current_account.residual, dec!(250000));

    let forecast = run(&[current_account], dec!(1000), 12);

    assert!(forecast.buckets.iter().all(|b| b.inflow.is_zero() && b.outflow.is_zero()));
    assert_eq!(forecast.beyond_horizon, Decimal::ZERO);
    assert_eq!(forecast.lowest_running_balance, dec!(1000));
    assert_eq!(forecast.first_shortfall_week, None);
}

#[test]
fn test_no_shortfall_keeps_lowest_at_minimum_bucket() {
    let records = [item(1, dec!(-100), as_of())];
    let forecast = run(&records, dec!(1000), 2);
    assert_eq!(forecast.lowest_running_balance, dec!(900));
    assert_eq!(forecast.first_shortfall_week, None);
}

#[test]
fn test_rejects_open_item_in_foreign_currency() {
    let mut usd = item(1, dec!(10), as_of());
    usd.currency = Currency::Usd;

    let err = CashflowForecaster::forecast(
        ForecastScope::Consolidated,
        &[usd],
        Decimal::ZERO,
        as_of(),
        &config(4),
    )
    .unwrap_err();

    assert!(matches!(err, SectionError::Configuration(_)));
}

#[test]
fn test_settled_foreign_records_are_not_checked() {
    let mut usd = item(1, dec!(10), as_of()).with_status(RecordStatus::Paid);
    usd.currency = Currency::Usd;
    assert!(
        CashflowForecaster::forecast(
            ForecastScope::Consolidated,
            &[usd],
            Decimal::ZERO,
            as_of(),
            &config(4),
        )
        .is_ok()
    );
}

fn open_items() -> impl Strategy<Value = Vec<LedgerRecord>> {
    prop::collection::vec(
        (-5_000_000i64..5_000_000i64, -60i64..200i64),
        0..40,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (cents, offset))| {
                let due = if offset < 0 {
                    as_of() - Days::new(offset.unsigned_abs())
                } else {
                    as_of() + Days::new(offset.unsigned_abs())
                };
                item(u64::try_from(i).unwrap(), Decimal::new(cents, 2), due)
            })
            .collect()
    })
}

fn eligible_total(records: &[LedgerRecord]) -> Decimal {
    records.iter().filter(|r| r.is_open_item()).map(|r| r.residual).sum()
}

proptest! {
    /// Every eligible residual ends up either in a bucket or beyond the horizon.
    #[test]
    fn prop_conservation(records in open_items(), weeks in 0u32..20) {
        let forecast = run(&records, Decimal::ZERO, weeks);
        let bucketed: Decimal = forecast.buckets.iter().map(|b| b.net).sum();
        prop_assert_eq!(bucketed + forecast.beyond_horizon, eligible_total(&records));
        prop_assert_eq!(
            forecast.beyond_horizon,
            forecast.beyond_horizon_inflow - forecast.beyond_horizon_outflow
        );
    }

    /// Same input, same output, in any order.
    #[test]
    fn prop_determinism(records in open_items(), opening in -1_000_000i64..1_000_000i64) {
        let opening = Decimal::new(opening, 2);
        let first = run(&records, opening, 12);
        let second = run(&records, opening, 12);
        prop_assert_eq!(&first, &second);

        let mut reversed = records.clone();
        reversed.reverse();
        prop_assert_eq!(&first, &run(&reversed, opening, 12));
    }

    /// The closing balance is the opening balance plus all bucketed nets.
    #[test]
    fn prop_running_balance_accumulates(records in open_items(), opening in -1_000_000i64..1_000_000i64) {
        let opening = Decimal::new(opening, 2);
        let forecast = run(&records, opening, 8);
        let nets: Decimal = forecast.buckets.iter().map(|b| b.net).sum();
        prop_assert_eq!(forecast.closing_balance(), opening + nets);
    }
}

#[test]
fn test_conservation_when_everything_is_overdue() {
    let records: Vec<LedgerRecord> = (1..=5)
        .map(|i| item(i, Decimal::from(i) * dec!(-10), as_of() - Days::new(i * 20)))
        .collect();
    let forecast = run(&records, Decimal::ZERO, 12);

    assert_eq!(forecast.buckets[0].net, dec!(-150));
    assert_eq!(forecast.beyond_horizon, Decimal::ZERO);
}

#[test]
fn test_conservation_when_everything_is_beyond_horizon() {
    let records: Vec<LedgerRecord> = (1..=5)
        .map(|i| item(i, Decimal::from(i) * dec!(10), as_of() + Days::new(84 + i)))
        .collect();
    let forecast = run(&records, Decimal::ZERO, 12);

    assert!(forecast.buckets.iter().all(|b| b.net.is_zero()));
    assert_eq!(forecast.beyond_horizon, dec!(150));
    assert_eq!(forecast.beyond_horizon, eligible_total(&records));
}
