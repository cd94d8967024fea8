//! Tests for the financial overview.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::{Currency, EntityId, RecordId};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::calculator::OverviewCalculator;
use super::types::ProfitAndLoss;
use crate::entity::{Entity, EntityRegistry, EntityRole, Relationship};
use crate::error::SectionError;
use crate::ledger::{EntityBook, LedgerRecord, RecordStatus, RecordType, SourceError};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn as_of() -> NaiveDate {
    date(6, 2)
}

fn line(id: u64, record_type: RecordType, amount: Decimal, posted: NaiveDate) -> LedgerRecord {
    LedgerRecord::new(RecordId(id), EntityId(1), record_type, amount, Currency::Eur, posted)
        .with_residual(Decimal::ZERO)
        .with_status(RecordStatus::Paid)
}

fn invoice(id: u64, residual: Decimal) -> LedgerRecord {
    LedgerRecord::new(
        RecordId(id),
        EntityId(1),
        RecordType::Invoice,
        residual,
        Currency::Eur,
        date(5, 20),
    )
}

#[test]
fn test_year_to_date_profit_and_loss() {
    let records = [
        line(1, RecordType::Revenue, dec!(10000), date(1, 15)),
        line(2, RecordType::Revenue, dec!(5000), date(3, 3)),
        line(3, RecordType::Cost, dec!(4000), date(3, 10)),
        line(4, RecordType::Cost, dec!(2000), date(6, 2)),
    ];

    let figures = OverviewCalculator::figures(&records, as_of(), &AnalyticsConfig::default()).unwrap();

    let pnl = &figures.profit_and_loss;
    assert_eq!(pnl.revenue, dec!(15000));
    assert_eq!(pnl.costs, dec!(6000));
    assert_eq!(pnl.result, dec!(9000));
    assert_eq!(pnl.margin_pct, Some(dec!(60.0)));

    assert_eq!(figures.months.len(), 6);
    assert_eq!(figures.months[0].label, "2025-01");
    assert_eq!(figures.months[0].revenue, dec!(10000));
    assert_eq!(figures.months[1].result, Decimal::ZERO);
    assert_eq!(figures.months[2].result, dec!(1000));
    assert_eq!(figures.months[5].month, 6);
    assert_eq!(figures.months[5].costs, dec!(2000));
}

#[test]
fn test_lines_outside_the_year_are_ignored() {
    let records = [
        line(1, RecordType::Revenue, dec!(700), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
        line(2, RecordType::Revenue, dec!(300), date(6, 3)),
        line(3, RecordType::Revenue, dec!(100), date(2, 1)),
    ];

    let figures = OverviewCalculator::figures(&records, as_of(), &AnalyticsConfig::default()).unwrap();

    assert_eq!(figures.profit_and_loss.revenue, dec!(100));
    assert_eq!(figures.months.iter().map(|m| m.revenue).sum::<Decimal>(), dec!(100));
}

#[test]
fn test_debtor_and_creditor_totals_from_open_items() {
    let records = [
        invoice(1, dec!(1200)),
        invoice(2, dec!(-800)).with_residual(dec!(-300)).with_status(RecordStatus::Partial),
        invoice(3, dec!(500)).with_residual(dec!(0)).with_status(RecordStatus::Paid),
        invoice(4, dec!(-50)),
        line(5, RecordType::Journal, dec!(9000), date(4, 1))
            .with_counterparty(EntityId(3))
            .with_residual(dec!(9000))
            .with_status(RecordStatus::Open),
    ];

    let figures = OverviewCalculator::figures(&records, as_of(), &AnalyticsConfig::default()).unwrap();

    assert_eq!(figures.receivables, dec!(1200));
    assert_eq!(figures.payables, dec!(350));
    assert_eq!(figures.profit_and_loss, ProfitAndLoss::new(Decimal::ZERO, Decimal::ZERO));
}

#[rstest]
#[case(dec!(1000), dec!(750), Some(dec!(25.0)))]
#[case(dec!(3000), dec!(2000), Some(dec!(33.3)))]
#[case(dec!(1000), dec!(1500), Some(dec!(-50.0)))]
#[case(dec!(0), dec!(500), None)]
#[case(dec!(-200), dec!(0), None)]
fn test_margin(#[case] revenue: Decimal, #[case] costs: Decimal, #[case] expected: Option<Decimal>) {
    assert_eq!(ProfitAndLoss::new(revenue, costs).margin_pct, expected);
}

#[test]
fn test_foreign_currency_line_is_a_configuration_error() {
    let mut usd = line(1, RecordType::Cost, dec!(10), date(2, 1));
    usd.currency = Currency::Usd;

    let err = OverviewCalculator::figures([&usd], as_of(), &AnalyticsConfig::default()).unwrap_err();

    assert!(matches!(err, SectionError::Configuration(_)));
}

#[test]
fn test_overview_sums_available_entities() {
    let entity = |id: u32, name: &str, role| Entity {
        id: EntityId(id),
        legal_name: format!("{name} B.V."),
        short_name: name.to_string(),
        vat_number: format!("NL00000000{id}B01"),
        role,
    };
    let registry = EntityRegistry::new(
        vec![
            entity(1, "P&O BV", EntityRole::Parent),
            entity(3, "P&O Int", EntityRole::Subsidiary),
            entity(2, "Mia Colore", EntityRole::Sibling),
        ],
        vec![Relationship { a: EntityId(1), b: EntityId(3) }],
    )
    .unwrap();

    let mut int_revenue = line(10, RecordType::Revenue, dec!(4000), date(5, 5));
    int_revenue.entity_id = EntityId(3);
    let books = BTreeMap::from([
        (
            EntityId(1),
            EntityBook::Available {
                records: vec![
                    line(1, RecordType::Revenue, dec!(6000), date(4, 1)),
                    line(2, RecordType::Cost, dec!(1000), date(4, 2)),
                    invoice(3, dec!(250)),
                ],
                bank_balance: None,
                bank_accounts: vec![],
            },
        ),
        (
            EntityId(3),
            EntityBook::Available {
                records: vec![int_revenue],
                bank_balance: None,
                bank_accounts: vec![],
            },
        ),
        (
            EntityId(2),
            EntityBook::Unavailable(SourceError::Unavailable("timeout".into())),
        ),
    ]);

    let overview =
        OverviewCalculator::overview(&registry, &books, as_of(), &AnalyticsConfig::default()).unwrap();

    assert_eq!(overview.year, 2025);
    assert_eq!(overview.period_start, date(1, 1));
    assert_eq!(overview.entities.len(), 2);
    assert_eq!(overview.entities[0].entity_id, EntityId(1));
    assert_eq!(overview.entities[1].entity_id, EntityId(3));
    assert_eq!(overview.consolidated.profit_and_loss.revenue, dec!(10000));
    assert_eq!(overview.consolidated.profit_and_loss.result, dec!(9000));
    assert_eq!(overview.consolidated.months[3].revenue, dec!(6000));
    assert_eq!(overview.consolidated.receivables, dec!(250));
}
