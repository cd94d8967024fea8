//! VAT risk analyzer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;

use super::period::VatPeriod;
use super::types::{IncompleteReason, RiskCode, VatOverview, VatPosition};
use crate::currency::CurrencyService;
use crate::entity::{Entity, EntityRegistry};
use crate::ledger::{
    EntityBook, LedgerRecord, RecordStatus, RecordType, VatDirection, VatTag, VatTreatment,
};

/// Unrounded output and input sums.
#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    output: Decimal,
    input: Decimal,
}

impl Totals {
    fn of<'a>(lines: impl IntoIterator<Item = &'a (&'a LedgerRecord, &'a VatTag)>) -> Self {
        lines.into_iter().fold(Self::default(), |mut acc, (record, tag)| {
            match tag.direction {
                VatDirection::Output => acc.output += record.amount,
                VatDirection::Input => acc.input += record.amount,
            }
            acc
        })
    }

    fn net(self) -> Decimal {
        self.output - self.input
    }
}

/// Aggregates VAT entries and evaluates the risk rules.
pub struct VatAnalyzer;

impl VatAnalyzer {
    /// Computes one entity's position for `period`.
    ///
    /// `records` holds the entity's records covering `period` and the period
    /// before it, or `None` when the fetch failed. Entries outside both periods,
    /// cancelled entries and records without a VAT tag are ignored.
    #[must_use]
    pub fn analyze(
        entity: &Entity,
        period: VatPeriod,
        records: Option<&[LedgerRecord]>,
        config: &AnalyticsConfig,
    ) -> VatPosition {
        let home = entity.jurisdiction().unwrap_or_default();
        let mut position = VatPosition {
            entity_id: entity.id,
            jurisdiction: home.clone(),
            period,
            output_vat: Decimal::ZERO,
            input_vat: Decimal::ZERO,
            net_payable: None,
            prior_net_payable: None,
            foreign_input: BTreeMap::new(),
            risk_flags: BTreeSet::new(),
            incomplete: None,
        };

        let Some(records) = records else {
            position.incomplete = Some(IncompleteReason::UpstreamUnavailable);
            return position;
        };

        let prior = period.previous();
        let lines: Vec<(&LedgerRecord, &VatTag)> = records
            .iter()
            .filter(|r| r.record_type == RecordType::VatEntry && r.status != RecordStatus::Cancelled)
            .filter(|r| period.contains(r.posting_date) || prior.contains(r.posting_date))
            .filter_map(|r| r.vat.as_ref().map(|tag| (r, tag)))
            .collect();

        if lines.iter().any(|(r, _)| r.currency != config.reporting_currency) {
            position.incomplete = Some(IncompleteReason::MixedCurrency);
            return position;
        }

        let (current, previous): (Vec<_>, Vec<_>) = lines
            .into_iter()
            .partition(|(r, _)| period.contains(r.posting_date));

        let dp = config.vat_rounding_dp;
        if !previous.is_empty() {
            position.prior_net_payable = Some(CurrencyService::round(Totals::of(&previous).net(), dp));
        }

        if current.is_empty() {
            position.incomplete = Some(IncompleteReason::NoPeriodData);
            return position;
        }

        let totals = Totals::of(&current);
        let net = CurrencyService::round(totals.net(), dp);
        position.output_vat = CurrencyService::round(totals.output, dp);
        position.input_vat = CurrencyService::round(totals.input, dp);
        position.net_payable = Some(net);
        position.foreign_input = Self::foreign_input(&current, &home, dp);

        if net > config.vat_payable_threshold {
            position.risk_flags.insert(RiskCode::PayableAboveThreshold);
        }
        if position
            .prior_net_payable
            .is_some_and(|prior| Self::is_sign_reversal(prior, net, config.vat_delta_threshold))
        {
            position.risk_flags.insert(RiskCode::SignReversal);
        }
        if position.foreign_input.values().any(|v| !v.is_zero()) {
            position.risk_flags.insert(RiskCode::ForeignInputVat);
        }
        if current.iter().any(|(_, t)| t.treatment == VatTreatment::ReverseCharge) {
            position.risk_flags.insert(RiskCode::ReverseChargeActivity);
        }
        if current.iter().any(|(_, t)| t.treatment == VatTreatment::Import) {
            position.risk_flags.insert(RiskCode::ImportVat);
        }

        position
    }

    /// Analyzes every registered entity for the period containing `as_of`.
    #[must_use]
    pub fn overview(
        registry: &EntityRegistry,
        books: &BTreeMap<EntityId, EntityBook>,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> VatOverview {
        let period = VatPeriod::containing(as_of, config.vat_cadence);
        let positions: Vec<VatPosition> = registry
            .entities()
            .iter()
            .map(|entity| {
                let records = books.get(&entity.id).and_then(EntityBook::records);
                Self::analyze(entity, period, records, config)
            })
            .collect();
        let critical = positions.iter().filter(|p| p.has_critical()).count();

        VatOverview {
            period,
            period_label: period.label(),
            positions,
            critical,
        }
    }

    /// Returns true if the net flipped sign with a swing above `delta`.
    #[must_use]
    pub fn is_sign_reversal(prior: Decimal, current: Decimal, delta: Decimal) -> bool {
        !prior.is_zero()
            && !current.is_zero()
            && prior.is_sign_negative() != current.is_sign_negative()
            && (current - prior).abs() > delta
    }

    /// Input VAT per foreign jurisdiction, net of reconciling self-assessments.
    fn foreign_input(
        lines: &[(&LedgerRecord, &VatTag)],
        home: &str,
        dp: u32,
    ) -> BTreeMap<String, Decimal> {
        let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
        for (record, tag) in lines {
            if tag.jurisdiction.eq_ignore_ascii_case(home) {
                continue;
            }
            let contribution = if tag.reconciling {
                -record.amount
            } else if tag.direction == VatDirection::Input {
                record.amount
            } else {
                continue;
            };
            *sums.entry(tag.jurisdiction.to_ascii_uppercase()).or_default() += contribution;
        }
        sums.into_iter()
            .map(|(jurisdiction, sum)| (jurisdiction, CurrencyService::round(sum, dp)))
            .collect()
    }
}
