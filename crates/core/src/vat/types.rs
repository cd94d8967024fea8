//! VAT types.

use std::collections::{BTreeMap, BTreeSet};

use consolidator_shared::types::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::VatPeriod;

/// How urgently a flag needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Regulatory exposure; act before filing.
    Critical,
    /// Worth a check; usually a filing formality.
    Attention,
}

/// A VAT risk condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCode {
    /// R1: net payable above the configured threshold.
    PayableAboveThreshold,
    /// R2: net position flipped sign with a large swing.
    SignReversal,
    /// R3: foreign input VAT without an offsetting self-assessment.
    ForeignInputVat,
    /// R4: intra-community reverse-charge activity.
    ReverseChargeActivity,
    /// R5: import VAT activity.
    ImportVat,
}

impl RiskCode {
    /// Short rule code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PayableAboveThreshold => "R1",
            Self::SignReversal => "R2",
            Self::ForeignInputVat => "R3",
            Self::ReverseChargeActivity => "R4",
            Self::ImportVat => "R5",
        }
    }

    /// Severity of the rule.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::PayableAboveThreshold | Self::SignReversal | Self::ForeignInputVat => {
                Severity::Critical
            }
            Self::ReverseChargeActivity | Self::ImportVat => Severity::Attention,
        }
    }

    /// Follow-up the flag asks for.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::PayableAboveThreshold => "Reserve cash for the VAT payment",
            Self::SignReversal => "Review the period's VAT bookings for misclassification",
            Self::ForeignInputVat => "Verify the foreign VAT registration or reclaim procedure",
            Self::ReverseChargeActivity => "Check the ICP listing",
            Self::ImportVat => "Check the import deferment licence",
        }
    }
}

/// Why a position has no net figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompleteReason {
    /// No VAT entries in the current period.
    NoPeriodData,
    /// The entity's ledger could not be fetched.
    UpstreamUnavailable,
    /// Some entries are not in the reporting currency.
    MixedCurrency,
}

/// One entity's VAT position for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatPosition {
    /// Entity.
    pub entity_id: EntityId,
    /// Home jurisdiction (VAT number prefix).
    pub jurisdiction: String,
    /// Filing period.
    pub period: VatPeriod,
    /// Output VAT, rounded once.
    pub output_vat: Decimal,
    /// Input VAT, rounded once.
    pub input_vat: Decimal,
    /// Output minus input, positive when payable. `None` when incomplete.
    pub net_payable: Option<Decimal>,
    /// Net payable of the previous period, when it has entries.
    pub prior_net_payable: Option<Decimal>,
    /// Unreconciled foreign input VAT per jurisdiction.
    pub foreign_input: BTreeMap<String, Decimal>,
    /// Triggered rules.
    pub risk_flags: BTreeSet<RiskCode>,
    /// Set when the net figure could not be produced.
    pub incomplete: Option<IncompleteReason>,
}

impl VatPosition {
    /// Returns true if any critical rule triggered.
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.risk_flags
            .iter()
            .any(|f| f.severity() == Severity::Critical)
    }
}

/// VAT positions of all entities for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatOverview {
    /// Current filing period.
    pub period: VatPeriod,
    /// Period label, e.g. `2025-Q2`.
    pub period_label: String,
    /// One position per entity, in registry order.
    pub positions: Vec<VatPosition>,
    /// Number of positions with a critical flag.
    pub critical: usize,
}
