//! Report types.

use chrono::NaiveDate;
use consolidator_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cashflow::CashflowOverview;
use crate::entity::Entity;
use crate::ledger::BankAccount;
use crate::overview::FinancialOverview;
use crate::reconciliation::ReconciliationResult;
use crate::vat::VatOverview;

/// Outcome of one report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// Complete.
    Ok,
    /// Produced, but some entities or periods are missing.
    Partial,
    /// Not produced, or produced without any entity data.
    Unavailable,
}

/// A report section with its status and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section<T> {
    /// Overall outcome.
    pub status: SectionStatus,
    /// Human-readable notes on anything missing or rejected.
    pub diagnostics: Vec<String>,
    /// The section payload; absent when the section failed outright.
    pub data: Option<T>,
}

impl<T> Section<T> {
    /// A section with data.
    #[must_use]
    pub const fn with_data(status: SectionStatus, data: T, diagnostics: Vec<String>) -> Self {
        Self {
            status,
            diagnostics,
            data: Some(data),
        }
    }

    /// A failed section.
    #[must_use]
    pub const fn failed(diagnostics: Vec<String>) -> Self {
        Self {
            status: SectionStatus::Unavailable,
            diagnostics,
            data: None,
        }
    }

    /// Returns true if the section is complete.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == SectionStatus::Ok
    }
}

/// An entity as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Registry entry.
    #[serde(flatten)]
    pub entity: Entity,
    /// VAT jurisdiction.
    pub jurisdiction: Option<String>,
    /// True if the entity's ledger was fetched.
    pub data_available: bool,
    /// Bank balance in the reporting currency, when known.
    pub bank_balance: Option<Decimal>,
    /// Balance per bank account, in the reporting currency where a rate is
    /// configured.
    pub bank_accounts: Vec<BankAccount>,
}

/// The composite result of one report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    /// Identifier of this report instance.
    pub report_id: Uuid,
    /// Reference date.
    pub as_of: NaiveDate,
    /// Currency all amounts are expressed in.
    pub reporting_currency: Currency,
    /// Registered entities in registry order.
    pub entities: Vec<EntitySummary>,
    /// Year-to-date results, debtors and creditors.
    pub overview: Section<FinancialOverview>,
    /// Intercompany positions and breaks.
    pub intercompany: Section<ReconciliationResult>,
    /// VAT positions and risk flags.
    pub vat: Section<VatOverview>,
    /// Cash projections.
    pub cashflow: Section<CashflowOverview>,
}

impl ConsolidatedReport {
    /// The worst status across all sections.
    #[must_use]
    pub fn overall_status(&self) -> SectionStatus {
        self.overview
            .status
            .max(self.intercompany.status)
            .max(self.vat.status)
            .max(self.cashflow.status)
    }
}
