//! Normalized ledger record.

use chrono::NaiveDate;
use consolidator_shared::types::{Currency, EntityId, RecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CurrencyMismatch;

/// Kind of ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Customer or vendor invoice line.
    Invoice,
    /// Payment line.
    Payment,
    /// Journal line (intercompany current account, manual entries).
    Journal,
    /// Bank statement line.
    Bank,
    /// Tax line on a VAT account.
    VatEntry,
    /// Income line. `amount` is positive for income, negative for a reversal.
    Revenue,
    /// Expense line, cost of sales included. `amount` is positive for an
    /// expense, negative for a reversal.
    Cost,
}

impl RecordType {
    /// Returns true for profit and loss lines.
    #[must_use]
    pub const fn is_profit_and_loss(self) -> bool {
        matches!(self, Self::Revenue | Self::Cost)
    }
}

/// Settlement status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Nothing settled yet.
    Open,
    /// Fully settled.
    Paid,
    /// Partly settled; `residual` holds the rest.
    Partial,
    /// Reversed or voided.
    Cancelled,
}

impl RecordStatus {
    /// Returns true if an amount is still outstanding.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Open | Self::Partial)
    }
}

/// Direction of a VAT line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatDirection {
    /// VAT charged on sales.
    Output,
    /// VAT paid on purchases.
    Input,
}

/// VAT treatment of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatTreatment {
    /// Domestic VAT.
    Standard,
    /// Intra-community reverse charge.
    ReverseCharge,
    /// VAT on imports.
    Import,
}

/// VAT classification of a `vat_entry` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatTag {
    /// Output or input.
    pub direction: VatDirection,
    /// ISO country code of the jurisdiction the tax belongs to.
    pub jurisdiction: String,
    /// Rate in percent, e.g. `21`.
    pub rate: Decimal,
    /// Domestic, reverse-charge or import.
    pub treatment: VatTreatment,
    /// Self-assessment offsetting foreign input VAT in the same jurisdiction.
    pub reconciling: bool,
}

impl VatTag {
    /// A standard-treatment tag.
    #[must_use]
    pub fn standard(direction: VatDirection, jurisdiction: &str, rate: Decimal) -> Self {
        Self {
            direction,
            jurisdiction: jurisdiction.to_ascii_uppercase(),
            rate,
            treatment: VatTreatment::Standard,
            reconciling: false,
        }
    }

    /// Sets the treatment.
    #[must_use]
    pub const fn with_treatment(mut self, treatment: VatTreatment) -> Self {
        self.treatment = treatment;
        self
    }

    /// Marks the tag as reconciling.
    #[must_use]
    pub const fn reconciling(mut self) -> Self {
        self.reconciling = true;
        self
    }
}

/// A single normalized ledger record.
///
/// Amounts are signed from the book-keeping entity's perspective: amounts owed
/// to the entity are positive, amounts it owes are negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// ERP line id.
    pub id: RecordId,
    /// Entity that booked the record.
    pub entity_id: EntityId,
    /// Kind of record.
    pub record_type: RecordType,
    /// Counterparty, when it is a group entity.
    pub counterparty_id: Option<EntityId>,
    /// Counterparty display name.
    pub counterparty_name: Option<String>,
    /// Signed amount.
    pub amount: Decimal,
    /// Signed remaining open amount.
    pub residual: Decimal,
    /// Currency of `amount` and `residual`.
    pub currency: Currency,
    /// Maturity date.
    pub due_date: Option<NaiveDate>,
    /// Accounting date.
    pub posting_date: NaiveDate,
    /// Settlement status.
    pub status: RecordStatus,
    /// VAT classification, set on `vat_entry` records.
    pub vat: Option<VatTag>,
}

impl LedgerRecord {
    /// Creates an open record whose residual equals its amount.
    #[must_use]
    pub fn new(
        id: RecordId,
        entity_id: EntityId,
        record_type: RecordType,
        amount: Decimal,
        currency: Currency,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            entity_id,
            record_type,
            counterparty_id: None,
            counterparty_name: None,
            amount,
            residual: amount,
            currency,
            due_date: None,
            posting_date,
            status: RecordStatus::Open,
            vat: None,
        }
    }

    /// Sets a group counterparty.
    #[must_use]
    pub const fn with_counterparty(mut self, counterparty: EntityId) -> Self {
        self.counterparty_id = Some(counterparty);
        self
    }

    /// Sets the counterparty display name.
    #[must_use]
    pub fn with_counterparty_name(mut self, name: impl Into<String>) -> Self {
        self.counterparty_name = Some(name.into());
        self
    }

    /// Sets the residual.
    #[must_use]
    pub const fn with_residual(mut self, residual: Decimal) -> Self {
        self.residual = residual;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    /// Attaches a VAT tag.
    #[must_use]
    pub fn with_vat(mut self, vat: VatTag) -> Self {
        self.vat = Some(vat);
        self
    }

    /// Due date, defaulting to the posting date.
    #[must_use]
    pub fn effective_due_date(&self) -> NaiveDate {
        self.due_date.unwrap_or(self.posting_date)
    }

    /// Returns true for intercompany current-account lines.
    #[must_use]
    pub const fn is_intercompany(&self) -> bool {
        matches!(self.record_type, RecordType::Journal) && self.counterparty_id.is_some()
    }

    /// Returns true for outstanding receivables and payables, the items that
    /// feed the cash projection. Intercompany current-account journals carry a
    /// balance but no maturity and never count.
    #[must_use]
    pub const fn is_open_item(&self) -> bool {
        matches!(self.record_type, RecordType::Invoice) && self.status.is_outstanding()
    }

    /// Returns true for records whose balance carries over across periods.
    ///
    /// Sources return these regardless of the query window's start.
    #[must_use]
    pub const fn is_balance_carrying(&self) -> bool {
        self.is_intercompany() || self.is_open_item()
    }
}

/// Checks that every record is expressed in `expected`.
///
/// # Errors
///
/// Returns the first record in another currency.
pub fn ensure_currency<'a, I>(records: I, expected: Currency) -> Result<(), CurrencyMismatch>
where
    I: IntoIterator<Item = &'a LedgerRecord>,
{
    match records.into_iter().find(|r| r.currency != expected) {
        Some(r) => Err(CurrencyMismatch {
            record: r.id,
            entity: r.entity_id,
            expected,
            found: r.currency,
        }),
        None => Ok(()),
    }
}
