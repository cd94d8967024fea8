//! Mapping of Odoo journal items to ledger records.
//!
//! Odoo signs `balance` as debit minus credit in company currency, which is
//! already the book-keeping entity's perspective for receivables, payables
//! and current accounts. VAT lines are flipped so that tax amounts are
//! positive for both directions, and income lines so that revenue is
//! positive.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use consolidator_core::ledger::{
    LedgerRecord, RecordStatus, RecordType, VatDirection, VatTag, VatTreatment,
};
use consolidator_shared::config::ErpConfig;
use consolidator_shared::types::{Currency, EntityId, RecordId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Fields requested from `account.move.line`.
pub const MOVE_LINE_FIELDS: &[&str] = &[
    "date",
    "date_maturity",
    "account_id",
    "account_type",
    "partner_id",
    "balance",
    "amount_residual",
    "tax_line_id",
];

/// Fields requested from `account.journal`.
pub const JOURNAL_FIELDS: &[&str] = &["name", "company_id", "current_statement_balance"];

/// A journal item as returned by `search_read`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveLine {
    /// Line id.
    pub id: u64,
    /// Accounting date.
    #[serde(deserialize_with = "odoo_date")]
    pub date: Option<NaiveDate>,
    /// Maturity date.
    #[serde(default, deserialize_with = "odoo_date")]
    pub date_maturity: Option<NaiveDate>,
    /// Account as `[id, "code name"]`.
    #[serde(default, deserialize_with = "many2one")]
    pub account_id: Option<(u64, String)>,
    /// Account type, e.g. `asset_receivable`.
    #[serde(default, deserialize_with = "odoo_string")]
    pub account_type: Option<String>,
    /// Partner as `[id, name]`.
    #[serde(default, deserialize_with = "many2one")]
    pub partner_id: Option<(u64, String)>,
    /// Debit minus credit.
    #[serde(deserialize_with = "odoo_decimal")]
    pub balance: Decimal,
    /// Open amount.
    #[serde(default, deserialize_with = "odoo_decimal")]
    pub amount_residual: Decimal,
    /// Originating tax as `[id, name]`, set on tax lines.
    #[serde(default, deserialize_with = "many2one")]
    pub tax_line_id: Option<(u64, String)>,
}

impl MoveLine {
    /// Account code, the first token of the account's display name.
    #[must_use]
    pub fn account_code(&self) -> Option<&str> {
        self.account_id
            .as_ref()
            .and_then(|(_, name)| name.split_whitespace().next())
    }
}

/// A bank journal as returned by `search_read`.
#[derive(Debug, Clone, Deserialize)]
pub struct BankJournal {
    /// Journal id.
    pub id: u64,
    /// Journal name, usually the bank and account number.
    #[serde(default, deserialize_with = "odoo_string")]
    pub name: Option<String>,
    /// Balance of the last statement.
    #[serde(default, deserialize_with = "odoo_decimal")]
    pub current_statement_balance: Decimal,
}

/// How an account code is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Current account with a group entity.
    Intercompany(EntityId),
    /// VAT account.
    Vat(VatDirection),
    /// Receivable or payable.
    OpenItem,
    /// Bank or cash.
    Bank,
    /// Income account.
    Revenue,
    /// Expense or cost-of-sales account.
    Cost,
}

/// Chart-of-accounts mapping.
#[derive(Debug, Clone)]
pub struct AccountMapping {
    intercompany: HashMap<String, EntityId>,
    vat_output_prefixes: Vec<String>,
    vat_input_prefixes: Vec<String>,
    revenue_prefixes: Vec<String>,
    cost_prefixes: Vec<String>,
    currency: Currency,
}

impl AccountMapping {
    /// Builds the mapping from ERP configuration.
    #[must_use]
    pub fn from_config(config: &ErpConfig) -> Self {
        Self {
            intercompany: config
                .intercompany_accounts
                .iter()
                .map(|(code, entity)| (code.clone(), EntityId(*entity)))
                .collect(),
            vat_output_prefixes: config.vat_output_prefixes.clone(),
            vat_input_prefixes: config.vat_input_prefixes.clone(),
            revenue_prefixes: config.revenue_prefixes.clone(),
            cost_prefixes: config.cost_prefixes.clone(),
            currency: config.company_currency,
        }
    }

    /// Intercompany account codes, sorted.
    #[must_use]
    pub fn intercompany_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.intercompany.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Currency of the companies' books.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Classifies an account by code and Odoo account type.
    #[must_use]
    pub fn classify(&self, code: &str, account_type: Option<&str>) -> Option<AccountKind> {
        if let Some(entity) = self.intercompany.get(code) {
            return Some(AccountKind::Intercompany(*entity));
        }
        if has_prefix(&self.vat_output_prefixes, code) {
            return Some(AccountKind::Vat(VatDirection::Output));
        }
        if has_prefix(&self.vat_input_prefixes, code) {
            return Some(AccountKind::Vat(VatDirection::Input));
        }
        match account_type {
            Some("asset_receivable" | "liability_payable") => Some(AccountKind::OpenItem),
            Some("asset_cash") => Some(AccountKind::Bank),
            _ if has_prefix(&self.revenue_prefixes, code) => Some(AccountKind::Revenue),
            _ if has_prefix(&self.cost_prefixes, code) => Some(AccountKind::Cost),
            _ => None,
        }
    }

    /// Maps a journal item of `entity` to a record.
    ///
    /// Returns `None` for lines on accounts the analytics do not use and for
    /// lines booked against the entity's own current account.
    #[must_use]
    pub fn map_line(&self, line: &MoveLine, entity: EntityId, home: &str) -> Option<LedgerRecord> {
        let code = line.account_code()?;
        let kind = self.classify(code, line.account_type.as_deref())?;
        let posting_date = line.date?;

        let record = match kind {
            AccountKind::Intercompany(counterparty) if counterparty == entity => return None,
            AccountKind::Intercompany(counterparty) => self
                .record(line, entity, RecordType::Journal, line.balance, posting_date)
                .with_counterparty(counterparty),
            AccountKind::Vat(direction) => {
                let amount = match direction {
                    VatDirection::Output => -line.balance,
                    VatDirection::Input => line.balance,
                };
                let tag = line.tax_line_id.as_ref().map_or_else(
                    || VatTag::standard(direction, home, Decimal::ZERO),
                    |(_, name)| parse_tax_name(name, direction, home),
                );
                self.record(line, entity, RecordType::VatEntry, amount, posting_date)
                    .with_residual(Decimal::ZERO)
                    .with_status(RecordStatus::Paid)
                    .with_vat(tag)
            }
            AccountKind::OpenItem => {
                let mut record =
                    self.record(line, entity, RecordType::Invoice, line.balance, posting_date);
                if let Some(due) = line.date_maturity {
                    record = record.with_due_date(due);
                }
                record
            }
            AccountKind::Bank => self
                .record(line, entity, RecordType::Bank, line.balance, posting_date)
                .with_residual(Decimal::ZERO)
                .with_status(RecordStatus::Paid),
            AccountKind::Revenue => self
                .record(line, entity, RecordType::Revenue, -line.balance, posting_date)
                .with_residual(Decimal::ZERO)
                .with_status(RecordStatus::Paid),
            AccountKind::Cost => self
                .record(line, entity, RecordType::Cost, line.balance, posting_date)
                .with_residual(Decimal::ZERO)
                .with_status(RecordStatus::Paid),
        };

        Some(match &line.partner_id {
            Some((_, name)) => record.with_counterparty_name(name.clone()),
            None => record,
        })
    }

    fn record(
        &self,
        line: &MoveLine,
        entity: EntityId,
        record_type: RecordType,
        amount: Decimal,
        posting_date: NaiveDate,
    ) -> LedgerRecord {
        LedgerRecord::new(
            RecordId(line.id),
            entity,
            record_type,
            amount,
            self.currency,
            posting_date,
        )
        .with_residual(line.amount_residual)
        .with_status(settlement_status(amount, line.amount_residual))
    }
}

fn has_prefix(prefixes: &[String], code: &str) -> bool {
    prefixes.iter().any(|p| code.starts_with(p.as_str()))
}

/// Settlement status from the original and remaining amounts.
#[must_use]
pub fn settlement_status(amount: Decimal, residual: Decimal) -> RecordStatus {
    if residual.is_zero() {
        RecordStatus::Paid
    } else if residual == amount {
        RecordStatus::Open
    } else {
        RecordStatus::Partial
    }
}

/// Derives a VAT tag from an Odoo tax name such as `BE 21% S` or
/// `21% BTW verlegd`.
///
/// A leading two-letter country code sets the jurisdiction, otherwise `home`
/// applies. The first `n%` token is the rate. Reverse-charge and import
/// keywords set the treatment; the output side of such a tax is the
/// self-assessment that reconciles the matching input.
#[must_use]
pub fn parse_tax_name(name: &str, direction: VatDirection, home: &str) -> VatTag {
    let jurisdiction = name
        .split_whitespace()
        .next()
        .filter(|t| t.len() == 2 && t.chars().all(|c| c.is_ascii_uppercase()) && *t != "EU")
        .unwrap_or(home);

    let rate = name
        .split_whitespace()
        .find_map(|t| t.strip_suffix('%'))
        .and_then(|n| Decimal::from_str(&n.replace(',', ".")).ok())
        .unwrap_or(Decimal::ZERO);

    let lower = name.to_lowercase();
    let treatment = if ["verlegd", "reverse", "intracom"].iter().any(|k| lower.contains(k)) {
        VatTreatment::ReverseCharge
    } else if ["import", "invoer", "buiten de eu"].iter().any(|k| lower.contains(k)) {
        VatTreatment::Import
    } else {
        VatTreatment::Standard
    };

    let tag = VatTag::standard(direction, jurisdiction, rate).with_treatment(treatment);
    if treatment != VatTreatment::Standard && direction == VatDirection::Output {
        tag.reconciling()
    } else {
        tag
    }
}

/// Converts a JSON number to cents through its textual form.
///
/// # Errors
///
/// Returns the text that could not be parsed.
pub fn decimal_from_number(number: &serde_json::Number) -> Result<Decimal, String> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .map_err(|_| text)
}

fn odoo_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => decimal_from_number(&n)
            .map_err(|t| serde::de::Error::custom(format!("invalid amount {t}"))),
        Value::Bool(false) | Value::Null => Ok(Decimal::ZERO),
        other => Err(serde::de::Error::custom(format!("expected amount, got {other}"))),
    }
}

fn odoo_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        Value::Bool(false) | Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!("expected date, got {other}"))),
    }
}

fn odoo_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Bool(false) | Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!("expected string, got {other}"))),
    }
}

fn many2one<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<(u64, String)>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => match items.as_slice() {
            [Value::Number(id), Value::String(name)] => id
                .as_u64()
                .map(|id| Some((id, name.clone())))
                .ok_or_else(|| serde::de::Error::custom("many2one id is not an integer")),
            _ => Err(serde::de::Error::custom("expected [id, name]")),
        },
        Value::Bool(false) | Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!("expected [id, name], got {other}"))),
    }
}
