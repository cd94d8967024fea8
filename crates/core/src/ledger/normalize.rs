//! Record normalization: currency conversion and de-duplication.

use std::collections::{BTreeSet, HashSet};

use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::{Currency, Money};
use rust_decimal::Decimal;

use super::bank::BankAccount;
use super::book::{EntityBook, EntitySnapshot};
use super::record::LedgerRecord;
use crate::currency::CurrencyService;

/// Output of [`Normalizer::normalize_records`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecords {
    /// Unique records, converted where a rate was configured.
    pub records: Vec<LedgerRecord>,
    /// Number of records dropped because their id was already seen.
    pub duplicates_dropped: usize,
    /// Currencies left native for lack of a rate.
    pub unconverted: BTreeSet<Currency>,
}

/// Output of [`Normalizer::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBook {
    /// The book handed to the engines.
    pub book: EntityBook,
    /// Number of duplicate records dropped.
    pub duplicates_dropped: usize,
    /// Currencies left native for lack of a rate.
    pub unconverted: BTreeSet<Currency>,
}

/// Brings fetched records into the reporting currency.
///
/// Records in a currency without a configured rate are kept native so that the
/// engines can reject them as a configuration error.
pub struct Normalizer<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> Normalizer<'a> {
    /// Creates a normalizer for `config`.
    #[must_use]
    pub const fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Converts and de-duplicates records, keeping the first of each id.
    #[must_use]
    pub fn normalize_records(&self, records: Vec<LedgerRecord>) -> NormalizedRecords {
        let target = self.config.reporting_currency;
        let mut seen = HashSet::with_capacity(records.len());
        let mut out = NormalizedRecords {
            records: Vec::with_capacity(records.len()),
            ..NormalizedRecords::default()
        };

        for mut record in records {
            if !seen.insert(record.id) {
                out.duplicates_dropped += 1;
                continue;
            }
            if record.currency != target {
                match self.config.fx_rate(record.currency) {
                    Some(rate) => {
                        record.amount = CurrencyService::to_reporting(record.amount, rate);
                        record.residual = CurrencyService::to_reporting(record.residual, rate);
                        record.currency = target;
                    }
                    None => {
                        out.unconverted.insert(record.currency);
                    }
                }
            }
            out.records.push(record);
        }

        out
    }

    /// Converts a bank balance, or returns `None` when no rate is known.
    #[must_use]
    pub fn normalize_balance(&self, balance: Money) -> Option<Decimal> {
        CurrencyService::convert_money(balance, self.config.reporting_currency, |c| {
            self.config.fx_rate(c)
        })
        .map(|m| m.amount)
    }

    /// Converts bank accounts into the reporting currency.
    ///
    /// Accounts without a rate stay native and their currency is added to
    /// `unconverted`. The total is only known when every account converted.
    pub fn normalize_accounts(
        &self,
        accounts: Vec<BankAccount>,
        unconverted: &mut BTreeSet<Currency>,
    ) -> (Vec<BankAccount>, Option<Decimal>) {
        let mut total = Some(Decimal::ZERO);
        let accounts = accounts
            .into_iter()
            .map(|account| match self.normalize_balance(account.balance) {
                Some(amount) => {
                    total = total.map(|t| t + amount);
                    BankAccount {
                        balance: Money::new(amount, self.config.reporting_currency),
                        ..account
                    }
                }
                None => {
                    total = None;
                    unconverted.insert(account.balance.currency);
                    account
                }
            })
            .collect();
        (accounts, total)
    }

    /// Normalizes a raw snapshot into an engine-ready book.
    #[must_use]
    pub fn normalize(&self, snapshot: EntitySnapshot) -> NormalizedBook {
        let records = match snapshot.records {
            Ok(records) => records,
            Err(error) => {
                return NormalizedBook {
                    book: EntityBook::Unavailable(error),
                    duplicates_dropped: 0,
                    unconverted: BTreeSet::new(),
                };
            }
        };

        let mut normalized = self.normalize_records(records);
        let (bank_accounts, bank_balance) = match snapshot.bank_accounts {
            Ok(accounts) => self.normalize_accounts(accounts, &mut normalized.unconverted),
            Err(_) => (Vec::new(), None),
        };

        NormalizedBook {
            book: EntityBook::Available {
                records: normalized.records,
                bank_balance,
                bank_accounts,
            },
            duplicates_dropped: normalized.duplicates_dropped,
            unconverted: normalized.unconverted,
        }
    }
}
