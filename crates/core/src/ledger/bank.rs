//! Bank accounts and their balances.

use consolidator_shared::types::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A bank account of an entity with its latest known balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Display name, e.g. the bank journal name.
    pub name: String,
    /// Balance in the account's currency.
    pub balance: Money,
}

impl BankAccount {
    /// Creates an account.
    #[must_use]
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// Sums the balances of `accounts`.
///
/// An entity without accounts has a zero balance in the default currency.
/// Returns `None` when the accounts are kept in different currencies.
#[must_use]
pub fn total_balance(accounts: &[BankAccount]) -> Option<Money> {
    let Some((first, rest)) = accounts.split_first() else {
        return Some(Money::zero(Currency::default()));
    };
    rest.iter()
        .try_fold(first.balance, |sum, account| sum.checked_add(account.balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_balance_sums_accounts() {
        let accounts = [
            BankAccount::new("ING", Money::new(dec!(12000.25), Currency::Eur)),
            BankAccount::new("Rabobank", Money::new(dec!(-500), Currency::Eur)),
        ];
        assert_eq!(
            total_balance(&accounts),
            Some(Money::new(dec!(11500.25), Currency::Eur))
        );
    }

    #[test]
    fn test_no_accounts_is_zero() {
        assert_eq!(total_balance(&[]), Some(Money::zero(Currency::Eur)));
    }

    #[test]
    fn test_mixed_currencies_have_no_total() {
        let accounts = [
            BankAccount::new("ING", Money::new(dec!(100), Currency::Eur)),
            BankAccount::new("Wise USD", Money::new(dec!(100), Currency::Usd)),
        ];
        assert_eq!(total_balance(&accounts), None);
    }
}
