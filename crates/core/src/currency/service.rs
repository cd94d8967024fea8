//! Currency service for conversion and rounding.
//!
//! Record amounts are converted into the reporting currency at four decimal
//! places so that aggregates can still be rounded once, at the end.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use consolidator_shared::types::{Currency, Money};

/// Precision kept on converted line amounts.
pub const LINE_PRECISION: u32 = 4;

/// Currency service for conversion operations.
///
/// All rounding uses Banker's Rounding (`MidpointNearestEven`).
pub struct CurrencyService;

impl CurrencyService {
    /// Converts a native amount into the reporting currency.
    ///
    /// `rate` is the number of reporting units per native unit. The result keeps
    /// [`LINE_PRECISION`] decimal places.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use consolidator_core::currency::CurrencyService;
    ///
    /// let eur = CurrencyService::to_reporting(dec!(100), dec!(0.9215));
    /// assert_eq!(eur, dec!(92.1500));
    /// ```
    #[must_use]
    pub fn to_reporting(amount: Decimal, rate: Decimal) -> Decimal {
        Self::round(amount * rate, LINE_PRECISION)
    }

    /// Converts `money` into `target` using `rate_of`, which yields the rate for a
    /// source currency.
    ///
    /// Returns `None` when no rate is known. Amounts already in `target` pass
    /// through untouched.
    #[must_use]
    pub fn convert_money<F>(money: Money, target: Currency, rate_of: F) -> Option<Money>
    where
        F: Fn(Currency) -> Option<Decimal>,
    {
        if money.currency == target {
            return Some(money);
        }
        let rate = rate_of(money.currency)?;
        Some(Money::new(Self::to_reporting(money.amount, rate), target))
    }

    /// Rounds a value using Banker's Rounding.
    #[must_use]
    pub fn round(value: Decimal, decimal_places: u32) -> Decimal {
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
    }
}
