//! Pricing
//!
//! Conversions between major-unit decimal amounts and integer minor units.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::items::LineItem;

/// Errors that can occur while converting or totalling prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No items were provided, so currency could not be determined.
    #[error("no items provided; cannot determine currency")]
    NoItems,

    /// The amount does not fit in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    NotRepresentable(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Rounds a major-unit amount to whole minor units (pennies for GBP).
///
/// Midpoints round away from zero, so `0.005` becomes `1`.
///
/// # Errors
///
/// Returns [`PricingError::NotRepresentable`] if the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, PricingError> {
    let scale = Decimal::from(10_i64.pow(currency.exponent));

    amount
        .checked_mul(scale)
        .ok_or(PricingError::NotRepresentable(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::NotRepresentable(amount))
}

/// Converts minor units back into an exact major-unit amount.
pub fn to_major_units(minor: i64, currency: &Currency) -> Decimal {
    Decimal::new(minor, currency.exponent)
}

/// Builds a money value from a major-unit amount, rounded to the currency's minor unit.
///
/// # Errors
///
/// Returns [`PricingError::NotRepresentable`] if the amount does not fit in minor units.
pub fn money_from_major<'a>(
    amount: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    Ok(Money::from_minor(to_minor_units(amount, currency)?, currency))
}

/// Calculates the total undiscounted price of a list of items.
///
/// # Errors
///
/// - [`PricingError::NoItems`]: No items were provided, so currency could not be determined.
/// - [`PricingError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(items: &[LineItem<'a>]) -> Result<Money<'a, Currency>, PricingError> {
    let first = items.first().ok_or(PricingError::NoItems)?;

    let total = items.iter().try_fold(
        Money::from_minor(0, first.price().currency()),
        |acc, item| acc.add(*item.price()),
    )?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, JPY};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rounds_half_pennies_away_from_zero() -> TestResult {
        assert_eq!(to_minor_units(Decimal::new(255, 2), GBP)?, 255);
        assert_eq!(to_minor_units(Decimal::new(8415, 4), GBP)?, 84);
        assert_eq!(to_minor_units(Decimal::new(1005, 3), GBP)?, 101);
        assert_eq!(to_minor_units(Decimal::new(5, 3), GBP)?, 1);

        Ok(())
    }

    #[test]
    fn respects_currency_exponent() -> TestResult {
        assert_eq!(to_minor_units(Decimal::new(1505, 1), JPY)?, 151);

        Ok(())
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        assert!(matches!(
            to_minor_units(Decimal::MAX, GBP),
            Err(PricingError::NotRepresentable(_))
        ));
    }

    #[test]
    fn major_units_round_trip_is_exact() {
        assert_eq!(to_major_units(425, GBP), Decimal::new(425, 2));
    }

    #[test]
    fn total_price_sums_items() -> TestResult {
        let items = [
            LineItem::new("Milk", Money::from_minor(100, GBP))?,
            LineItem::new("Bread", Money::from_minor(200, GBP))?,
        ];

        assert_eq!(total_price(&items)?, Money::from_minor(300, GBP));

        Ok(())
    }

    #[test]
    fn total_price_empty() {
        let items: [LineItem<'static>; 0] = [];

        assert!(matches!(total_price(&items), Err(PricingError::NoItems)));
    }
}
