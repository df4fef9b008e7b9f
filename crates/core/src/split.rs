//! Split
//!
//! The finalize pipeline: discount every item, then allocate the results.
//! Nothing is cached, so re-running with different discount settings always
//! recomputes from the raw prices.

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    allocation::{Allocation, AllocationError, Allocator, PricedShare, RemainderPolicy},
    discounts::{DiscountConfig, DiscountError, discounted_amount},
    items::LineItem,
    pricing::PricingError,
    roster::Roster,
};

/// Errors raised while splitting a receipt.
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    /// An item was priced in a different currency from the split.
    #[error("item {index} is priced in {found}, expected {expected}")]
    CurrencyMismatch {
        /// Position of the item.
        index: usize,

        /// Currency of the split.
        expected: &'static str,

        /// Currency of the item.
        found: &'static str,
    },

    /// Discount calculation failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// A discounted amount could not be converted to minor units.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// A receipt total overflowed.
    #[error("receipt total overflowed")]
    Overflow,
}

/// Applies the discount engine to every item.
///
/// # Errors
///
/// - [`SplitError::CurrencyMismatch`]: an item is not priced in `currency`.
/// - [`SplitError::Discount`]: a discounted amount overflowed.
pub fn priced_shares(
    items: &[LineItem<'_>],
    config: &DiscountConfig,
    currency: &Currency,
) -> Result<Vec<PricedShare>, SplitError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item_currency = item.price().currency();

            if item_currency.iso_alpha_code != currency.iso_alpha_code {
                return Err(SplitError::CurrencyMismatch {
                    index,
                    expected: currency.iso_alpha_code,
                    found: item_currency.iso_alpha_code,
                });
            }

            Ok(PricedShare::new(
                discounted_amount(item.amount(), config)?,
                item.participants().clone(),
            ))
        })
        .collect()
}

/// Discounts and allocates a receipt's items between the roster.
///
/// # Errors
///
/// Returns a [`SplitError`] if discounting or allocation fails.
pub fn split_items<'a, P: RemainderPolicy>(
    items: &[LineItem<'a>],
    config: &DiscountConfig,
    roster: &Roster,
    currency: &'a Currency,
    policy: P,
) -> Result<Allocation<'a>, SplitError> {
    let shares = priced_shares(items, config, currency)?;

    Ok(Allocator::with_policy(roster, currency, policy).allocate(&shares)?)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use crate::allocation::RoundRobin;

    use super::*;

    #[test]
    fn flat_discount_scenario() -> TestResult {
        let roster = Roster::new(&["Joe", "Nic", "Nat"])?;
        let items = [
            LineItem::from_major("Tea", Decimal::new(300, 2), GBP)?
                .with_participants(roster.everyone()),
            LineItem::from_major("Bread", Decimal::new(200, 2), GBP)?
                .with_participants(roster.select(&["Joe"])?),
        ];
        let config = DiscountConfig::new(true, Decimal::ZERO)?;

        let allocation = split_items(&items, &config, &roster, GBP, RoundRobin)?;

        assert_eq!(allocation.totals(), &[255, 85, 85]);
        assert_eq!(allocation.grand_total(), Money::from_minor(425, GBP));

        Ok(())
    }

    #[test]
    fn changing_discounts_recomputes_from_raw_prices() -> TestResult {
        let roster = Roster::new(&["Joe", "Nic"])?;
        let items = [LineItem::from_major("Cheese", Decimal::new(1000, 2), GBP)?
            .with_participants(roster.everyone())];

        let flat = DiscountConfig::new(true, Decimal::ZERO)?;
        let both = DiscountConfig::new(true, Decimal::TEN)?;

        let first = split_items(&items, &flat, &roster, GBP, RoundRobin)?;
        let second = split_items(&items, &both, &roster, GBP, RoundRobin)?;
        let again = split_items(&items, &flat, &roster, GBP, RoundRobin)?;

        assert_eq!(first.grand_total_minor(), 850);
        assert_eq!(second.grand_total_minor(), 765);
        assert_eq!(first, again);

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() -> TestResult {
        let roster = Roster::new(&["Joe"])?;
        let items = [LineItem::new("Gum", Money::from_minor(100, USD))?];

        assert_eq!(
            priced_shares(&items, &DiscountConfig::none(), GBP),
            Err(SplitError::CurrencyMismatch {
                index: 0,
                expected: "GBP",
                found: "USD",
            })
        );
        assert!(split_items(&items, &DiscountConfig::none(), &roster, GBP, RoundRobin).is_err());

        Ok(())
    }
}
