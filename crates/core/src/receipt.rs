//! Receipt

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    discounts::{DiscountConfig, discounted_amount},
    items::LineItem,
    pricing::to_minor_units,
    split::SplitError,
};

/// Totals for a whole receipt, before and after discounts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptSummary<'a> {
    /// Sum of the undiscounted item prices
    subtotal: Money<'a, Currency>,

    /// Sum of the per-item rounded discounted prices, assigned or not
    total: Money<'a, Currency>,
}

impl<'a> ReceiptSummary<'a> {
    /// Summarise `items` under the given discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`SplitError`] if a discounted amount cannot be computed or
    /// represented, or [`SplitError::Overflow`] if a total does not fit in minor units.
    pub fn from_items(
        items: &[LineItem<'a>],
        config: &DiscountConfig,
        currency: &'a Currency,
    ) -> Result<Self, SplitError> {
        let mut subtotal = 0_i64;
        let mut total = 0_i64;

        for item in items {
            let discounted = discounted_amount(item.amount(), config)?;
            let discounted = to_minor_units(discounted, currency)?;

            subtotal = subtotal
                .checked_add(item.price().to_minor_units())
                .ok_or(SplitError::Overflow)?;
            total = total
                .checked_add(discounted)
                .ok_or(SplitError::Overflow)?;
        }

        Ok(Self {
            subtotal: Money::from_minor(subtotal, currency),
            total: Money::from_minor(total, currency),
        })
    }

    /// Total cost before discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total cost after discounts
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Calculate the savings made by applying discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }
}

/// Outcome of comparing the extracted items against the printed receipt total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TotalCheck<'a> {
    /// The totals agree to the penny.
    Match,

    /// The extracted items add up to less than the receipt by this much.
    ParsedLower(Money<'a, Currency>),

    /// The extracted items add up to more than the receipt by this much.
    ParsedHigher(Money<'a, Currency>),
}

impl<'a> TotalCheck<'a> {
    /// Compare the sum of extracted prices with the total printed on the receipt.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the two amounts are in different currencies.
    pub fn compare(
        parsed: Money<'a, Currency>,
        actual: Money<'a, Currency>,
    ) -> Result<Self, MoneyError> {
        let difference = actual.sub(parsed)?.to_minor_units();
        let currency = parsed.currency();

        Ok(match difference {
            0 => Self::Match,
            d if d > 0 => Self::ParsedLower(Money::from_minor(d, currency)),
            d => Self::ParsedHigher(Money::from_minor(-d, currency)),
        })
    }

    /// Whether the totals agree.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}
