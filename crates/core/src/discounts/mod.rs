//! Discounts
//!
//! The discount engine: a flat staff discount followed by an optional extra
//! percentage, composed multiplicatively in that order. Results are left
//! unrounded; conversion to minor units happens once, in the allocator.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The flat discount rate applied when [`DiscountConfig::flat_discount`] is set (15%).
pub const FLAT_DISCOUNT_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// The extra percentage was negative or above 100.
    #[error("extra discount must be between 0 and 100 percent, got {0}")]
    ExtraPercentOutOfRange(Decimal),

    /// The discounted amount could not be represented.
    #[error("discount calculation overflowed")]
    Overflow,
}

/// Receipt-wide discount settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDiscountConfig", into = "RawDiscountConfig")]
pub struct DiscountConfig {
    flat_discount: bool,
    extra_percent: Decimal,
}

impl DiscountConfig {
    /// Creates a discount configuration.
    ///
    /// Out-of-range percentages are rejected, not clamped.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::ExtraPercentOutOfRange`] unless `0 <= extra_percent <= 100`.
    pub fn new(flat_discount: bool, extra_percent: Decimal) -> Result<Self, DiscountError> {
        if extra_percent < Decimal::ZERO || extra_percent > Decimal::ONE_HUNDRED {
            return Err(DiscountError::ExtraPercentOutOfRange(extra_percent));
        }

        Ok(Self {
            flat_discount,
            extra_percent,
        })
    }

    /// No discounts at all.
    pub fn none() -> Self {
        Self {
            flat_discount: false,
            extra_percent: Decimal::ZERO,
        }
    }

    /// Whether the flat discount applies.
    pub fn flat_discount(&self) -> bool {
        self.flat_discount
    }

    /// The extra percentage applied after the flat discount.
    pub fn extra_percent(&self) -> Decimal {
        self.extra_percent
    }
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for DiscountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% flat: {}, extra: {}%",
            (FLAT_DISCOUNT_RATE * Decimal::ONE_HUNDRED).normalize(),
            if self.flat_discount { "ON" } else { "OFF" },
            self.extra_percent.normalize()
        )
    }
}

#[derive(Serialize, Deserialize)]
struct RawDiscountConfig {
    flat_discount: bool,
    extra_percent: Decimal,
}

impl TryFrom<RawDiscountConfig> for DiscountConfig {
    type Error = DiscountError;

    fn try_from(raw: RawDiscountConfig) -> Result<Self, Self::Error> {
        Self::new(raw.flat_discount, raw.extra_percent)
    }
}

impl From<DiscountConfig> for RawDiscountConfig {
    fn from(config: DiscountConfig) -> Self {
        Self {
            flat_discount: config.flat_discount,
            extra_percent: config.extra_percent,
        }
    }
}

/// Applies the configured discounts to a price in major units.
///
/// The flat discount is applied first, then the extra percentage. The result
/// is not rounded.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the multiplication cannot be represented.
pub fn discounted_amount(
    price: Decimal,
    config: &DiscountConfig,
) -> Result<Decimal, DiscountError> {
    let mut amount = price;

    if config.flat_discount {
        amount = amount
            .checked_mul(Decimal::ONE - FLAT_DISCOUNT_RATE)
            .ok_or(DiscountError::Overflow)?;
    }

    if config.extra_percent > Decimal::ZERO {
        let remaining = Decimal::ONE - config.extra_percent / Decimal::ONE_HUNDRED;

        amount = amount
            .checked_mul(remaining)
            .ok_or(DiscountError::Overflow)?;
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config(flat: bool, extra: i64) -> Result<DiscountConfig, DiscountError> {
        DiscountConfig::new(flat, Decimal::from(extra))
    }

    #[test]
    fn flat_discount_takes_fifteen_percent() -> TestResult {
        let price = Decimal::ONE_HUNDRED;

        assert_eq!(discounted_amount(price, &config(true, 0)?)?, Decimal::new(8500, 2));

        Ok(())
    }

    #[test]
    fn extra_discount_applies_after_flat_discount() -> TestResult {
        let price = Decimal::ONE_HUNDRED;

        assert_eq!(discounted_amount(price, &config(true, 10)?)?, Decimal::new(7650, 2));

        Ok(())
    }

    #[test]
    fn no_discount_leaves_price_untouched() -> TestResult {
        let price = Decimal::new(1999, 2);

        assert_eq!(discounted_amount(price, &DiscountConfig::none())?, price);
        assert_eq!(discounted_amount(price, &config(false, 0)?)?, price);

        Ok(())
    }

    #[test]
    fn result_is_not_rounded() -> TestResult {
        // 0.99 * 0.85 = 0.8415
        let amount = discounted_amount(Decimal::new(99, 2), &config(true, 0)?)?;

        assert_eq!(amount, Decimal::new(8415, 4));

        Ok(())
    }

    #[test]
    fn full_extra_discount_makes_items_free() -> TestResult {
        let amount = discounted_amount(Decimal::new(450, 2), &config(true, 100)?)?;

        assert!(amount.is_zero());

        Ok(())
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        assert_eq!(
            config(false, -1),
            Err(DiscountError::ExtraPercentOutOfRange(Decimal::from(-1)))
        );
        assert_eq!(
            config(true, 101),
            Err(DiscountError::ExtraPercentOutOfRange(Decimal::from(101)))
        );
    }

    #[test]
    fn deserialization_validates_the_percentage() {
        let parsed = serde_json::from_str::<DiscountConfig>(
            r#"{"flat_discount":true,"extra_percent":"150"}"#,
        );

        assert!(parsed.is_err());
    }

    #[test]
    fn display_summarises_active_discounts() -> TestResult {
        let summary = DiscountConfig::new(true, Decimal::new(125, 1))?.to_string();

        assert_eq!(summary, "15% flat: ON, extra: 12.5%");

        Ok(())
    }
}
