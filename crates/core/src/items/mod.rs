//! Items

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    pricing::{PricingError, money_from_major, to_major_units},
    roster::ParticipantSet,
};

pub mod confidence;

pub use confidence::{Confidence, ReviewThreshold};

/// Errors raised while constructing a line item.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    /// Item names must not be blank.
    #[error("item name must not be blank")]
    BlankName,

    /// Prices must be zero or positive.
    #[error("price of {name:?} must not be negative")]
    NegativePrice {
        /// Name of the offending item.
        name: String,
    },

    /// The price could not be converted to minor units.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One purchased product after extraction and editing.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    name: String,
    price: Money<'a, Currency>,
    confidence: Confidence,
    participants: ParticipantSet,
}

impl<'a> LineItem<'a> {
    /// Creates an unassigned item with full confidence.
    ///
    /// # Errors
    ///
    /// - [`ItemError::BlankName`]: the trimmed name is empty.
    /// - [`ItemError::NegativePrice`]: the price is below zero.
    pub fn new(name: &str, price: Money<'a, Currency>) -> Result<Self, ItemError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(ItemError::BlankName);
        }

        if price.to_minor_units() < 0 {
            return Err(ItemError::NegativePrice {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            price,
            confidence: Confidence::default(),
            participants: ParticipantSet::empty(),
        })
    }

    /// Creates an item from a major-unit amount such as `2.55`.
    ///
    /// Prices are held in whole minor units, so an amount finer than the
    /// currency allows is rounded half away from zero: `1.005` GBP becomes
    /// `1.01`. Extraction services report prices as floats, which often carry
    /// such residue.
    ///
    /// # Errors
    ///
    /// As [`LineItem::new`], plus [`ItemError::Pricing`] if the amount is not representable.
    pub fn from_major(
        name: &str,
        amount: Decimal,
        currency: &'a Currency,
    ) -> Result<Self, ItemError> {
        if amount < Decimal::ZERO {
            return Err(ItemError::NegativePrice {
                name: name.trim().to_string(),
            });
        }

        Self::new(name, money_from_major(amount, currency)?)
    }

    /// Sets the extraction confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// Sets who shares this item.
    #[must_use]
    pub fn with_participants(mut self, participants: ParticipantSet) -> Self {
        self.participants = participants;
        self
    }

    /// Returns the item name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the undiscounted price.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the undiscounted price as an exact major-unit amount.
    pub fn amount(&self) -> Decimal {
        to_major_units(self.price.to_minor_units(), self.price.currency())
    }

    /// Returns the extraction confidence.
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Returns who shares this item.
    pub fn participants(&self) -> &ParticipantSet {
        &self.participants
    }

    /// Whether the item should be flagged for a manual check.
    pub fn needs_review(&self, threshold: ReviewThreshold) -> bool {
        self.confidence.needs_review(threshold)
    }
}
