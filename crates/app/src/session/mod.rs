//! Receipt session
//!
//! Everything a user edits while splitting one receipt: the extracted items,
//! who shares each one, the discount settings and the printed total. The
//! session is plain data; every calculation is delegated to the core crate
//! and recomputed from scratch on request.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use splitter::{
    allocation::{Allocation, RemainderPolicy},
    discounts::DiscountConfig,
    items::{Confidence, LineItem, ReviewThreshold},
    pricing::{money_from_major, total_price},
    receipt::{ReceiptSummary, TotalCheck},
    roster::Roster,
    split::split_items,
};
use tracing::{debug, info, warn};

pub mod errors;
pub mod store;

pub use errors::SessionError;
pub use store::SessionStore;

/// One item as stored in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    /// Item name.
    pub name: String,

    /// Undiscounted price in major units.
    pub price: Decimal,

    /// Extraction confidence.
    #[serde(default)]
    pub confidence: Confidence,

    /// Names of the people sharing the item, in roster order.
    #[serde(default)]
    pub participants: Vec<String>,
}

impl SessionItem {
    fn from_line_item(item: &LineItem<'_>, roster: &Roster) -> Self {
        Self {
            name: item.name().to_string(),
            price: item.amount(),
            confidence: item.confidence(),
            participants: roster
                .names(item.participants())
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    fn to_line_item<'a>(
        &self,
        roster: &Roster,
        currency: &'a Currency,
    ) -> Result<LineItem<'a>, SessionError> {
        Ok(LineItem::from_major(&self.name, self.price, currency)?
            .with_confidence(self.confidence)
            .with_participants(roster.select(&self.participants)?))
    }

    /// Whether the item should be checked by hand.
    pub fn needs_review(&self, threshold: ReviewThreshold) -> bool {
        self.confidence.needs_review(threshold)
    }
}

/// Serializable state for splitting one receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSession {
    #[serde(default)]
    items: Vec<SessionItem>,

    #[serde(default)]
    discounts: DiscountConfig,

    #[serde(default)]
    actual_total: Option<Decimal>,
}

impl ReceiptSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in receipt order.
    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    /// Current discount settings.
    pub fn discounts(&self) -> &DiscountConfig {
        &self.discounts
    }

    /// The total printed on the receipt, if entered.
    pub fn actual_total(&self) -> Option<Decimal> {
        self.actual_total
    }

    /// Replace all items with a freshly extracted list, clearing assignments.
    pub fn replace_items(&mut self, items: &[LineItem<'_>], roster: &Roster) {
        self.items = items
            .iter()
            .map(|item| SessionItem::from_line_item(item, roster))
            .collect();

        info!(items = self.items.len(), "receipt items replaced");
    }

    /// Append a manually entered item. Returns its position.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Item`] if the name is blank or the price negative.
    pub fn add_item(
        &mut self,
        name: &str,
        price: Decimal,
        currency: &Currency,
    ) -> Result<usize, SessionError> {
        let item = LineItem::from_major(name, price, currency)?;

        self.items.push(SessionItem {
            name: item.name().to_string(),
            price: item.amount(),
            confidence: Confidence::CERTAIN,
            participants: Vec::new(),
        });

        debug!(name = item.name(), price = %item.price(), "item added");

        Ok(self.items.len() - 1)
    }

    /// Remove the item at `index`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuchItem`] if `index` is out of range.
    pub fn remove_item(&mut self, index: usize) -> Result<SessionItem, SessionError> {
        if index >= self.items.len() {
            return Err(SessionError::NoSuchItem(index));
        }

        let removed = self.items.remove(index);

        debug!(index, name = %removed.name, "item removed");

        Ok(removed)
    }

    /// Correct an item's name and/or price. A corrected item counts as checked.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSuchItem`]: `index` is out of range.
    /// - [`SessionError::Item`]: the new values are invalid.
    pub fn edit_item(
        &mut self,
        index: usize,
        name: Option<&str>,
        price: Option<Decimal>,
        currency: &Currency,
    ) -> Result<(), SessionError> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(SessionError::NoSuchItem(index))?;

        let checked = LineItem::from_major(
            name.unwrap_or(&item.name),
            price.unwrap_or(item.price),
            currency,
        )?;

        item.name = checked.name().to_string();
        item.price = checked.amount();
        item.confidence = Confidence::CERTAIN;

        Ok(())
    }

    /// Set who shares the item at `index`. An empty list unassigns it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSuchItem`]: `index` is out of range.
    /// - [`SessionError::Roster`]: a name is not on the roster.
    pub fn assign<S: AsRef<str>>(
        &mut self,
        index: usize,
        names: &[S],
        roster: &Roster,
    ) -> Result<(), SessionError> {
        let set = roster.select(names)?;
        let item = self
            .items
            .get_mut(index)
            .ok_or(SessionError::NoSuchItem(index))?;

        item.participants = roster.names(&set).into_iter().map(str::to_string).collect();

        Ok(())
    }

    /// Assign the item at `index` to everyone on the roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuchItem`] if `index` is out of range.
    pub fn assign_everyone(&mut self, index: usize, roster: &Roster) -> Result<(), SessionError> {
        let names: Vec<&str> = roster
            .participants()
            .iter()
            .map(|participant| participant.name())
            .collect();

        self.assign(index, &names, roster)
    }

    /// Replace the discount settings.
    pub fn set_discounts(&mut self, discounts: DiscountConfig) {
        info!(%discounts, "discounts updated");

        self.discounts = discounts;
    }

    /// Record the total printed on the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NegativeTotal`] if `total` is below zero.
    pub fn set_actual_total(&mut self, total: Decimal) -> Result<(), SessionError> {
        if total < Decimal::ZERO {
            return Err(SessionError::NegativeTotal);
        }

        self.actual_total = Some(total);

        Ok(())
    }

    /// Positions of items that should be checked by hand.
    pub fn flagged(&self, threshold: ReviewThreshold) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.needs_review(threshold))
            .map(|(index, _)| index)
            .collect()
    }

    /// Validated line items for the core crate.
    ///
    /// # Errors
    ///
    /// Returns an error if an item or assignment no longer validates, e.g. after a roster change.
    pub fn line_items<'a>(
        &self,
        roster: &Roster,
        currency: &'a Currency,
    ) -> Result<Vec<LineItem<'a>>, SessionError> {
        self.items
            .iter()
            .map(|item| item.to_line_item(roster, currency))
            .collect()
    }

    /// Receipt totals before and after discounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the items are invalid or a total cannot be computed.
    pub fn summary<'a>(
        &self,
        roster: &Roster,
        currency: &'a Currency,
    ) -> Result<ReceiptSummary<'a>, SessionError> {
        let items = self.line_items(roster, currency)?;

        Ok(ReceiptSummary::from_items(&items, &self.discounts, currency)?)
    }

    /// Compare the items against the printed total, if one was entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the items are invalid or the totals cannot be compared.
    pub fn total_check<'a>(
        &self,
        roster: &Roster,
        currency: &'a Currency,
    ) -> Result<Option<TotalCheck<'a>>, SessionError> {
        let Some(actual) = self.actual_total else {
            return Ok(None);
        };

        let items = self.line_items(roster, currency)?;
        let parsed = if items.is_empty() {
            money_from_major(Decimal::ZERO, currency)?
        } else {
            total_price(&items)?
        };

        Ok(Some(TotalCheck::compare(
            parsed,
            money_from_major(actual, currency)?,
        )?))
    }

    /// Discount and split every item between the roster.
    ///
    /// Unassigned items are logged and reported in the allocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the items are invalid or allocation fails.
    pub fn finalize<'a, P: RemainderPolicy>(
        &self,
        roster: &Roster,
        currency: &'a Currency,
        policy: P,
    ) -> Result<Allocation<'a>, SessionError> {
        let items = self.line_items(roster, currency)?;
        let allocation = split_items(&items, &self.discounts, roster, currency, policy)?;

        for skipped in allocation.skipped() {
            let name = self
                .items
                .get(skipped.index)
                .map_or("", |item| item.name.as_str());

            warn!(
                index = skipped.index,
                name,
                minor = skipped.minor,
                "item is not assigned to anyone and was left out of the split"
            );
        }

        info!(
            grand_total = %allocation.grand_total(),
            skipped = allocation.skipped().len(),
            "split finalised"
        );

        Ok(allocation)
    }

    /// Forget everything and start a new receipt.
    pub fn reset(&mut self) {
        *self = Self::default();

        info!("session reset");
    }
}
