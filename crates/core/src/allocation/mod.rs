//! Allocation
//!
//! Splits discounted item prices between participants in whole minor units.
//!
//! Each item is rounded to minor units once, divided by the number of people
//! sharing it, and any leftover units are handed out one each by a
//! [`RemainderPolicy`]. The sum of all participant totals therefore equals the
//! sum of the rounded prices of every assigned item, with no drift.
//!
//! Items assigned to nobody are not charged to anyone. They are reported in
//! [`Allocation::skipped`] so callers can surface them.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    pricing::{PricingError, to_minor_units},
    roster::{Participant, ParticipantSet, Roster, RosterError},
};

pub mod policy;

pub use policy::{RandomRemainder, RemainderPolicy, RoundRobin};

/// Errors raised while allocating costs.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    /// An item carried a negative amount.
    #[error("item {index} has a negative amount")]
    NegativeAmount {
        /// Position of the item in the input.
        index: usize,
    },

    /// A running total overflowed.
    #[error("allocation total overflowed")]
    Overflow,

    /// The remainder policy returned an invalid selection.
    #[error("remainder policy returned an invalid selection for item {index}")]
    PolicyViolation {
        /// Position of the item in the input.
        index: usize,
    },

    /// An item referenced someone outside the roster.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// An amount could not be converted to minor units.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A discounted, not yet rounded, item price and who shares it.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedShare {
    /// Discounted amount in major units.
    pub amount: Decimal,

    /// Who shares the item.
    pub participants: ParticipantSet,
}

impl PricedShare {
    /// Creates a priced share.
    pub fn new(amount: Decimal, participants: ParticipantSet) -> Self {
        Self {
            amount,
            participants,
        }
    }
}

/// An item left out of the allocation because nobody was assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedItem {
    /// Position of the item in the input.
    pub index: usize,

    /// The item's rounded, discounted price in minor units.
    pub minor: i64,
}

/// Final per-participant totals in minor units, in roster order.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    roster: Roster,
    currency: &'a Currency,
    totals: SmallVec<[i64; 4]>,
    grand_total: i64,
    skipped: Vec<SkippedItem>,
    skipped_minor: i64,
}

impl<'a> Allocation<'a> {
    /// The roster these totals belong to.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The currency of every total.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Minor-unit totals in roster order.
    pub fn totals(&self) -> &[i64] {
        &self.totals
    }

    /// Minor-unit total for the participant at `index`.
    pub fn total_of(&self, index: usize) -> Option<i64> {
        self.totals.get(index).copied()
    }

    /// Amount owed by the named participant.
    pub fn share_of(&self, name: &str) -> Option<Money<'a, Currency>> {
        let index = self.roster.position(name)?;

        self.total_of(index)
            .map(|minor| Money::from_minor(minor, self.currency))
    }

    /// Sum of every participant's total, in minor units.
    pub fn grand_total_minor(&self) -> i64 {
        self.grand_total
    }

    /// Sum of every participant's total.
    pub fn grand_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.grand_total_minor(), self.currency)
    }

    /// Items nobody was assigned to, with the cost that was left out.
    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    /// Total minor units left out because of unassigned items.
    pub fn skipped_minor(&self) -> i64 {
        self.skipped_minor
    }

    /// Iterates participants with what they owe, in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (&Participant, Money<'a, Currency>)> + '_ {
        self.roster
            .participants()
            .iter()
            .zip(self.totals.iter())
            .map(|(participant, minor)| (participant, Money::from_minor(*minor, self.currency)))
    }
}

/// Splits discounted item prices between the members of a roster.
#[derive(Debug)]
pub struct Allocator<'r, 'a, P: RemainderPolicy = RoundRobin> {
    roster: &'r Roster,
    currency: &'a Currency,
    policy: P,
}

impl<'r, 'a> Allocator<'r, 'a, RoundRobin> {
    /// Creates an allocator using the deterministic [`RoundRobin`] tie-break.
    pub fn new(roster: &'r Roster, currency: &'a Currency) -> Self {
        Self::with_policy(roster, currency, RoundRobin)
    }
}

impl<'r, 'a, P: RemainderPolicy> Allocator<'r, 'a, P> {
    /// Creates an allocator with a custom remainder policy.
    pub fn with_policy(roster: &'r Roster, currency: &'a Currency, policy: P) -> Self {
        Self {
            roster,
            currency,
            policy,
        }
    }

    /// Allocates every item, returning per-participant totals.
    ///
    /// Per item, in order: skip it if nobody shares it; round its amount to
    /// minor units; credit each member with the floor share; hand out the
    /// remainder one unit each to the members chosen by the policy.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NegativeAmount`]: an amount was below zero.
    /// - [`AllocationError::Roster`]: a participant index is outside the roster.
    /// - [`AllocationError::Pricing`]: an amount did not fit in minor units.
    /// - [`AllocationError::PolicyViolation`]: the policy chose the wrong members.
    /// - [`AllocationError::Overflow`]: a participant total, the grand total or the
    ///   skipped total overflowed.
    pub fn allocate(&mut self, items: &[PricedShare]) -> Result<Allocation<'a>, AllocationError> {
        let mut totals: SmallVec<[i64; 4]> = smallvec![0; self.roster.len()];
        let mut grand_total = 0_i64;
        let mut skipped = Vec::new();
        let mut skipped_minor = 0_i64;

        for (index, item) in items.iter().enumerate() {
            if item.amount < Decimal::ZERO {
                return Err(AllocationError::NegativeAmount { index });
            }

            self.roster.check(&item.participants)?;

            let minor = to_minor_units(item.amount, self.currency)?;

            if item.participants.is_empty() {
                skipped_minor = checked_sum(skipped_minor, minor)?;
                skipped.push(SkippedItem { index, minor });
                continue;
            }

            grand_total = checked_sum(grand_total, minor)?;

            let members = item.participants.as_slice();
            let count = i64::try_from(members.len())
                .ok()
                .ok_or(AllocationError::Overflow)?;
            let share = minor / count;
            let remainder = usize::try_from(minor % count)
                .ok()
                .ok_or(AllocationError::Overflow)?;

            for member in members {
                credit(&mut totals, *member, share)?;
            }

            if remainder > 0 {
                let winners = self.policy.select(index, members, remainder);

                if !is_valid_selection(&winners, members, remainder) {
                    return Err(AllocationError::PolicyViolation { index });
                }

                for winner in winners {
                    credit(&mut totals, winner, 1)?;
                }
            }
        }

        Ok(Allocation {
            roster: self.roster.clone(),
            currency: self.currency,
            totals,
            grand_total,
            skipped,
            skipped_minor,
        })
    }
}

fn checked_sum(total: i64, amount: i64) -> Result<i64, AllocationError> {
    total.checked_add(amount).ok_or(AllocationError::Overflow)
}

fn credit(totals: &mut [i64], member: usize, amount: i64) -> Result<(), AllocationError> {
    let total = totals
        .get_mut(member)
        .ok_or(RosterError::IndexOutOfRange(member))?;

    *total = checked_sum(*total, amount)?;

    Ok(())
}

fn is_valid_selection(winners: &[usize], members: &[usize], count: usize) -> bool {
    if winners.len() != count || !winners.iter().all(|winner| members.contains(winner)) {
        return false;
    }

    let mut unique: SmallVec<[usize; 4]> = winners.iter().copied().collect();
    unique.sort_unstable();
    unique.dedup();

    unique.len() == count
}
