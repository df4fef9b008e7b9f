//! Expense ledger
//!
//! Recording a finished split as a shared expense. The payer is credited with
//! the whole grand total and every participant owes their allocated share.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use splitter::{allocation::Allocation, pricing::to_major_units};
use thiserror::Error;

use crate::config::MemberIds;

pub mod splitwise;

pub use splitwise::{SplitwiseConfig, SplitwiseLedger};

/// Errors raised while recording an expense.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The ledger refused the expense.
    #[error("expense rejected: {0}")]
    Rejected(String),

    /// The payer or a participant has no ledger account.
    #[error("{0:?} is not a known ledger member")]
    UnknownMember(String),

    /// Owed shares do not add up to the amount paid.
    #[error("owed shares total {owed} but {paid} was paid")]
    Unbalanced {
        /// Amount paid.
        paid: Decimal,

        /// Sum of owed shares.
        owed: Decimal,
    },

    /// The split has nothing to record.
    #[error("nothing to record; the split total is zero")]
    NothingToRecord,
}

/// One user's row of an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseShare {
    /// Ledger user id.
    pub user_id: u64,

    /// Amount this user paid.
    pub paid_share: Decimal,

    /// Amount this user owes.
    pub owed_share: Decimal,
}

/// A balanced expense ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRequest {
    /// Free-text description.
    pub description: String,

    /// ISO 4217 currency code.
    pub currency_code: String,

    /// Total cost.
    pub cost: Decimal,

    /// Group to file the expense in.
    pub group_id: Option<u64>,

    /// Per-user rows.
    pub shares: Vec<ExpenseShare>,
}

impl ExpenseRequest {
    /// Builds an expense from a finished split, paid in full by `payer`.
    ///
    /// The payer is always listed, with the whole cost as `paid_share` and
    /// their own allocation as `owed_share`. Any other participant whose
    /// allocation is zero gets no row.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NothingToRecord`]: the split total is zero.
    /// - [`LedgerError::UnknownMember`]: the payer or a participant owing money has no ledger id.
    /// - [`LedgerError::Unbalanced`]: the owed shares do not sum to the cost.
    pub fn from_allocation(
        description: &str,
        payer: &str,
        allocation: &Allocation<'_>,
        members: &MemberIds,
    ) -> Result<Self, LedgerError> {
        let currency = allocation.currency();
        let grand_total = allocation.grand_total_minor();

        if grand_total == 0 {
            return Err(LedgerError::NothingToRecord);
        }

        let payer_index = allocation
            .roster()
            .position(payer)
            .ok_or_else(|| LedgerError::UnknownMember(payer.to_string()))?;

        let cost = to_major_units(grand_total, currency);

        let shares = allocation
            .roster()
            .participants()
            .iter()
            .zip(allocation.totals())
            .enumerate()
            .filter(|(index, (_, owed))| **owed != 0 || *index == payer_index)
            .map(|(index, (participant, owed))| {
                let user_id = members
                    .get(participant.name())
                    .ok_or_else(|| LedgerError::UnknownMember(participant.name().to_string()))?;

                Ok(ExpenseShare {
                    user_id,
                    paid_share: if index == payer_index {
                        cost
                    } else {
                        Decimal::ZERO
                    },
                    owed_share: to_major_units(*owed, currency),
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        let request = Self {
            description: description.to_string(),
            currency_code: currency.iso_alpha_code.to_string(),
            cost,
            group_id: None,
            shares,
        };

        request.check_balanced()?;

        Ok(request)
    }

    /// Files the expense in a group.
    #[must_use]
    pub fn with_group(mut self, group_id: Option<u64>) -> Self {
        self.group_id = group_id;
        self
    }

    /// Checks that paid and owed shares both sum to the cost.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unbalanced`] if they do not.
    pub fn check_balanced(&self) -> Result<(), LedgerError> {
        let paid: Decimal = self.shares.iter().map(|share| share.paid_share).sum();
        let owed: Decimal = self.shares.iter().map(|share| share.owed_share).sum();

        if paid != self.cost || owed != self.cost {
            return Err(LedgerError::Unbalanced { paid, owed });
        }

        Ok(())
    }
}

/// An expense the ledger accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedExpense {
    /// Ledger expense id.
    pub id: u64,
}

#[automock]
#[async_trait]
/// Shared expense recording.
pub trait ExpenseLedger: Send + Sync {
    /// Records a balanced expense.
    async fn create_expense(&self, request: &ExpenseRequest) -> Result<CreatedExpense, LedgerError>;
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use splitter::prelude::*;
    use testresult::TestResult;

    use super::*;

    fn scenario() -> Result<(Roster, Vec<LineItem<'static>>), Box<dyn std::error::Error>> {
        let roster: Roster = "Joe,Nic,Nat".parse()?;
        let items = vec![
            LineItem::from_major("Tea", Decimal::new(300, 2), GBP)?
                .with_participants(roster.everyone()),
            LineItem::from_major("Bread", Decimal::new(200, 2), GBP)?
                .with_participants(roster.select(&["Joe"])?),
        ];

        Ok((roster, items))
    }

    fn members() -> MemberIds {
        MemberIds::new([
            ("Joe".to_string(), 1),
            ("Nic".to_string(), 2),
            ("Nat".to_string(), 3),
        ])
    }

    #[test]
    fn payer_covers_the_grand_total() -> TestResult {
        let (roster, items) = scenario()?;
        let config = DiscountConfig::new(true, Decimal::ZERO)?;
        let allocation = split_items(&items, &config, &roster, GBP, RoundRobin)?;

        let request = ExpenseRequest::from_allocation("Shop", "Nic", &allocation, &members())?;

        assert_eq!(request.cost, Decimal::new(425, 2));
        assert_eq!(request.currency_code, "GBP");
        assert_eq!(
            request.shares,
            [
                ExpenseShare {
                    user_id: 1,
                    paid_share: Decimal::ZERO,
                    owed_share: Decimal::new(255, 2),
                },
                ExpenseShare {
                    user_id: 2,
                    paid_share: Decimal::new(425, 2),
                    owed_share: Decimal::new(85, 2),
                },
                ExpenseShare {
                    user_id: 3,
                    paid_share: Decimal::ZERO,
                    owed_share: Decimal::new(85, 2),
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn payer_is_listed_even_when_owing_nothing() -> TestResult {
        let (roster, items) = scenario()?;
        let items = items.get(1..).ok_or("missing items")?;
        let allocation = split_items(items, &DiscountConfig::none(), &roster, GBP, RoundRobin)?;

        let request = ExpenseRequest::from_allocation("Shop", "Nat", &allocation, &members())?;

        assert_eq!(request.shares.len(), 2);
        assert!(
            request.shares.iter().all(|share| share.user_id != 2),
            "Nic shares nothing and should not be listed"
        );
        assert!(
            request
                .shares
                .iter()
                .any(|share| share.user_id == 3 && share.owed_share.is_zero())
        );

        Ok(())
    }

    #[test]
    fn unmapped_members_are_rejected() -> TestResult {
        let (roster, items) = scenario()?;
        let allocation = split_items(&items, &DiscountConfig::none(), &roster, GBP, RoundRobin)?;
        let members = MemberIds::new([("Joe".to_string(), 1)]);

        assert!(matches!(
            ExpenseRequest::from_allocation("Shop", "Joe", &allocation, &members),
            Err(LedgerError::UnknownMember(name)) if name == "Nic"
        ));
        assert!(matches!(
            ExpenseRequest::from_allocation("Shop", "Bob", &allocation, &members),
            Err(LedgerError::UnknownMember(name)) if name == "Bob"
        ));

        Ok(())
    }

    #[test]
    fn empty_splits_have_nothing_to_record() -> TestResult {
        let roster: Roster = "Joe,Nic".parse()?;
        let allocation = split_items(&[], &DiscountConfig::none(), &roster, GBP, RoundRobin)?;

        assert!(matches!(
            ExpenseRequest::from_allocation("Shop", "Joe", &allocation, &members()),
            Err(LedgerError::NothingToRecord)
        ));

        Ok(())
    }

    #[test]
    fn tampered_requests_are_unbalanced() -> TestResult {
        let (roster, items) = scenario()?;
        let allocation = split_items(&items, &DiscountConfig::none(), &roster, GBP, RoundRobin)?;
        let mut request = ExpenseRequest::from_allocation("Shop", "Joe", &allocation, &members())?;

        if let Some(share) = request.shares.first_mut() {
            share.owed_share += Decimal::new(1, 2);
        }

        assert!(matches!(
            request.check_balanced(),
            Err(LedgerError::Unbalanced { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn mock_ledgers_receive_the_request() -> TestResult {
        let (roster, items) = scenario()?;
        let allocation = split_items(&items, &DiscountConfig::none(), &roster, GBP, RoundRobin)?;
        let request = ExpenseRequest::from_allocation("Shop", "Joe", &allocation, &members())?
            .with_group(Some(42));

        let mut ledger = MockExpenseLedger::new();
        ledger
            .expect_create_expense()
            .withf(|request| request.group_id == Some(42) && request.cost == Decimal::new(500, 2))
            .times(1)
            .returning(|_| Ok(CreatedExpense { id: 7 }));

        assert_eq!(ledger.create_expense(&request).await?, CreatedExpense { id: 7 });

        Ok(())
    }
}
