//! A receipt from extraction response to recorded expense.

use rust_decimal::Decimal;
use rusty_money::iso::GBP;
use splitter::prelude::*;
use splitter_app::{
    config::MemberIds,
    ledger::{CreatedExpense, ExpenseLedger, ExpenseRequest, MockExpenseLedger},
    session::{ReceiptSession, SessionStore},
};
use testresult::TestResult;

const RESPONSE: &str = r#"```json
[
  {"name": "Yorkshire Tea Bags", "price": 2.00, "confidence": 1.0},
  {"name": "Sourdough", "price": "1.75", "confidence": 0.5},
  {"name": "Bananas", "price": 0.95}
]
```"#;

#[tokio::test]
async fn analysed_receipt_is_split_and_posted() -> TestResult {
    let roster: Roster = "Joe,Nic,Nat".parse()?;
    let dir = tempfile::tempdir()?;
    let store = SessionStore::new(dir.path().join("session.json"));

    let items = parse_line_items(RESPONSE, GBP)?;
    let mut session = store.load()?;
    session.replace_items(&items, &roster);

    assert_eq!(session.flagged(ReviewThreshold::default()), [1]);

    session.edit_item(1, None, Some(Decimal::new(180, 2)), GBP)?;
    session.assign_everyone(0, &roster)?;
    session.assign(1, &["Joe", "Nat"], &roster)?;
    session.assign(2, &["Nic"], &roster)?;
    session.set_discounts(DiscountConfig::new(true, Decimal::ZERO)?);
    session.set_actual_total(Decimal::new(475, 2))?;
    store.save(&session)?;

    let session: ReceiptSession = store.load()?;

    assert_eq!(
        session.total_check(&roster, GBP)?,
        Some(TotalCheck::Match)
    );

    let allocation = session.finalize(&roster, GBP, RoundRobin)?;

    // Tea 170p over three, sourdough 153p over two, bananas 81p.
    assert_eq!(allocation.totals(), &[57 + 76, 57 + 81, 56 + 77]);
    assert_eq!(allocation.grand_total_minor(), 404);

    let members = MemberIds::new([
        ("Joe".to_string(), 10),
        ("Nic".to_string(), 20),
        ("Nat".to_string(), 30),
    ]);
    let request = ExpenseRequest::from_allocation("Weekly shop", "Joe", &allocation, &members)?;

    let mut ledger = MockExpenseLedger::new();
    ledger
        .expect_create_expense()
        .withf(|request| request.cost == Decimal::new(404, 2) && request.shares.len() == 3)
        .times(1)
        .returning(|_| Ok(CreatedExpense { id: 1 }));

    assert_eq!(ledger.create_expense(&request).await?, CreatedExpense { id: 1 });

    Ok(())
}
