//! Conservation of pennies across randomly generated receipts.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rust_decimal::Decimal;
use rusty_money::iso::GBP;
use testresult::TestResult;

use splitter::prelude::*;

const ROUNDS: usize = 200;

fn random_items(rng: &mut StdRng, roster: &Roster) -> Result<Vec<LineItem<'static>>, ItemError> {
    let count = rng.gen_range(0..=50);
    let everyone: Vec<usize> = (0..roster.len()).collect();

    (0..count)
        .map(|n| {
            let pennies: i64 = rng.gen_range(0..10_000);
            let size = rng.gen_range(1..=3);
            let members = everyone.choose_multiple(&mut *rng, size).copied();

            Ok(
                LineItem::from_major(&format!("item {n}"), Decimal::new(pennies, 2), GBP)?
                    .with_participants(ParticipantSet::from_indexes(members)),
            )
        })
        .collect()
}

fn random_config(rng: &mut StdRng) -> Result<DiscountConfig, DiscountError> {
    let extra = Decimal::new(rng.gen_range(0..=1000), 1);

    DiscountConfig::new(rng.gen_bool(0.5), extra)
}

fn expected_total(items: &[LineItem<'_>], config: &DiscountConfig) -> Result<i64, SplitError> {
    let mut total = 0;

    for item in items {
        total += to_minor_units(discounted_amount(item.amount(), config)?, GBP)?;
    }

    Ok(total)
}

#[test]
fn round_robin_allocations_conserve_every_penny() -> TestResult {
    let roster = Roster::new(&["Joe", "Nic", "Nat"])?;
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng, &roster)?;
        let config = random_config(&mut rng)?;

        let allocation = split_items(&items, &config, &roster, GBP, RoundRobin)?;

        assert_eq!(
            allocation.grand_total_minor(),
            expected_total(&items, &config)?,
            "allocated total should equal the sum of rounded discounted prices"
        );
        assert!(allocation.skipped().is_empty(), "every item was assigned");
    }

    Ok(())
}

#[test]
fn random_allocations_conserve_every_penny() -> TestResult {
    let roster = Roster::new(&["Joe", "Nic", "Nat"])?;
    let mut rng = StdRng::seed_from_u64(1234);
    let mut policy = RandomRemainder::seeded(99);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng, &roster)?;
        let config = random_config(&mut rng)?;

        let allocation = split_items(&items, &config, &roster, GBP, &mut policy)?;

        assert_eq!(
            allocation.grand_total_minor(),
            expected_total(&items, &config)?,
            "allocated total should equal the sum of rounded discounted prices"
        );
    }

    Ok(())
}

#[test]
fn nobody_pays_for_items_they_do_not_share() -> TestResult {
    let roster = Roster::new(&["Joe", "Nic", "Nat"])?;
    let mut rng = StdRng::seed_from_u64(77);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng, &roster)?;
        let allocation = split_items(&items, &DiscountConfig::none(), &roster, GBP, RoundRobin)?;

        for (index, total) in allocation.totals().iter().enumerate() {
            let shared: i64 = items
                .iter()
                .filter(|item| item.participants().contains(index))
                .map(|item| item.price().to_minor_units())
                .sum();

            assert!(
                *total <= shared,
                "participant {index} owes {total}p but only shares {shared}p of items"
            );
        }
    }

    Ok(())
}
