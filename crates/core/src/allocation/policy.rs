//! Remainder policies
//!
//! When an item's minor-unit price does not divide evenly between its
//! participants, the leftover units are handed out one each to a subset of
//! those participants. A [`RemainderPolicy`] decides who.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use smallvec::SmallVec;

/// Chooses which participants receive the leftover minor units of an item.
///
/// Implementations must return exactly `count` distinct members drawn from
/// `members`, where `0 < count < members.len()`. The allocator rejects any
/// other answer with [`AllocationError::PolicyViolation`](super::AllocationError::PolicyViolation).
///
/// # Parameters
///
/// - `item_index`: Position of the item in the allocation input
/// - `members`: Roster indexes sharing the item, in roster order
/// - `count`: Number of leftover minor units to hand out
pub trait RemainderPolicy {
    /// Returns the roster indexes that each receive one extra minor unit.
    fn select(&mut self, item_index: usize, members: &[usize], count: usize)
    -> SmallVec<[usize; 4]>;
}

impl<P: RemainderPolicy + ?Sized> RemainderPolicy for &mut P {
    fn select(
        &mut self,
        item_index: usize,
        members: &[usize],
        count: usize,
    ) -> SmallVec<[usize; 4]> {
        (**self).select(item_index, members, count)
    }
}

impl<P: RemainderPolicy + ?Sized> RemainderPolicy for Box<P> {
    fn select(
        &mut self,
        item_index: usize,
        members: &[usize],
        count: usize,
    ) -> SmallVec<[usize; 4]> {
        (**self).select(item_index, members, count)
    }
}

/// Deterministic tie-break keyed by item index and roster order.
///
/// For item `i` the leftover units go to `members[(i + k) % members.len()]`
/// for `k` in `0..count`, so successive items start one seat further along.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl RemainderPolicy for RoundRobin {
    fn select(
        &mut self,
        item_index: usize,
        members: &[usize],
        count: usize,
    ) -> SmallVec<[usize; 4]> {
        if members.is_empty() {
            return SmallVec::new();
        }

        (0..count.min(members.len()))
            .filter_map(|k| members.get((item_index + k) % members.len()).copied())
            .collect()
    }
}

/// Uniform random draw without replacement.
///
/// Fair in aggregate but not reproducible unless built with [`RandomRemainder::seeded`].
pub struct RandomRemainder<R: Rng = StdRng> {
    rng: R,
}

impl<R: Rng> RandomRemainder<R> {
    /// Wraps an existing random number generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomRemainder<StdRng> {
    /// A reproducible policy: the same seed yields the same winners.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// A policy seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> fmt::Debug for RandomRemainder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomRemainder").finish_non_exhaustive()
    }
}

impl<R: Rng> RemainderPolicy for RandomRemainder<R> {
    fn select(
        &mut self,
        _item_index: usize,
        members: &[usize],
        count: usize,
    ) -> SmallVec<[usize; 4]> {
        members
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_rotates_with_item_index() {
        let mut policy = RoundRobin;
        let members = [0, 1, 2];

        assert_eq!(policy.select(0, &members, 1).as_slice(), &[0]);
        assert_eq!(policy.select(1, &members, 1).as_slice(), &[1]);
        assert_eq!(policy.select(2, &members, 2).as_slice(), &[2, 0]);
        assert_eq!(policy.select(3, &members, 1).as_slice(), &[0]);
    }

    #[test]
    fn round_robin_uses_member_positions_not_roster_indexes() {
        let mut policy = RoundRobin;

        assert_eq!(policy.select(1, &[0, 2], 1).as_slice(), &[2]);
    }

    #[test]
    fn round_robin_handles_no_members() {
        assert!(RoundRobin.select(0, &[], 1).is_empty());
    }

    #[test]
    fn seeded_random_policy_is_reproducible() {
        let members = [0, 1, 2];
        let mut first = RandomRemainder::seeded(7);
        let mut second = RandomRemainder::seeded(7);

        for index in 0..20 {
            assert_eq!(
                first.select(index, &members, 2),
                second.select(index, &members, 2)
            );
        }
    }

    #[test]
    fn random_policy_draws_distinct_members() {
        let mut policy = RandomRemainder::seeded(42);

        for index in 0..50 {
            let mut winners = policy.select(index, &[0, 1, 2], 2);
            winners.sort_unstable();
            winners.dedup();

            assert_eq!(winners.len(), 2);
            assert!(winners.iter().all(|winner| *winner < 3));
        }
    }

    #[test]
    fn boxed_policies_delegate() {
        let mut policy: Box<dyn RemainderPolicy> = Box::new(RoundRobin);

        assert_eq!(policy.select(1, &[0, 1, 2], 1).as_slice(), &[1]);
    }
}
