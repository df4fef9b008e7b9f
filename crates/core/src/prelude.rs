//! Splitter prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{
        Allocation, AllocationError, Allocator, PricedShare, RandomRemainder, RemainderPolicy,
        RoundRobin, SkippedItem,
    },
    discounts::{DiscountConfig, DiscountError, FLAT_DISCOUNT_RATE, discounted_amount},
    extraction::{ExtractedItem, ExtractionError, parse_extraction, parse_line_items},
    items::{Confidence, ItemError, LineItem, ReviewThreshold},
    pricing::{PricingError, money_from_major, to_major_units, to_minor_units, total_price},
    receipt::{ReceiptSummary, TotalCheck},
    roster::{Participant, ParticipantSet, Roster, RosterError},
    split::{SplitError, priced_shares, split_items},
};
