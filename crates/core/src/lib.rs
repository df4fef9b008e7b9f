//! Splitter
//!
//! Splits a shared shopping receipt between a fixed group of people, down to
//! the penny. Prices are discounted per item, rounded to minor units once, and
//! divided between whoever shares each item; leftover pennies are handed out
//! by an injectable remainder policy so that no penny is lost or invented.
//!
//! This crate performs no I/O.

pub mod allocation;
pub mod discounts;
pub mod extraction;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod roster;
pub mod split;
