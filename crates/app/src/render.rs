//! Terminal output
//!
//! Tables for reviewing extracted items and for the final per-person totals.

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use splitter::{
    allocation::Allocation,
    items::ReviewThreshold,
    pricing::{PricingError, money_from_major},
    receipt::{ReceiptSummary, TotalCheck},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::session::ReceiptSession;

/// Errors raised while writing output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// An amount could not be converted.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Writes the item review table. Items below `threshold` are highlighted.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_items(
    mut out: impl io::Write,
    session: &ReceiptSession,
    currency: &Currency,
    threshold: ReviewThreshold,
) -> Result<(), RenderError> {
    if session.items().is_empty() {
        writeln!(out, "No items yet. Analyse a receipt or add items by hand.")?;
        return Ok(());
    }

    let mut builder = Builder::default();
    let mut flagged_rows = Vec::new();

    builder.push_record(["#", "Item", "Price", "Confidence", "Shared by"]);

    for (index, item) in session.items().iter().enumerate() {
        let shared_by = if item.participants.is_empty() {
            "(nobody)".to_string()
        } else {
            item.participants.join(", ")
        };

        let mut confidence = format!("{:.0}%", item.confidence.value() * 100.0);

        if item.needs_review(threshold) {
            confidence.push_str(" check");
            flagged_rows.push(index + 1);
        }

        builder.push_record([
            index.to_string(),
            item.name.clone(),
            money_from_major(item.price, currency)?.to_string(),
            confidence,
            shared_by,
        ]);
    }

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..4), Alignment::right());

    for row in flagged_rows {
        table.modify(Rows::one(row), Color::FG_YELLOW);
    }

    writeln!(out, "{table}")?;

    let flagged = session.flagged(threshold).len();

    if flagged > 0 {
        writeln!(
            out,
            "{flagged} item(s) flagged as uncertain; please double-check them."
        )?;
    }

    Ok(())
}

/// Writes subtotal, total after discounts and savings, plus the printed-total
/// comparison when one was entered.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_summary(
    mut out: impl io::Write,
    summary: &ReceiptSummary<'_>,
    check: Option<&TotalCheck<'_>>,
) -> Result<(), RenderError> {
    writeln!(out, " Subtotal: {}", summary.subtotal())?;
    writeln!(out, " Total:    {}", summary.total())?;
    writeln!(out, " Savings:  {}", summary.savings()?)?;

    if let Some(check) = check {
        write_total_check(&mut out, check)?;
    }

    Ok(())
}

/// Writes the outcome of comparing the items with the printed receipt total.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_total_check(
    mut out: impl io::Write,
    check: &TotalCheck<'_>,
) -> Result<(), RenderError> {
    match check {
        TotalCheck::Match => writeln!(out, "Items match the receipt total.")?,
        TotalCheck::ParsedLower(difference) => writeln!(
            out,
            "Items add up to {difference} less than the receipt; an item may be missing."
        )?,
        TotalCheck::ParsedHigher(difference) => writeln!(
            out,
            "Items add up to {difference} more than the receipt; check for duplicates."
        )?,
    }

    Ok(())
}

/// Writes the per-person totals table.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_totals(
    mut out: impl io::Write,
    allocation: &Allocation<'_>,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Person", "Owes"]);

    for (participant, owed) in allocation.iter() {
        builder.push_record([participant.name().to_string(), owed.to_string()]);
    }

    builder.push_record(["Total".to_string(), allocation.grand_total().to_string()]);

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Rows::last(), Color::BOLD);
    table.modify(Columns::last(), Alignment::right());

    writeln!(out, "{table}")?;

    if !allocation.skipped().is_empty() {
        let left_out = Money::from_minor(allocation.skipped_minor(), allocation.currency());

        writeln!(
            out,
            "{} unassigned item(s) worth {left_out} were left out.",
            allocation.skipped().len()
        )?;
    }

    Ok(())
}
