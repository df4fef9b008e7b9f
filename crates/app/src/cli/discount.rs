use clap::{ArgAction, Args};
use rust_decimal::Decimal;
use splitter::discounts::DiscountConfig;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct DiscountArgs {
    /// Apply the 15% colleague discount (true or false)
    #[arg(long, action = ArgAction::Set)]
    flat: Option<bool>,

    /// Extra percentage off every item, 0 to 100
    #[arg(long)]
    extra: Option<Decimal>,
}

pub(crate) fn run(context: &Context, args: &DiscountArgs) -> Result<(), String> {
    let mut session = context.load()?;
    let current = *session.discounts();

    let discounts = DiscountConfig::new(
        args.flat.unwrap_or(current.flat_discount()),
        args.extra.unwrap_or(current.extra_percent()),
    )
    .map_err(|error| format!("invalid discount: {error}"))?;

    session.set_discounts(discounts);
    context.save(&session)?;

    println!("Discounts: {discounts}");

    context.print_session(&session)
}
