use clap::Args;
use rust_decimal::Decimal;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct CheckTotalArgs {
    /// Total printed on the receipt
    total: Decimal,
}

pub(crate) fn run(context: &Context, args: &CheckTotalArgs) -> Result<(), String> {
    let mut session = context.load()?;

    session
        .set_actual_total(args.total)
        .map_err(|error| format!("invalid receipt total: {error}"))?;

    context.save(&session)?;
    context.print_session(&session)
}
