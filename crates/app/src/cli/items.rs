use clap::Args;
use rust_decimal::Decimal;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Item name
    name: String,

    /// Price in major units, e.g. 1.50
    price: Decimal,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Item number as shown by `show`
    index: usize,
}

#[derive(Debug, Args)]
pub(crate) struct EditArgs {
    /// Item number as shown by `show`
    index: usize,

    /// Corrected name
    #[arg(long)]
    name: Option<String>,

    /// Corrected price
    #[arg(long)]
    price: Option<Decimal>,
}

#[derive(Debug, Args)]
pub(crate) struct AssignArgs {
    /// Item number as shown by `show`
    index: usize,

    /// People sharing the item; none unassigns it
    names: Vec<String>,

    /// Share the item between everyone on the roster
    #[arg(long, conflicts_with = "names")]
    everyone: bool,
}

pub(crate) fn add(context: &Context, args: &AddArgs) -> Result<(), String> {
    let mut session = context.load()?;

    session
        .add_item(&args.name, args.price, context.currency)
        .map_err(|error| format!("failed to add item: {error}"))?;

    context.save(&session)?;
    context.print_session(&session)
}

pub(crate) fn remove(context: &Context, args: &RemoveArgs) -> Result<(), String> {
    let mut session = context.load()?;

    session
        .remove_item(args.index)
        .map_err(|error| format!("failed to remove item: {error}"))?;

    context.save(&session)?;
    context.print_session(&session)
}

pub(crate) fn edit(context: &Context, args: &EditArgs) -> Result<(), String> {
    if args.name.is_none() && args.price.is_none() {
        return Err("nothing to change; pass --name and/or --price".to_string());
    }

    let mut session = context.load()?;

    session
        .edit_item(
            args.index,
            args.name.as_deref(),
            args.price,
            context.currency,
        )
        .map_err(|error| format!("failed to edit item: {error}"))?;

    context.save(&session)?;
    context.print_session(&session)
}

pub(crate) fn assign(context: &Context, args: &AssignArgs) -> Result<(), String> {
    let mut session = context.load()?;

    let result = if args.everyone {
        session.assign_everyone(args.index, &context.roster)
    } else {
        session.assign(args.index, &args.names, &context.roster)
    };

    result.map_err(|error| format!("failed to assign item: {error}"))?;

    context.save(&session)?;
    context.print_session(&session)
}
