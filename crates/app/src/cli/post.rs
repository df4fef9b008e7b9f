use clap::Args;
use splitter_app::{
    config::LedgerConfig,
    ledger::{ExpenseLedger, ExpenseRequest, SplitwiseConfig, SplitwiseLedger},
};
use tracing::info;

use super::{Context, finalize};

#[derive(Debug, Args)]
pub(crate) struct PostArgs {
    /// Roster member who paid for the shop
    #[arg(long)]
    payer: String,

    /// Expense description
    #[arg(long, default_value = "Groceries")]
    description: String,

    #[command(flatten)]
    remainder: finalize::RemainderArgs,

    #[command(flatten)]
    ledger: LedgerConfig,
}

pub(crate) async fn run(context: &Context, args: PostArgs) -> Result<(), String> {
    let allocation = finalize::allocate(context, &args.remainder)?;

    let request = ExpenseRequest::from_allocation(
        &args.description,
        &args.payer,
        &allocation,
        &args.ledger.splitwise_members,
    )
    .map_err(|error| format!("failed to build expense: {error}"))?
    .with_group(args.ledger.splitwise_group_id);

    let ledger = SplitwiseLedger::new(SplitwiseConfig {
        base_url: args.ledger.splitwise_base_url,
        api_key: args.ledger.splitwise_api_key,
    });

    let created = ledger
        .create_expense(&request)
        .await
        .map_err(|error| format!("failed to record expense: {error}"))?;

    info!(expense_id = created.id, cost = %request.cost, "split posted");

    println!("expense_id: {}", created.id);

    Ok(())
}
