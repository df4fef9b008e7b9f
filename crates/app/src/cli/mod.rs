use std::io;

use clap::{Parser, Subcommand};
use rusty_money::iso::Currency;
use splitter::{items::ReviewThreshold, roster::Roster};
use splitter_app::{
    config::{LoggingConfig, SplitConfig},
    logging, render,
    session::{ReceiptSession, SessionStore},
};
use tracing::warn;

mod analyze;
mod discount;
mod finalize;
mod items;
mod post;
mod total;

#[derive(Debug, Parser)]
#[command(
    name = "splitter",
    about = "Split supermarket receipts between housemates",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    split: SplitConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read the items off a receipt photo, replacing the current list
    Analyze(analyze::AnalyzeArgs),

    /// Show the items, assignments and totals
    Show,

    /// Add an item by hand
    Add(items::AddArgs),

    /// Remove an item
    Remove(items::RemoveArgs),

    /// Correct an item's name or price
    Edit(items::EditArgs),

    /// Choose who shares an item
    Assign(items::AssignArgs),

    /// Change the discount settings
    Discount(discount::DiscountArgs),

    /// Compare the items with the total printed on the receipt
    CheckTotal(total::CheckTotalArgs),

    /// Work out what everyone owes
    Finalize(finalize::RemainderArgs),

    /// Record the split as a Splitwise expense
    Post(post::PostArgs),

    /// Discard the current receipt
    Reset,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.logging).map_err(|error| error.to_string())?;

        let context = Context::new(&self.split)?;

        match self.command {
            Commands::Analyze(args) => analyze::run(&context, args).await,
            Commands::Show => show(&context),
            Commands::Add(args) => items::add(&context, &args),
            Commands::Remove(args) => items::remove(&context, &args),
            Commands::Edit(args) => items::edit(&context, &args),
            Commands::Assign(args) => items::assign(&context, &args),
            Commands::Discount(args) => discount::run(&context, &args),
            Commands::CheckTotal(args) => total::run(&context, &args),
            Commands::Finalize(args) => finalize::run(&context, &args),
            Commands::Post(args) => post::run(&context, args).await,
            Commands::Reset => reset(&context),
        }
    }
}

/// Resolved settings shared by every subcommand.
#[derive(Debug)]
pub(crate) struct Context {
    roster: Roster,
    currency: &'static Currency,
    threshold: ReviewThreshold,
    store: SessionStore,
}

impl Context {
    fn new(config: &SplitConfig) -> Result<Self, String> {
        Ok(Self {
            roster: config.roster.clone(),
            currency: config.currency().map_err(|error| error.to_string())?,
            threshold: config.review_threshold(),
            store: SessionStore::new(&config.session),
        })
    }

    fn load(&self) -> Result<ReceiptSession, String> {
        self.store
            .load()
            .map_err(|error| format!("failed to load session: {error}"))
    }

    fn save(&self, session: &ReceiptSession) -> Result<(), String> {
        self.store
            .save(session)
            .map_err(|error| format!("failed to save session: {error}"))
    }

    /// Prints the item table followed by the receipt totals.
    fn print_session(&self, session: &ReceiptSession) -> Result<(), String> {
        let mut out = io::stdout().lock();

        render::write_items(&mut out, session, self.currency, self.threshold)
            .map_err(|error| error.to_string())?;

        if session.items().is_empty() {
            return Ok(());
        }

        let summary = session
            .summary(&self.roster, self.currency)
            .map_err(|error| format!("failed to total receipt: {error}"))?;

        let check = session
            .total_check(&self.roster, self.currency)
            .map_err(|error| format!("failed to check receipt total: {error}"))?;

        render::write_summary(&mut out, &summary, check.as_ref()).map_err(|error| error.to_string())
    }
}

fn show(context: &Context) -> Result<(), String> {
    let session = context.load()?;

    context.print_session(&session)
}

fn reset(context: &Context) -> Result<(), String> {
    let mut session = context.load().unwrap_or_else(|error| {
        warn!(%error, "discarding unreadable session");
        ReceiptSession::new()
    });

    session.reset();

    context.save(&session)
}
