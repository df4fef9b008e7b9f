use std::io;

use clap::Args;
use splitter::allocation::{Allocation, RandomRemainder, RemainderPolicy, RoundRobin};
use splitter_app::render;

use super::Context;

/// How leftover pennies are handed out.
#[derive(Debug, Args)]
pub(crate) struct RemainderArgs {
    /// Give leftover pennies to randomly chosen sharers
    #[arg(long)]
    random: bool,

    /// Seed for random leftover pennies; implies --random
    #[arg(long)]
    seed: Option<u64>,
}

impl RemainderArgs {
    fn policy(&self) -> Box<dyn RemainderPolicy> {
        match (self.random, self.seed) {
            (_, Some(seed)) => Box::new(RandomRemainder::seeded(seed)),
            (true, None) => Box::new(RandomRemainder::from_entropy()),
            (false, None) => Box::new(RoundRobin),
        }
    }
}

/// Splits the saved session with the requested remainder policy.
pub(crate) fn allocate(
    context: &Context,
    args: &RemainderArgs,
) -> Result<Allocation<'static>, String> {
    let session = context.load()?;

    session
        .finalize(&context.roster, context.currency, args.policy())
        .map_err(|error| format!("failed to split receipt: {error}"))
}

pub(crate) fn run(context: &Context, args: &RemainderArgs) -> Result<(), String> {
    let allocation = allocate(context, args)?;

    render::write_totals(io::stdout().lock(), &allocation).map_err(|error| error.to_string())
}
