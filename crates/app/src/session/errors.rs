//! Session errors.

use std::{io, path::PathBuf};

use rusty_money::MoneyError;
use splitter::{
    items::ItemError, pricing::PricingError, roster::RosterError, split::SplitError,
};
use thiserror::Error;

/// Receipt session error variants.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No item exists at the given position.
    #[error("no item at position {0}")]
    NoSuchItem(usize),

    /// The printed receipt total was negative.
    #[error("receipt total must not be negative")]
    NegativeTotal,

    /// Item data failed validation.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// An assignment named someone outside the roster.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// Discounting or allocation failed.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// An amount could not be converted.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The session file could not be read or written.
    #[error("session file {path:?}: {source}")]
    Io {
        /// Session file path.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The session file did not contain a valid session.
    #[error("session file {path:?} is not a valid session: {source}")]
    Decode {
        /// Session file path.
        path: PathBuf,

        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
