//! Configuration
//!
//! Command line arguments with environment variable fallbacks. A `.env` file
//! in the working directory is loaded before parsing.

use std::{path::PathBuf, str::FromStr};

use clap::Args;
use rusty_money::iso::{self, Currency};
use splitter::{items::ReviewThreshold, roster::Roster};
use thiserror::Error;

/// Errors raised while interpreting configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency code {0:?}")]
    UnknownCurrency(String),

    /// A ledger member mapping was not of the form `name=id`.
    #[error("invalid member mapping {0:?}; expected name=id")]
    InvalidMember(String),
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Receipt splitting settings shared by every command.
#[derive(Debug, Args)]
pub struct SplitConfig {
    /// Comma separated list of the people sharing receipts
    #[arg(long, env = "SPLITTER_ROSTER", default_value = "Joe,Nic,Nat", global = true)]
    pub roster: Roster,

    /// ISO 4217 currency code for prices
    #[arg(long, env = "SPLITTER_CURRENCY", default_value = "GBP", global = true)]
    pub currency: String,

    /// Extraction confidence below which items are flagged for review
    #[arg(long, env = "SPLITTER_REVIEW_THRESHOLD", default_value_t = 0.75, global = true)]
    pub review_threshold: f64,

    /// Path of the receipt session file
    #[arg(long, env = "SPLITTER_SESSION", default_value = "receipt-session.json", global = true)]
    pub session: PathBuf,
}

impl SplitConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not recognised.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.currency.trim().to_ascii_uppercase();

        iso::find(&code).ok_or(ConfigError::UnknownCurrency(code))
    }

    /// The configured review threshold.
    pub fn review_threshold(&self) -> ReviewThreshold {
        ReviewThreshold::new(self.review_threshold)
    }
}

/// Receipt extraction service settings.
#[derive(Debug, Args)]
pub struct ExtractorConfig {
    /// Generative Language API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Model used to read receipts
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Generative Language API base URL
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub gemini_base_url: String,
}

/// Expense ledger service settings.
#[derive(Debug, Args)]
pub struct LedgerConfig {
    /// Splitwise API key
    #[arg(long, env = "SPLITWISE_API_KEY", hide_env_values = true)]
    pub splitwise_api_key: String,

    /// Splitwise group to file expenses in
    #[arg(long, env = "SPLITWISE_GROUP_ID")]
    pub splitwise_group_id: Option<u64>,

    /// Roster name to Splitwise user id mapping, e.g. `Joe=123,Nic=456`
    #[arg(long, env = "SPLITWISE_MEMBERS")]
    pub splitwise_members: MemberIds,

    /// Splitwise API base URL
    #[arg(
        long,
        env = "SPLITWISE_BASE_URL",
        default_value = "https://secure.splitwise.com/api/v3.0"
    )]
    pub splitwise_base_url: String,
}

/// Mapping from roster names to ledger user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberIds(Vec<(String, u64)>);

impl MemberIds {
    /// Creates a mapping from `(name, id)` pairs.
    pub fn new(members: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self(members.into_iter().collect())
    }

    /// Looks up the ledger id for a roster name.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, id)| *id)
    }
}

impl FromStr for MemberIds {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|pair| !pair.trim().is_empty())
            .map(|pair| {
                let (name, id) = pair
                    .split_once('=')
                    .ok_or_else(|| ConfigError::InvalidMember(pair.to_string()))?;

                let id = id
                    .trim()
                    .parse()
                    .ok()
                    .ok_or_else(|| ConfigError::InvalidMember(pair.to_string()))?;

                Ok((name.trim().to_string(), id))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
