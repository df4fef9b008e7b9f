//! Extraction
//!
//! Parsing of the item list returned by a receipt extraction service. The
//! service answers in free text that should contain a JSON list of
//! `{name, price, confidence}` records, sometimes wrapped in Markdown fences.

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{Confidence, ItemError, LineItem};

/// Errors raised while parsing an extraction response.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No JSON list could be found in the response.
    #[error("no JSON list found in extraction response")]
    MissingList,

    /// The JSON list could not be decoded.
    #[error("invalid extraction JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A price was not a finite number.
    #[error("price of {name:?} is not a valid amount")]
    InvalidPrice {
        /// Name of the offending item.
        name: String,
    },

    /// An extracted record could not become a line item.
    #[error(transparent)]
    Item(#[from] ItemError),
}

/// A price as the extraction service wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedPrice {
    /// A JSON number, e.g. `1.5`.
    Number(f64),

    /// A quoted amount, e.g. `"1.50"`.
    Text(String),
}

impl ExtractedPrice {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(value) => Decimal::from_f64(*value),
            Self::Text(text) => text.trim().trim_start_matches('£').parse().ok(),
        }
    }
}

/// One record of an extraction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Product name as printed.
    pub name: String,

    /// Final price paid, after any loyalty savings.
    pub price: ExtractedPrice,

    /// Legibility confidence in `[0, 1]`; missing means fully confident.
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl ExtractedItem {
    /// Converts the record into an unassigned line item.
    ///
    /// # Errors
    ///
    /// - [`ExtractionError::InvalidPrice`]: the price is not a number.
    /// - [`ExtractionError::Item`]: the name is blank or the price negative.
    pub fn into_line_item(self, currency: &Currency) -> Result<LineItem<'_>, ExtractionError> {
        let amount = self
            .price
            .to_decimal()
            .ok_or_else(|| ExtractionError::InvalidPrice {
                name: self.name.clone(),
            })?;

        let confidence = self.confidence.map_or(Confidence::CERTAIN, Confidence::new);

        Ok(LineItem::from_major(&self.name, amount, currency)?.with_confidence(confidence))
    }
}

/// Extracts the JSON item list from a free-text response.
///
/// Markdown code fences are removed and the slice from the first `[` to the
/// last `]` is decoded.
///
/// # Errors
///
/// - [`ExtractionError::MissingList`]: no bracketed list was found.
/// - [`ExtractionError::Json`]: the list was not valid JSON records.
pub fn parse_extraction(text: &str) -> Result<Vec<ExtractedItem>, ExtractionError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('[').ok_or(ExtractionError::MissingList)?;
    let end = cleaned.rfind(']').ok_or(ExtractionError::MissingList)?;

    let list = cleaned
        .get(start..=end)
        .ok_or(ExtractionError::MissingList)?;

    Ok(serde_json::from_str(list)?)
}

/// Parses a response straight into line items.
///
/// # Errors
///
/// Returns an [`ExtractionError`] if the response or any record is invalid.
pub fn parse_line_items<'a>(
    text: &str,
    currency: &'a Currency,
) -> Result<Vec<LineItem<'a>>, ExtractionError> {
    parse_extraction(text)?
        .into_iter()
        .map(|item| item.into_line_item(currency))
        .collect()
}
