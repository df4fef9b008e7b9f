//! Generative Language API receipt extractor.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use splitter::extraction::{ExtractedItem, parse_extraction};
use tracing::{debug, info};

use super::{ExtractorError, ReceiptExtractor, ReceiptImage};

/// Instruction sent alongside the receipt image.
pub const EXTRACTION_PROMPT: &str = r#"Extract items from this supermarket receipt and return the FINAL price the customer actually paid for each item.

Loyalty savings: some items are followed by a line such as "Nectar Price Saving" or "Nectar Saver" with a NEGATIVE amount (e.g. -1.00). Subtract that saving from the item directly above it to get the real price paid.

Example on receipt:
  Yorkshire Tea Bags      3.00
  Nectar Price Saving    -1.00
Correct output: {"name": "Yorkshire Tea Bags", "price": 2.00}

Rules:
- Never include a saving line as its own item.
- Always return the post-saving price, not the shelf price.
- Ignore Total, Subtotal, bag charge, card payment and change lines.

For each item add a "confidence" field:
  1.0 when name and price are clearly legible,
  0.5 when the name or price had to be guessed,
  0.0 when very uncertain.

Return ONLY a valid JSON list, no markdown, no extra text:
[
  {"name": "Item Name", "price": 1.50, "confidence": 1.0}
]"#;

/// Configuration for the Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL, e.g. `"https://generativelanguage.googleapis.com"`.
    pub base_url: String,

    /// API key.
    pub api_key: String,

    /// Model name, e.g. `"gemini-2.5-flash"`.
    pub model: String,
}

/// HTTP client that asks a Gemini model to read receipts.
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    config: GeminiConfig,
    http: Client,
}

impl GeminiExtractor {
    /// Create a new extractor from the given configuration.
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ReceiptExtractor for GeminiExtractor {
    async fn extract(&self, image: &ReceiptImage) -> Result<Vec<ExtractedItem>, ExtractorError> {
        debug!(
            model = %self.config.model,
            mime_type = image.mime_type(),
            bytes = image.bytes().len(),
            "sending receipt for extraction"
        );

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(image))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ExtractorError::UnexpectedResponse(format!(
                "generateContent failed with status {status}: {text}"
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let items = parse_extraction(&parsed.into_text()?)?;

        info!(items = items.len(), "receipt extracted");

        Ok(items)
    }
}

fn request_body(image: &ReceiptImage) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": EXTRACTION_PROMPT },
                {
                    "inlineData": {
                        "mimeType": image.mime_type(),
                        "data": BASE64.encode(image.bytes()),
                    }
                }
            ]
        }]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, ExtractorError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExtractorError::UnexpectedResponse(
                "response contained no text".to_string(),
            ));
        }

        Ok(text)
    }
}
