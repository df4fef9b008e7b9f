//! Receipt extraction
//!
//! Turning a photo of a receipt into a list of priced items is delegated to
//! an external vision model behind [`ReceiptExtractor`].

use std::{io, path::Path};

use async_trait::async_trait;
use mockall::automock;
use splitter::extraction::{ExtractedItem, ExtractionError};
use thiserror::Error;

pub mod gemini;

pub use gemini::{GeminiConfig, GeminiExtractor};

/// Errors raised while extracting items from a receipt image.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The image file could not be read.
    #[error("failed to read receipt image: {0}")]
    Io(#[from] io::Error),

    /// The image is not a format the service accepts.
    #[error("unsupported receipt image {0:?}; expected a jpeg or png file")]
    UnsupportedImage(String),

    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-2xx response or an unusable body.
    #[error("unexpected response from extraction service: {0}")]
    UnexpectedResponse(String),

    /// The service answered but the item list could not be parsed.
    #[error(transparent)]
    Parse(#[from] ExtractionError),
}

/// Raw receipt image bytes with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptImage {
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl ReceiptImage {
    /// Wrap image bytes of a known MIME type.
    pub fn new(mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Self { mime_type, bytes }
    }

    /// Read an image file, inferring the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::UnsupportedImage`]: the extension is not jpg, jpeg or png.
    /// - [`ExtractorError::Io`]: the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, ExtractorError> {
        let mime_type = mime_type_for(path)
            .ok_or_else(|| ExtractorError::UnsupportedImage(path.display().to_string()))?;

        Ok(Self::new(mime_type, std::fs::read(path)?))
    }

    /// MIME type, e.g. `image/png`.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for ReceiptImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[automock]
#[async_trait]
/// Reads the purchased items off a receipt image.
pub trait ReceiptExtractor: Send + Sync {
    /// Extracts every item with its final paid price and a legibility confidence.
    async fn extract(&self, image: &ReceiptImage) -> Result<Vec<ExtractedItem>, ExtractorError>;
}
