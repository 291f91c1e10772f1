use crate::Result;
use async_trait::async_trait;

/// Raw text returned by an OCR engine, before any trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub text: String,
}

/// An engine that turns image bytes into plain text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g. "tesseract").
    fn name(&self) -> &'static str;

    /// Recognizes the text in `image` using the given language hint.
    ///
    /// Failures of the engine itself are reported as [`crate::Error::Ocr`].
    async fn recognize(&self, image: &[u8], language: &str) -> Result<Recognition>;
}
