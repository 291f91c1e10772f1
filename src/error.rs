use crate::pipeline::Stage;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OCR error: {message}: {detail}")]
    Ocr { message: String, detail: String },

    #[error("Reasoning error: {message}: {detail}")]
    Reasoning { message: String, detail: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("Invalid state transition: {current} -> {requested}")]
    InvalidTransition { current: String, requested: String },
}

/// Message reported for every OCR engine failure.
pub const OCR_FAILED: &str = "Tesseract failed";

/// Message reported for every reasoning engine failure.
pub const REASONING_FAILED: &str = "Reasoning API failed";

/// Message reported for faults nobody classified.
pub const UNEXPECTED: &str = "Unexpected error";

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn ocr(detail: impl ToString) -> Self {
        Self::Ocr {
            message: OCR_FAILED.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn reasoning(detail: impl ToString) -> Self {
        Self::Reasoning {
            message: REASONING_FAILED.to_string(),
            detail: detail.to_string(),
        }
    }

    /// The pipeline stage this error is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Ocr { .. } => Stage::Ocr,
            Self::Reasoning { .. } | Self::OpenAi(_) => Stage::Reasoning,
            _ => Stage::Unknown,
        }
    }

    /// Splits the error into the `(message, detail)` pair shown to callers.
    pub fn message_and_detail(&self) -> (String, String) {
        match self {
            Self::Ocr { message, detail } | Self::Reasoning { message, detail } => {
                (message.clone(), detail.clone())
            }
            Self::OpenAi(e) => (REASONING_FAILED.to_string(), e.to_string()),
            other => (UNEXPECTED.to_string(), other.to_string()),
        }
    }
}
