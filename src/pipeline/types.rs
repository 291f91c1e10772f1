use crate::Error;
use axum::body::Bytes;
use image::ImageFormat;
use serde::Serialize;
use std::fmt;

/// The answer returned when a problem can't be read or solved.
pub const CANNOT_SOLVE: &str = "cannot solve";

/// Which stage a failure is attributed to on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ocr,
    Reasoning,
    Unknown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ocr => write!(f, "ocr"),
            Self::Reasoning => write!(f, "reasoning"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One uploaded photo, held in memory for the lifetime of a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    data: Bytes,
    content_type: Option<String>,
    format: Option<ImageFormat>,
}

impl UploadedImage {
    pub fn new(data: Bytes, content_type: Option<String>) -> Self {
        let format = image::guess_format(&data).ok();
        Self {
            data,
            content_type,
            format,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Media type declared by the client, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Format detected from the leading magic bytes.
    pub fn sniffed_format(&self) -> Option<ImageFormat> {
        self.format
    }
}

/// Trimmed OCR output. An empty string is a valid result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    text: String,
}

impl ExtractionResult {
    pub fn new(raw: &str) -> Self {
        Self {
            text: raw.trim().to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// The fixed instruction sent to the reasoning engine, with the OCR text embedded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningPrompt(String);

impl ReasoningPrompt {
    pub fn new(extraction: &ExtractionResult) -> Self {
        Self(format!(
            "Solve the following math problem extracted by OCR:\n\n\
             {}\n\n\
             Return ONLY the final numeric/algebraic answer (no words, no steps).\n\
             If the problem is ambiguous/incomplete, return exactly: {}",
            extraction.text(),
            CANNOT_SOLVE
        ))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer(String);

impl Answer {
    pub fn cannot_solve() -> Self {
        Self(CANNOT_SOLVE.to_string())
    }

    /// Normalizes raw engine content: trimmed, or the sentinel when nothing usable came back.
    pub fn from_completion(content: Option<&str>) -> Self {
        content
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| Self(text.to_string()))
            .unwrap_or_else(Self::cannot_solve)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Why a successful answer was produced without consulting the reasoning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Note {
    EmptyOcr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
    pub detail: String,
}

impl From<Error> for StageFailure {
    fn from(error: Error) -> Self {
        let stage = error.stage();
        let (message, detail) = error.message_and_detail();
        Self {
            stage,
            message,
            detail,
        }
    }
}

/// The single result of one solve request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success { answer: Answer, note: Option<Note> },
    Failure(StageFailure),
}

impl PipelineOutcome {
    pub fn answered(answer: Answer) -> Self {
        Self::Success { answer, note: None }
    }

    pub fn empty_ocr() -> Self {
        Self::Success {
            answer: Answer::cannot_solve(),
            note: Some(Note::EmptyOcr),
        }
    }

    pub fn failure(error: Error) -> Self {
        Self::Failure(error.into())
    }
}
