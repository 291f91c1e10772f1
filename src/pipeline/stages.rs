use super::types::{Answer, ExtractionResult, ReasoningPrompt, UploadedImage};
use crate::{
    Error, Result,
    config::ReasoningConfig,
    llm::{ChatCompletionRequest, ChatMessage, LlmClient},
    ocr::OcrEngine,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Source-language hint passed to the OCR engine.
pub const LANGUAGE_HINT: &str = "eng";

/// How much of the OCR text is echoed into the logs.
const LOGGED_OCR_CHARS: usize = 200;

pub struct OcrStage {
    engine: Arc<dyn OcrEngine>,
}

impl OcrStage {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub async fn extract(&self, image: &UploadedImage) -> Result<ExtractionResult> {
        debug!(
            "OCR with {} on {} bytes (declared {:?}, sniffed {:?})",
            self.engine.name(),
            image.size(),
            image.content_type(),
            image.sniffed_format()
        );

        let recognition = self
            .engine
            .recognize(image.data(), LANGUAGE_HINT)
            .await
            .map_err(|e| match e {
                Error::Ocr { .. } => e,
                other => Error::ocr(other),
            })?;

        let extraction = ExtractionResult::new(&recognition.text);
        info!(
            "OCR TEXT: {}",
            extraction
                .text()
                .chars()
                .take(LOGGED_OCR_CHARS)
                .collect::<String>()
        );

        Ok(extraction)
    }
}

pub struct ReasoningStage {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl ReasoningStage {
    pub fn new(client: Arc<dyn LlmClient>, config: &ReasoningConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
        }
    }

    pub fn request_for(&self, prompt: ReasoningPrompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt.into_string())],
            temperature: Some(0.0),
        }
    }

    pub async fn solve(&self, extraction: &ExtractionResult) -> Result<Answer> {
        let request = self.request_for(ReasoningPrompt::new(extraction));

        let response = self
            .client
            .create_chat_completion(request)
            .await
            .map_err(|e| match e {
                Error::Reasoning { .. } => e,
                Error::OpenAi(inner) => Error::reasoning(inner),
                other => Error::reasoning(other),
            })?;

        if let Some(usage) = &response.usage {
            debug!(
                "Reasoning by {} used {} prompt + {} completion = {} tokens",
                response.model, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let answer = Answer::from_completion(response.first_content());
        info!("Reasoning answer: {}", answer.as_str());

        Ok(answer)
    }
}
