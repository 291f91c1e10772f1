pub mod fsm;
mod stages;
mod types;

pub use fsm::{SolveEvent, SolveState, SolveStateMachine};
pub use stages::{LANGUAGE_HINT, OcrStage, ReasoningStage};
pub use types::{
    Answer, CANNOT_SOLVE, ExtractionResult, Note, PipelineOutcome, ReasoningPrompt, Stage,
    StageFailure, UploadedImage,
};

use crate::{Error, Result, config::ReasoningConfig, llm::LlmClient, ocr::OcrEngine};
use std::sync::Arc;
use tracing::{error, info};

/// OCR followed by reasoning, one request at a time per call.
///
/// Holds no per-request state, so a single instance is shared by all handlers.
pub struct Pipeline {
    ocr: OcrStage,
    reasoning: ReasoningStage,
}

impl Pipeline {
    pub fn new(
        ocr_engine: Arc<dyn OcrEngine>,
        llm_client: Arc<dyn LlmClient>,
        config: &ReasoningConfig,
    ) -> Self {
        Self {
            ocr: OcrStage::new(ocr_engine),
            reasoning: ReasoningStage::new(llm_client, config),
        }
    }

    /// OCR only, for telling OCR faults apart from reasoning faults.
    pub async fn extract(&self, image: &UploadedImage) -> Result<ExtractionResult> {
        self.ocr.extract(image).await
    }

    /// Runs OCR and reasoning on an accepted upload.
    ///
    /// `machine` must be in [`SolveState::OcrRunning`]. Always produces exactly one outcome;
    /// faults that belong to neither stage come back as a `Stage::Unknown` failure.
    pub async fn solve(
        &self,
        image: UploadedImage,
        machine: &mut SolveStateMachine,
    ) -> PipelineOutcome {
        let request_id = machine.request_id();
        match self.run(image, machine).await {
            Ok(outcome) => {
                if let PipelineOutcome::Failure(failure) = &outcome {
                    error!(
                        request_id = %request_id,
                        "{} stage failed: {}: {}", failure.stage, failure.message, failure.detail
                    );
                }
                outcome
            }
            Err(e) => {
                error!(request_id = %request_id, "Unclassified pipeline error: {}", e);
                PipelineOutcome::failure(e)
            }
        }
    }

    async fn run(
        &self,
        image: UploadedImage,
        machine: &mut SolveStateMachine,
    ) -> Result<PipelineOutcome> {
        if machine.current_state() != SolveState::OcrRunning {
            return Err(Error::InvalidTransition {
                current: format!("{:?}", machine.current_state()),
                requested: format!("{:?}", SolveState::OcrRunning),
            });
        }

        let extraction = match self.ocr.extract(&image).await {
            Ok(extraction) => extraction,
            Err(e) => {
                machine.transition(SolveEvent::OcrFailed)?;
                return Ok(PipelineOutcome::failure(e));
            }
        };
        drop(image);

        if extraction.is_empty() {
            machine.transition(SolveEvent::OcrFoundNothing)?;
            machine.transition(SolveEvent::ShortCircuit)?;
            info!(request_id = %machine.request_id(), "OCR found no text, skipping reasoning");
            return Ok(PipelineOutcome::empty_ocr());
        }

        machine.transition(SolveEvent::OcrExtracted)?;
        machine.transition(SolveEvent::ReasoningStarted)?;

        match self.reasoning.solve(&extraction).await {
            Ok(answer) => {
                machine.transition(SolveEvent::ReasoningAnswered)?;
                Ok(PipelineOutcome::answered(answer))
            }
            Err(e) => {
                machine.transition(SolveEvent::ReasoningFailed)?;
                Ok(PipelineOutcome::failure(e))
            }
        }
    }
}
