use crate::{Error, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

// Solve request states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Received,
    Validating,
    Rejected,
    OcrRunning,
    OcrFailed,
    OcrEmpty,
    OcrOk,
    ReasoningRunning,
    ReasoningFailed,
    Done,
}

// Solve request events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveEvent {
    UploadReceived,
    UploadRejected,
    UploadAccepted,
    OcrFailed,
    OcrFoundNothing,
    OcrExtracted,
    ShortCircuit,
    ReasoningStarted,
    ReasoningFailed,
    ReasoningAnswered,
}

/// Tracks one request through the pipeline. There is no transition back to an earlier stage.
pub struct SolveStateMachine {
    request_id: Uuid,
    state: SolveState,
    history: Vec<SolveState>,
}

impl SolveStateMachine {
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            state: SolveState::Received,
            history: vec![SolveState::Received],
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn current_state(&self) -> SolveState {
        self.state
    }

    /// Every state visited so far, starting with `Received`.
    pub fn history(&self) -> &[SolveState] {
        &self.history
    }

    pub fn transition(&mut self, event: SolveEvent) -> Result<()> {
        debug!(
            request_id = %self.request_id,
            "🔄 Solve FSM processing event {:?} in state {:?}", event, self.state
        );

        let new_state = match (self.state, event) {
            (SolveState::Received, SolveEvent::UploadReceived) => SolveState::Validating,
            (SolveState::Validating, SolveEvent::UploadRejected) => SolveState::Rejected,
            (SolveState::Validating, SolveEvent::UploadAccepted) => SolveState::OcrRunning,
            (SolveState::OcrRunning, SolveEvent::OcrFailed) => SolveState::OcrFailed,
            (SolveState::OcrRunning, SolveEvent::OcrFoundNothing) => SolveState::OcrEmpty,
            (SolveState::OcrRunning, SolveEvent::OcrExtracted) => SolveState::OcrOk,
            (SolveState::OcrEmpty, SolveEvent::ShortCircuit) => SolveState::Done,
            (SolveState::OcrOk, SolveEvent::ReasoningStarted) => SolveState::ReasoningRunning,
            (SolveState::ReasoningRunning, SolveEvent::ReasoningFailed) => {
                SolveState::ReasoningFailed
            }
            (SolveState::ReasoningRunning, SolveEvent::ReasoningAnswered) => SolveState::Done,
            _ => {
                warn!(
                    request_id = %self.request_id,
                    "❌ Invalid solve transition from {:?} with event {:?}", self.state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", self.state),
                    requested: format!("{:?}", event),
                });
            }
        };

        info!(
            request_id = %self.request_id,
            "🎯 Solve state transition: {:?} -> {:?} (event: {:?})", self.state, new_state, event
        );

        self.state = new_state;
        self.history.push(new_state);
        Ok(())
    }
}
