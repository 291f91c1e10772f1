use super::upload::UploadRejection;
use crate::pipeline::{Note, PipelineOutcome, Stage, StageFailure};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(rename = "hasKey")]
    pub has_key: bool,
    #[serde(rename = "runtimeVersion")]
    pub runtime_version: String,
}

#[derive(Debug, Serialize)]
pub struct DebugOcrResponse {
    #[serde(rename = "ocrText")]
    pub ocr_text: String,
}

/// `{ "error": "<code>" }`, used for rejected uploads.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StageError {
    pub step: Stage,
    pub message: String,
    pub detail: String,
}

impl From<StageFailure> for StageError {
    fn from(failure: StageFailure) -> Self {
        Self {
            step: failure.stage,
            message: failure.message,
            detail: failure.detail,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SolveResponse {
    Answer {
        answer: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<Note>,
    },
    Failed {
        error: StageError,
    },
}

/// Maps a pipeline outcome onto its HTTP status and JSON body.
pub fn assemble(outcome: PipelineOutcome) -> (StatusCode, Json<SolveResponse>) {
    match outcome {
        PipelineOutcome::Success { answer, note } => (
            StatusCode::OK,
            Json(SolveResponse::Answer {
                answer: answer.into_string(),
                note,
            }),
        ),
        PipelineOutcome::Failure(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SolveResponse::Failed {
                error: failure.into(),
            }),
        ),
    }
}

impl IntoResponse for UploadRejection {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.code().to_string(),
            }),
        )
            .into_response()
    }
}
