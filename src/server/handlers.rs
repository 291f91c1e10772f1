use super::{
    types::{DebugOcrResponse, HealthResponse, StageError, assemble},
    upload::read_photo,
};
use crate::{
    config::Config,
    pipeline::{Pipeline, PipelineOutcome, SolveEvent, SolveStateMachine, StageFailure},
};
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub has_key: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, config: &Config) -> Self {
        Self {
            pipeline,
            has_key: config.has_api_key(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        has_key: state.has_key,
        runtime_version: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    })
}

/// OCR only; the reasoning engine is never contacted.
pub async fn debug_ocr(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let image = match read_photo(multipart, state.max_upload_bytes).await {
        Ok(image) => image,
        Err(rejection) => return rejection.into_response(),
    };

    match state.pipeline.extract(&image).await {
        Ok(extraction) => Json(DebugOcrResponse {
            ocr_text: extraction.into_text(),
        })
        .into_response(),
        Err(e) => {
            error!("OCR ERROR: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StageError::from(StageFailure::from(e))),
            )
                .into_response()
        }
    }
}

pub async fn solve(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let mut machine = SolveStateMachine::new(request_id);
    info!(request_id = %request_id, "Received solve request");

    if let Err(e) = machine.transition(SolveEvent::UploadReceived) {
        return assemble(PipelineOutcome::failure(e)).into_response();
    }

    let image = match read_photo(multipart, state.max_upload_bytes).await {
        Ok(image) => image,
        Err(rejection) => {
            warn!(request_id = %request_id, "Upload rejected: {}", rejection);
            if let Err(e) = machine.transition(SolveEvent::UploadRejected) {
                warn!(request_id = %request_id, "{}", e);
            }
            return rejection.into_response();
        }
    };

    if let Err(e) = machine.transition(SolveEvent::UploadAccepted) {
        return assemble(PipelineOutcome::failure(e)).into_response();
    }

    let outcome = state.pipeline.solve(image, &mut machine).await;
    info!(
        request_id = %request_id,
        "Solve request finished in state {:?} (path: {:?})",
        machine.current_state(),
        machine.history()
    );

    assemble(outcome).into_response()
}
