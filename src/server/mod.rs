pub mod handlers;
pub mod types;
pub mod upload;

use crate::{
    Result,
    config::Config,
    error::UNEXPECTED,
    llm::OpenAiClient,
    ocr::TesseractEngine,
    pipeline::{Pipeline, Stage},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use handlers::AppState;
use std::{any::Any, net::SocketAddr, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, error, info};
use types::{SolveResponse, StageError};
use upload::MULTIPART_OVERHEAD;

pub async fn run(config: Config) -> Result<()> {
    // Both engines are built once from the startup configuration
    let ocr_engine = Arc::new(TesseractEngine::new(&config.ocr));
    let llm_client = Arc::new(OpenAiClient::new(&config.reasoning));
    let pipeline = Pipeline::new(ocr_engine, llm_client, &config.reasoning);

    let app_state = AppState::new(Arc::new(pipeline), &config);
    if !app_state.has_key {
        info!("No reasoning API key configured; /solve will fail at the reasoning stage");
    }

    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(app_state: AppState) -> Router {
    let body_limit = app_state.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/debug-ocr", post(handlers::debug_ocr))
        .route("/solve", post(handlers::solve))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Last line of defense: a panic in any handler still yields a JSON error body.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("UNCAUGHT ERROR: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SolveResponse::Failed {
            error: StageError {
                step: Stage::Unknown,
                message: UNEXPECTED.to_string(),
                detail,
            },
        }),
    )
        .into_response()
}
